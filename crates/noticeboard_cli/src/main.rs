//! Command-line front end for the notice board.
//!
//! # Responsibility
//! - Translate subcommands into `noticeboard_core` service calls.
//! - Keep presentation (text/JSON) out of the core crate.

mod commands;
mod dates;
mod handlers;

use clap::Parser;
use commands::{Cli, Commands};
use handlers::{CliResult, PostArgs};
use log::error;
use noticeboard_core::db::open_db;
use noticeboard_core::{init_logging, NoticeService, SqliteNoticeRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Commands::Categories = cli.command {
        return handlers::handle_categories();
    }

    let conn = open_db(&cli.db)?;
    let board = NoticeService::new(SqliteNoticeRepository::try_new(&conn)?);

    match cli.command {
        Commands::Post {
            title,
            author,
            category,
            content,
            stdin: _,
            start,
            end,
        } => handlers::handle_post(
            &board,
            PostArgs {
                title,
                author,
                category,
                content,
                start,
                end,
            },
        ),
        Commands::Clear { yes } => handlers::handle_clear(&board, yes),
        Commands::List {
            category,
            page,
            page_size,
            json,
        } => handlers::handle_list(&board, category, page, page_size, json),
        Commands::Expired { category, json } => handlers::handle_expired(&board, category, json),
        Commands::Mark {
            id,
            read,
            important,
        } => handlers::handle_mark(&board, id, read, important),
        Commands::Show { id, json } => handlers::handle_show(&board, id, json),
        Commands::Categories => handlers::handle_categories(),
    }
}
