use crate::dates::parse_datetime;
use clap::{Parser, Subcommand};
use noticeboard_core::{default_log_level, Category};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "noticeboard")]
#[command(version, about = "Internal notice board: post, browse and mark dated notices")]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "NOTICEBOARD_DB", default_value = "noticeboard.sqlite3", global = true)]
    pub db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "NOTICEBOARD_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "NOTICEBOARD_LOG_LEVEL", default_value = default_log_level(), global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Post a notice; every non-empty content line becomes its own entry
    Post {
        /// Notice title
        #[arg(long)]
        title: String,

        /// Publisher name
        #[arg(long)]
        author: String,

        /// Category (announcement, finance, teaching, administration, other)
        #[arg(long, value_parser = parse_category)]
        category: Category,

        /// Body text, one notice per line
        #[arg(long, required_unless_present = "stdin", conflicts_with = "stdin")]
        content: Option<String>,

        /// Read the body from stdin
        #[arg(long)]
        stdin: bool,

        /// Start time (RFC 3339 or local "YYYY-MM-DD HH:MM"); defaults to now
        #[arg(long, value_parser = parse_datetime)]
        start: Option<i64>,

        /// End time (RFC 3339 or local "YYYY-MM-DD HH:MM"); defaults to start + 1 minute
        #[arg(long, value_parser = parse_datetime)]
        end: Option<i64>,
    },

    /// Delete every notice on the board
    Clear {
        /// Confirm that all notices should be removed
        #[arg(long)]
        yes: bool,
    },

    /// Browse active notices of one category, oldest start first
    List {
        #[arg(long, value_parser = parse_category)]
        category: Category,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Notices per page (default 20, max 100)
        #[arg(long)]
        page_size: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List expired notices of one category, earliest end first
    Expired {
        #[arg(long, value_parser = parse_category)]
        category: Category,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set read/important flags on a notice
    Mark {
        /// Notice ID
        id: i64,

        /// Mark as read (true/false)
        #[arg(long)]
        read: Option<bool>,

        /// Mark as important (true/false)
        #[arg(long)]
        important: Option<bool>,
    },

    /// Show a single notice by ID
    Show {
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available categories
    Categories,
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| {
        let known: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category `{value}`; expected one of {}", known.join(", "))
    })
}
