use crate::dates::format_epoch_ms;
use noticeboard_core::db::DbError;
use noticeboard_core::{
    now_epoch_ms, Category, Notice, NoticeDraft, NoticeId, NoticePage, NoticeService,
    NoticeServiceError, NoticeStatus, RepoError, SqliteNoticeRepository,
};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Read};

const DEFAULT_WINDOW_MS: i64 = 60_000;

pub type Board<'conn> = NoticeService<SqliteNoticeRepository<'conn>>;
pub type CliResult<T> = Result<T, CliError>;

/// Front-end failure surfaced to the user.
#[derive(Debug)]
pub enum CliError {
    Db(DbError),
    Service(NoticeServiceError),
    Io(io::Error),
    Json(serde_json::Error),
    NoticeMissing(NoticeId),
    NothingToMark,
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "cannot open notice database: {err}"),
            Self::Service(NoticeServiceError::ClearNotConfirmed) => {
                write!(f, "clearing all notices requires confirmation; re-run with --yes")
            }
            Self::Service(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::NoticeMissing(id) => write!(f, "notice not found: {id}"),
            Self::NothingToMark => write!(f, "pass --read and/or --important"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Service(value.into())
    }
}

impl From<NoticeServiceError> for CliError {
    fn from(value: NoticeServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<io::Error> for CliError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Raw `post` arguments before defaults are applied.
pub struct PostArgs {
    pub title: String,
    pub author: String,
    pub category: Category,
    /// `None` means the body is read from stdin.
    pub content: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

pub fn handle_post(board: &Board<'_>, args: PostArgs) -> CliResult<()> {
    let content = match args.content {
        Some(content) => content,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let now = now_epoch_ms();
    let (start_at, end_at) = resolve_window(args.start, args.end, now);
    let draft = NoticeDraft {
        title: args.title,
        author: args.author,
        category: args.category,
        content,
        start_at,
        end_at,
    };

    let outcome = board.post_notice(&draft, now)?;
    println!(
        "Posted {} notice(s) to {}: {}",
        outcome.count(),
        draft.category.label(),
        join_ids(&outcome.ids)
    );
    Ok(())
}

/// Start defaults to `now`; end defaults to one minute after start.
fn resolve_window(start: Option<i64>, end: Option<i64>, now: i64) -> (i64, i64) {
    let start_at = start.unwrap_or(now);
    (start_at, end.unwrap_or(start_at + DEFAULT_WINDOW_MS))
}

pub fn handle_clear(board: &Board<'_>, yes: bool) -> CliResult<()> {
    let removed = board.clear_all(yes)?;
    println!("Removed {removed} notice(s).");
    Ok(())
}

pub fn handle_list(
    board: &Board<'_>,
    category: Category,
    page: u32,
    page_size: Option<u32>,
    json: bool,
) -> CliResult<()> {
    let result = board.browse_active(category, page, page_size, now_epoch_ms())?;
    if json {
        return print_json(&result);
    }

    print_page_header(category, &result);
    for notice in &result.items {
        print_notice(notice, &notice.status.to_string());
    }
    Ok(())
}

pub fn handle_expired(board: &Board<'_>, category: Category, json: bool) -> CliResult<()> {
    let notices = board.list_expired(category, now_epoch_ms())?;
    if json {
        return print_json(&notices);
    }

    if notices.is_empty() {
        println!("No expired notices in {}.", category.label());
        return Ok(());
    }
    println!("Expired notices in {} ({}):", category.label(), notices.len());
    for notice in &notices {
        print_notice(notice, "expired");
    }
    Ok(())
}

pub fn handle_mark(
    board: &Board<'_>,
    id: NoticeId,
    read: Option<bool>,
    important: Option<bool>,
) -> CliResult<()> {
    let status = match (read, important) {
        (None, None) => return Err(CliError::NothingToMark),
        (Some(read), Some(important)) => {
            let status = NoticeStatus::new(read, important);
            board.set_status(id, status)?;
            status
        }
        (Some(read), None) => board.mark_read(id, read)?,
        (None, Some(important)) => board.mark_important(id, important)?,
    };
    println!("Notice {id}: {status}");
    Ok(())
}

pub fn handle_show(board: &Board<'_>, id: NoticeId, json: bool) -> CliResult<()> {
    let notice = board.get_notice(id)?.ok_or(CliError::NoticeMissing(id))?;
    if json {
        return print_json(&notice);
    }

    let label = if notice.is_expired_at(now_epoch_ms()) {
        "expired".to_string()
    } else {
        notice.status.to_string()
    };
    print_notice(&notice, &label);
    println!("  category: {}", notice.category.label());
    println!("  created:  {}", format_epoch_ms(notice.created_at));
    Ok(())
}

pub fn handle_categories() -> CliResult<()> {
    for category in Category::ALL {
        println!("{:<16}{}", category.as_str(), category.label());
    }
    Ok(())
}

fn print_page_header(category: Category, page: &NoticePage) {
    println!(
        "Category: {}  {} active notice(s), page {}/{}",
        category.label(),
        page.total_count,
        page.page,
        page.total_pages
    );
}

fn print_notice(notice: &Notice, status_label: &str) {
    let marker = if notice.status.important { "!" } else { " " };
    println!("{}", "-".repeat(40));
    println!("{marker} #{} {}", notice.id, notice.title);
    println!(
        "  by {} | {} ~ {} | {}",
        notice.author,
        format_epoch_ms(notice.start_at),
        format_epoch_ms(notice.end_at),
        status_label
    );
    println!("  {}", notice.content);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn join_ids(ids: &[NoticeId]) -> String {
    ids.iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}
