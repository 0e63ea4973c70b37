//! Notice repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide bulk-create, clear, status-update and the two read queries
//!   (active page, expired list) over the `notices` table.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - Write paths must call `NoticeDraft::validate()` before SQL mutations.
//! - One post is inserted in a single transaction (all lines or none).
//! - Active means `end_at >= now`; expired means `end_at < now`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::notice::{
    Category, Notice, NoticeDraft, NoticeId, NoticeStatus, NoticeValidationError,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const NOTICE_PAGE_SIZE_DEFAULT: u32 = 20;
pub const NOTICE_PAGE_SIZE_MAX: u32 = 100;

const NOTICE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    category,
    created_at,
    author,
    start_at,
    end_at,
    status
FROM notices";

const NOTICE_COLUMNS: [&str; 9] = [
    "id",
    "title",
    "content",
    "category",
    "created_at",
    "author",
    "start_at",
    "end_at",
    "status",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for notice persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoticeValidationError),
    Db(DbError),
    NotFound(NoticeId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "notice not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted notice data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoticeValidationError> for RepoError {
    fn from(value: NoticeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for the active-notice listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNoticeQuery {
    pub category: Category,
    /// 1-based page number. `0` is treated as `1`.
    pub page: u32,
    /// Rows per page. Defaults to 20 and clamps to 100.
    pub page_size: Option<u32>,
    /// Reference instant in epoch milliseconds.
    pub now: i64,
}

/// One page of active notices plus the totals needed for pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticePage {
    /// Sorted by `start_at ASC, id ASC`.
    pub items: Vec<Notice>,
    /// Active notices in the category, across all pages.
    pub total_count: u64,
    /// Effective 1-based page number.
    pub page: u32,
    /// Effective normalized page size.
    pub page_size: u32,
    /// Never less than 1, even when `total_count` is 0.
    pub total_pages: u32,
}

/// Repository interface for the notice store.
pub trait NoticeRepository {
    /// Inserts one row per content line and returns ids in line order.
    fn create_notices(&self, draft: &NoticeDraft, created_at: i64) -> RepoResult<Vec<NoticeId>>;
    /// Deletes every notice. Returns the number of removed rows.
    fn clear_notices(&self) -> RepoResult<usize>;
    /// Overwrites the status flags of one notice.
    fn set_status(&self, id: NoticeId, status: NoticeStatus) -> RepoResult<()>;
    fn get_notice(&self, id: NoticeId) -> RepoResult<Option<Notice>>;
    fn list_active(&self, query: &ActiveNoticeQuery) -> RepoResult<NoticePage>;
    /// Expired notices of one category, sorted by `end_at ASC, id ASC`.
    fn list_expired(&self, category: Category, now: i64) -> RepoResult<Vec<Notice>>;
}

/// SQLite-backed notice repository.
pub struct SqliteNoticeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoticeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is
    ///   not the one this binary writes.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoticeRepository for SqliteNoticeRepository<'_> {
    fn create_notices(&self, draft: &NoticeDraft, created_at: i64) -> RepoResult<Vec<NoticeId>> {
        draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut ids = Vec::new();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO notices (
                    title,
                    content,
                    category,
                    created_at,
                    author,
                    start_at,
                    end_at,
                    status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for line in draft.lines() {
                stmt.execute(params![
                    draft.title.as_str(),
                    line,
                    draft.category.as_str(),
                    created_at,
                    draft.author.as_str(),
                    draft.start_at,
                    draft.end_at,
                    NoticeStatus::NONE.as_db_str(),
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;

        Ok(ids)
    }

    fn clear_notices(&self) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM notices;", [])?;
        Ok(removed)
    }

    fn set_status(&self, id: NoticeId, status: NoticeStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notices SET status = ?1 WHERE id = ?2;",
            params![status.as_db_str(), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_notice(&self, id: NoticeId) -> RepoResult<Option<Notice>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTICE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_notice_row(row)?));
        }

        Ok(None)
    }

    fn list_active(&self, query: &ActiveNoticeQuery) -> RepoResult<NoticePage> {
        let page = normalize_page(query.page);
        let page_size = normalize_page_size(query.page_size);
        let offset = i64::from(page - 1) * i64::from(page_size);

        let total_count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM notices
             WHERE category = ?1
               AND end_at >= ?2;",
            params![query.category.as_str(), query.now],
            |row| row.get(0),
        )?;
        let total_count = u64::try_from(total_count).map_err(|_| {
            RepoError::InvalidData(format!("negative active notice count `{total_count}`"))
        })?;

        let mut stmt = self.conn.prepare(&format!(
            "{NOTICE_SELECT_SQL}
             WHERE category = ?1
               AND end_at >= ?2
             ORDER BY start_at ASC, id ASC
             LIMIT ?3 OFFSET ?4;"
        ))?;
        let mut rows = stmt.query(params![
            query.category.as_str(),
            query.now,
            i64::from(page_size),
            offset,
        ])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_notice_row(row)?);
        }

        Ok(NoticePage {
            items,
            total_count,
            page,
            page_size,
            total_pages: total_pages(total_count, page_size),
        })
    }

    fn list_expired(&self, category: Category, now: i64) -> RepoResult<Vec<Notice>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTICE_SELECT_SQL}
             WHERE category = ?1
               AND end_at < ?2
             ORDER BY end_at ASC, id ASC;"
        ))?;

        let mut rows = stmt.query(params![category.as_str(), now])?;
        let mut notices = Vec::new();
        while let Some(row) = rows.next()? {
            notices.push(parse_notice_row(row)?);
        }

        Ok(notices)
    }
}

/// Normalizes page size according to the listing contract.
pub fn normalize_page_size(page_size: Option<u32>) -> u32 {
    match page_size {
        Some(0) | None => NOTICE_PAGE_SIZE_DEFAULT,
        Some(value) => value.min(NOTICE_PAGE_SIZE_MAX),
    }
}

/// Normalizes a 1-based page number; `0` maps to the first page.
pub fn normalize_page(page: u32) -> u32 {
    page.max(1)
}

/// Number of pages needed for `total_count` rows, never less than 1.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let pages = total_count.div_ceil(u64::from(page_size.max(1))).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

fn parse_notice_row(row: &Row<'_>) -> RepoResult<Notice> {
    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in notices.category"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = NoticeStatus::from_db_str(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in notices.status"))
    })?;

    Ok(Notice {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        category,
        created_at: row.get("created_at")?,
        author: row.get("author")?,
        start_at: row.get("start_at")?,
        end_at: row.get("end_at")?,
        status,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "notices")? {
        return Err(RepoError::MissingRequiredTable("notices"));
    }

    let present = table_columns(conn, "notices")?;
    for column in NOTICE_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "notices",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
