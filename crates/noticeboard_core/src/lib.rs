//! Core notice board logic: storage, visibility rules and use-cases.
//! This crate is the single source of truth for notice invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::notice::{
    now_epoch_ms, Category, Notice, NoticeDraft, NoticeId, NoticeStatus, NoticeValidationError,
};
pub use repo::notice_repo::{
    ActiveNoticeQuery, NoticePage, NoticeRepository, RepoError, RepoResult,
    SqliteNoticeRepository, NOTICE_PAGE_SIZE_DEFAULT, NOTICE_PAGE_SIZE_MAX,
};
pub use service::notice_service::{NoticeService, NoticeServiceError, PostOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
