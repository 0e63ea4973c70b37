//! Notice board use-case service.
//!
//! # Responsibility
//! - Validate post input and fan a multi-line post out into notices.
//! - Guard the destructive clear behind an explicit confirmation.
//! - Expose read/important toggles and the active/expired views.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - All rows of one post share the same `created_at`.
//! - Log events carry ids and counts only, never titles or content.

use crate::model::notice::{
    Category, Notice, NoticeDraft, NoticeId, NoticeStatus, NoticeValidationError,
};
use crate::repo::notice_repo::{
    ActiveNoticeQuery, NoticePage, NoticeRepository, RepoError, RepoResult,
};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for notice board use-cases.
#[derive(Debug)]
pub enum NoticeServiceError {
    /// Post input was rejected before touching storage.
    Validation(NoticeValidationError),
    /// Clearing the board was requested without confirmation.
    ClearNotConfirmed,
    /// Target notice does not exist.
    NoticeNotFound(NoticeId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoticeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ClearNotConfirmed => write!(f, "clearing all notices requires confirmation"),
            Self::NoticeNotFound(id) => write!(f, "notice not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoticeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoticeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoticeNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoticeValidationError> for NoticeServiceError {
    fn from(value: NoticeValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of one accepted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostOutcome {
    /// One id per stored content line, in input order.
    pub ids: Vec<NoticeId>,
    pub created_at: i64,
}

impl PostOutcome {
    pub fn count(&self) -> usize {
        self.ids.len()
    }
}

/// Notice board facade over repository implementations.
pub struct NoticeService<R: NoticeRepository> {
    repo: R,
}

impl<R: NoticeRepository> NoticeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Posts a draft, storing one notice per non-blank content line.
    ///
    /// `now` becomes the shared `created_at` of every stored row.
    pub fn post_notice(
        &self,
        draft: &NoticeDraft,
        now: i64,
    ) -> Result<PostOutcome, NoticeServiceError> {
        if let Err(err) = draft.validate() {
            warn!(
                "event=notice_post module=service status=rejected category={} reason=\"{}\"",
                draft.category, err
            );
            return Err(err.into());
        }

        let ids = self.repo.create_notices(draft, now)?;
        info!(
            "event=notice_post module=service status=ok category={} count={}",
            draft.category,
            ids.len()
        );
        Ok(PostOutcome {
            ids,
            created_at: now,
        })
    }

    /// Removes every notice from the board.
    ///
    /// # Errors
    /// - `ClearNotConfirmed` when `confirmed` is `false`; nothing is deleted.
    pub fn clear_all(&self, confirmed: bool) -> Result<usize, NoticeServiceError> {
        if !confirmed {
            warn!("event=notice_clear module=service status=rejected reason=not_confirmed");
            return Err(NoticeServiceError::ClearNotConfirmed);
        }

        let removed = self.repo.clear_notices()?;
        warn!("event=notice_clear module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Replaces both status flags of one notice.
    pub fn set_status(&self, id: NoticeId, status: NoticeStatus) -> Result<(), NoticeServiceError> {
        self.repo.set_status(id, status)?;
        info!(
            "event=notice_status module=service status=ok id={id} flags={}",
            status.as_db_str()
        );
        Ok(())
    }

    /// Sets or clears the `read` flag, leaving `important` untouched.
    pub fn mark_read(&self, id: NoticeId, read: bool) -> Result<NoticeStatus, NoticeServiceError> {
        self.update_flags(id, |status| status.read = read)
    }

    /// Sets or clears the `important` flag, leaving `read` untouched.
    pub fn mark_important(
        &self,
        id: NoticeId,
        important: bool,
    ) -> Result<NoticeStatus, NoticeServiceError> {
        self.update_flags(id, |status| status.important = important)
    }

    pub fn get_notice(&self, id: NoticeId) -> Result<Option<Notice>, NoticeServiceError> {
        Ok(self.repo.get_notice(id)?)
    }

    /// Returns one page of active notices in `category` at instant `now`.
    pub fn browse_active(
        &self,
        category: Category,
        page: u32,
        page_size: Option<u32>,
        now: i64,
    ) -> Result<NoticePage, NoticeServiceError> {
        let page = self.repo.list_active(&ActiveNoticeQuery {
            category,
            page,
            page_size,
            now,
        })?;
        debug!(
            "event=notice_query module=service status=ok view=active category={category} page={} total={}",
            page.page,
            page.total_count
        );
        Ok(page)
    }

    /// Returns every expired notice in `category` at instant `now`.
    pub fn list_expired(
        &self,
        category: Category,
        now: i64,
    ) -> Result<Vec<Notice>, NoticeServiceError> {
        let notices = self.repo.list_expired(category, now)?;
        debug!(
            "event=notice_query module=service status=ok view=expired category={category} total={}",
            notices.len()
        );
        Ok(notices)
    }

    fn update_flags<F>(&self, id: NoticeId, apply: F) -> Result<NoticeStatus, NoticeServiceError>
    where
        F: FnOnce(&mut NoticeStatus),
    {
        let mut status = self.load(id)?.status;
        apply(&mut status);
        self.set_status(id, status)?;
        Ok(status)
    }

    fn load(&self, id: NoticeId) -> RepoResult<Notice> {
        self.repo.get_notice(id)?.ok_or(RepoError::NotFound(id))
    }
}
