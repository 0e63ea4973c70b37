//! Notice domain model.
//!
//! # Responsibility
//! - Define the canonical notice record and its fixed category set.
//! - Validate post drafts before anything reaches storage.
//! - Decide active/expired visibility for a given instant.
//!
//! # Invariants
//! - `end_at` is strictly later than `start_at` for every accepted draft.
//! - One post produces one notice per non-blank content line.
//! - Status is a flag set; the empty set is the default.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Surrogate key assigned by storage.
pub type NoticeId = i64;

/// Fixed notice categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Announcement,
    Finance,
    Teaching,
    Administration,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Announcement,
        Category::Finance,
        Category::Teaching,
        Category::Administration,
        Category::Other,
    ];

    /// Stable storage/wire key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
            Self::Finance => "finance",
            Self::Teaching => "teaching",
            Self::Administration => "administration",
            Self::Other => "other",
        }
    }

    /// Human-readable label for front ends.
    pub fn label(self) -> &'static str {
        match self {
            Self::Announcement => "Announcements",
            Self::Finance => "Finance",
            Self::Teaching => "Teaching",
            Self::Administration => "Administration",
            Self::Other => "Other",
        }
    }

    /// Parses a storage key (case-insensitive, surrounding whitespace ignored).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read/important flags attached to one notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeStatus {
    pub read: bool,
    pub important: bool,
}

impl NoticeStatus {
    pub const NONE: NoticeStatus = NoticeStatus {
        read: false,
        important: false,
    };

    pub fn new(read: bool, important: bool) -> Self {
        Self { read, important }
    }

    /// Returns `true` when no flag is set.
    pub fn is_unmarked(self) -> bool {
        !self.read && !self.important
    }

    /// Canonical text form used in the `status` column.
    pub fn as_db_str(self) -> &'static str {
        match (self.read, self.important) {
            (false, false) => "none",
            (true, false) => "read",
            (false, true) => "important",
            (true, true) => "read,important",
        }
    }

    /// Parses the canonical text form. Unknown text yields `None`.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::NONE),
            "read" => Some(Self::new(true, false)),
            "important" => Some(Self::new(false, true)),
            "read,important" => Some(Self::new(true, true)),
            _ => None,
        }
    }
}

impl Display for NoticeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_unmarked() {
            return f.write_str("unmarked");
        }
        f.write_str(self.as_db_str())
    }
}

/// One persisted notice row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: NoticeId,
    pub title: String,
    /// Exactly one line of body text.
    pub content: String,
    pub category: Category,
    /// Unix epoch milliseconds, shared by every row of one post.
    pub created_at: i64,
    pub author: String,
    /// Unix epoch milliseconds.
    pub start_at: i64,
    /// Unix epoch milliseconds. Always later than `start_at`.
    pub end_at: i64,
    pub status: NoticeStatus,
}

impl Notice {
    /// Active notices stay listed until `now` passes `end_at`.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.end_at >= now
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        !self.is_active_at(now)
    }
}

/// Validation failures for post input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeValidationError {
    /// A required text field is empty after trimming.
    MissingField(&'static str),
    /// Content has no non-blank line.
    EmptyContent,
    /// `end_at` is not strictly after `start_at`.
    InvalidWindow { start_at: i64, end_at: i64 },
}

impl Display for NoticeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} must not be empty"),
            Self::EmptyContent => write!(f, "content must contain at least one non-empty line"),
            Self::InvalidWindow { start_at, end_at } => write!(
                f,
                "end time must be later than start time (start_at={start_at}, end_at={end_at})"
            ),
        }
    }
}

impl Error for NoticeValidationError {}

/// Input for one post. Becomes one notice per content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeDraft {
    pub title: String,
    pub author: String,
    pub category: Category,
    /// Multi-line body; each non-blank line becomes its own notice.
    pub content: String,
    pub start_at: i64,
    pub end_at: i64,
}

impl NoticeDraft {
    /// Checks required fields and the visibility window.
    pub fn validate(&self) -> Result<(), NoticeValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoticeValidationError::MissingField("title"));
        }
        if self.author.trim().is_empty() {
            return Err(NoticeValidationError::MissingField("author"));
        }
        if self.start_at >= self.end_at {
            return Err(NoticeValidationError::InvalidWindow {
                start_at: self.start_at,
                end_at: self.end_at,
            });
        }
        if self.lines().is_empty() {
            return Err(NoticeValidationError::EmptyContent);
        }
        Ok(())
    }

    /// Trimmed, non-blank content lines in input order.
    pub fn lines(&self) -> Vec<&str> {
        self.content
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
