//! Domain model for the notice board.
//!
//! # Responsibility
//! - Define canonical data structures used by store and service logic.
//! - Own input validation for posted notices.
//!
//! # Invariants
//! - Every persisted notice is identified by a storage-assigned `NoticeId`.
//! - Notices are never deleted individually; only a full clear removes rows.

pub mod notice;
