//! Storage abstractions.
//!
//! Each trait is the seam a service talks through; the in-memory
//! implementations back tests and dev, Postgres (feature `postgres`) backs
//! production. Post updates that pair fields with status (scheduled_for,
//! published_at) are single atomic operations on the trait so a caller can
//! never observe a half-applied transition.

pub mod content;
pub mod posts;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod schedules;

pub use content::{ContentStore, InMemoryContentStore};
pub use posts::{InMemoryPostStore, PostStore};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresContentStore, PostgresPostStore, PostgresScheduleStore};
pub use schedules::{InMemoryScheduleStore, ScheduleStore};

use postpilot_core::DomainError;

/// Store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record already exists: {0}")]
    AlreadyExists(String),
    /// A domain rule rejected the requested change (e.g. illegal transition).
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("storage error: {0}")]
    Storage(String),
}
