//! Scheduler services: slot assignment and the publish trigger cycle.

pub mod assigner;
pub mod runner;

pub use assigner::{AssignmentReport, ChannelAssignment, ScheduleAssigner};
pub use runner::{PostOutcome, Publisher, PublishError, PublishRunner, RunReport, StubPublisher};

use crate::store::StoreError;

/// Scheduler service error.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The referenced content item does not exist. Fatal to the assign call;
    /// nothing was modified.
    #[error("content item not found")]
    ContentItemNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}
