//! `postpilot-infra` — storage and scheduler services.
//!
//! Store traits with in-memory implementations (Postgres behind the
//! `postgres` feature), the schedule assigner, and the publish trigger cycle.

pub mod scheduler;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use scheduler::{
    AssignmentReport, ChannelAssignment, PostOutcome, Publisher, PublishError, PublishRunner,
    RunReport, ScheduleAssigner, SchedulerError, StubPublisher,
};
pub use store::{
    ContentStore, InMemoryContentStore, InMemoryPostStore, InMemoryScheduleStore, PostStore,
    ScheduleStore, StoreError,
};
