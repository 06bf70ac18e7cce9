//! `postpilot-observability` — process-wide observability wiring.

pub mod tracing;

pub use tracing::init;
