//! Scheduling domain module.
//!
//! Cadence configuration (how often and when a company posts per channel) and
//! the pure slot planner that turns a cadence into concrete future instants.
//! No IO; the planner takes "now" and randomness as explicit inputs.

pub mod planner;
pub mod schedule;

pub use planner::{compute_slots, DEFAULT_HOURS, DEFAULT_WEEKDAYS};
pub use schedule::{Cadence, Schedule};
