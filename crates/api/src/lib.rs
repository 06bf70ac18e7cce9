//! `postpilot-api` — HTTP surface for content management and the scheduler.

pub mod app;
pub mod middleware;
