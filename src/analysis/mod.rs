//! Analysis orchestration.
//!
//! Specialists are dispatched concurrently, and their reports are then
//! aggregated by a single team call.

pub mod aggregator;
pub mod dispatcher;
pub mod pipeline;

pub use pipeline::{Pipeline, PipelineOutcome, PipelineSettings, PipelineState};
