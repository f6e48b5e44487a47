//! Text-generation agents.
//!
//! This module provides the model client seam and the task that wraps a
//! single call to it.

pub mod client;
pub mod prompts;
pub mod task;

#[cfg(test)]
pub mod stub;

pub use client::{OllamaConfig, OllamaGenerator, TextGenerator};
pub use task::TextAnalysisTask;
