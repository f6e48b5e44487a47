//! Error types for the analysis pipeline.
//!
//! Each stage has its own error so a failure can always be traced back to
//! the stage, and for the fan-out stage to the specialist task, that
//! produced it.

use std::time::Duration;
use thiserror::Error;

/// A single call to the text-generation service failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExternalCallError {
    /// The call did not complete within the configured limit.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The service could not be reached.
    #[error("cannot connect to {0}")]
    Connection(String),

    /// The request could not be sent.
    #[error("failed to send request: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    /// The service answered with no text.
    #[error("empty response from model")]
    EmptyResponse,

    /// Any other provider-specific failure.
    #[allow(dead_code)] // Only the test stub generator builds this today
    #[error("{0}")]
    Provider(String),
}

/// The fan-out stage failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A named task's external call failed.
    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: ExternalCallError,
    },

    /// A worker panicked before producing a result.
    #[error("task '{task}' panicked")]
    WorkerPanicked { task: String },

    /// A worker was lost to the runtime (cancelled or shut down).
    #[error("worker join error: {0}")]
    Join(String),

    /// The batch had no tasks.
    #[error("batch contains no tasks")]
    EmptyBatch,

    /// Two tasks in the batch share a name.
    #[error("duplicate task name '{0}' in batch")]
    DuplicateTask(String),
}

impl DispatchError {
    /// Name of the task this error is attributed to, if any.
    pub fn task(&self) -> Option<&str> {
        match self {
            DispatchError::TaskFailed { task, .. } | DispatchError::WorkerPanicked { task } => {
                Some(task.as_str())
            }
            DispatchError::DuplicateTask(task) => Some(task.as_str()),
            DispatchError::Join(_) | DispatchError::EmptyBatch => None,
        }
    }
}

/// The aggregation call failed after every specialist succeeded.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("aggregation call failed: {source}")]
    Call {
        #[source]
        source: ExternalCallError,
    },
}

/// Top-level failure surfaced by [`crate::analysis::Pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("specialist stage failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("team stage failed: {0}")]
    Aggregation(#[from] AggregationError),
}

impl PipelineError {
    /// Short name of the failing stage.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Dispatch(_) => "dispatch",
            PipelineError::Aggregation(_) => "aggregation",
        }
    }

    /// Name of the failing specialist task, for fan-out failures.
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            PipelineError::Dispatch(e) => e.task(),
            PipelineError::Aggregation(_) => None,
        }
    }

    /// The underlying external-call error, when there is one.
    #[allow(dead_code)] // Utility for error reporting
    pub fn cause(&self) -> Option<&ExternalCallError> {
        match self {
            PipelineError::Dispatch(DispatchError::TaskFailed { source, .. }) => Some(source),
            PipelineError::Aggregation(AggregationError::Call { source }) => Some(source),
            PipelineError::Dispatch(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_names_task() {
        let err = DispatchError::TaskFailed {
            task: "B".to_string(),
            source: ExternalCallError::Provider("boom".to_string()),
        };
        assert_eq!(err.task(), Some("B"));
        assert_eq!(err.to_string(), "task 'B' failed: boom");
    }

    #[test]
    fn test_pipeline_error_accessors() {
        let err: PipelineError = DispatchError::TaskFailed {
            task: "Cardiologist".to_string(),
            source: ExternalCallError::Timeout(Duration::from_secs(30)),
        }
        .into();
        assert_eq!(err.stage(), "dispatch");
        assert_eq!(err.failed_task(), Some("Cardiologist"));
        assert_eq!(
            err.cause(),
            Some(&ExternalCallError::Timeout(Duration::from_secs(30)))
        );

        let err: PipelineError = AggregationError::Call {
            source: ExternalCallError::EmptyResponse,
        }
        .into();
        assert_eq!(err.stage(), "aggregation");
        assert_eq!(err.failed_task(), None);
        assert_eq!(err.cause(), Some(&ExternalCallError::EmptyResponse));
    }

    #[test]
    fn test_timeout_display() {
        let err = ExternalCallError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "request timed out after 250ms");
    }

    #[test]
    fn test_api_error_display() {
        let err = ExternalCallError::Api {
            status: 500,
            body: "model not loaded".to_string(),
        };
        assert_eq!(err.to_string(), "API error 500: model not loaded");
    }
}
