//! A single named call to the text-generation service.

use crate::agent::client::TextGenerator;
use crate::error::ExternalCallError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One named unit of work: a prompt and the generator that answers it.
///
/// Consumed by [`TextAnalysisTask::execute`], so it runs at most once.
pub struct TextAnalysisTask {
    name: String,
    input: String,
    generator: Arc<dyn TextGenerator>,
    timeout: Option<Duration>,
}

impl TextAnalysisTask {
    /// Create a task with no time limit.
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            generator,
            timeout: None,
        }
    }

    /// Bound the call to `timeout`. `None` leaves it unbounded.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[allow(dead_code)] // Accessor for callers inspecting a prepared batch
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Perform the call. No retry is attempted.
    pub async fn execute(self) -> Result<String, ExternalCallError> {
        debug!(task = %self.name, model = %self.generator.model(), "task started");

        let call = self.generator.generate(&self.input);
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ExternalCallError::Timeout(limit))?,
            None => call.await,
        }?;

        debug!(task = %self.name, bytes = output.len(), "task completed");
        Ok(output)
    }
}

impl fmt::Debug for TextAnalysisTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextAnalysisTask")
            .field("name", &self.name)
            .field("model", &self.generator.model())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::stub::StubGenerator;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_execute_returns_generator_output() {
        let task = TextAnalysisTask::new("A", "report", StubGenerator::reply("a-result"));
        assert_eq!(task.name(), "A");
        assert_eq!(task.input(), "report");

        let output = assert_ok!(task.execute().await);
        assert_eq!(output, "a-result");
    }

    #[tokio::test]
    async fn test_execute_passes_input_through() {
        let task = TextAnalysisTask::new("echo", "hello there", StubGenerator::echo());
        assert_eq!(task.execute().await.unwrap(), "hello there");
    }

    #[tokio::test]
    async fn test_execute_surfaces_failure() {
        let task = TextAnalysisTask::new("B", "report", StubGenerator::fail("boom"));
        let err = assert_err!(task.execute().await);
        assert_eq!(err, ExternalCallError::Provider("boom".to_string()));
    }

    #[tokio::test]
    async fn test_timeout_bounds_blocked_call() {
        let limit = Duration::from_millis(50);
        let task = TextAnalysisTask::new("stuck", "report", StubGenerator::pending())
            .with_timeout(Some(limit));

        let err = assert_err!(task.execute().await);
        assert_eq!(err, ExternalCallError::Timeout(limit));
    }

    #[tokio::test]
    async fn test_timeout_not_hit_by_fast_call() {
        let task = TextAnalysisTask::new("fast", "report", StubGenerator::reply("ok"))
            .with_timeout(Some(Duration::from_secs(5)));
        assert_eq!(task.execute().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_generator_called_once_per_execution() {
        let stub = StubGenerator::reply("x");
        let task = TextAnalysisTask::new("A", "report", stub.clone());
        task.execute().await.unwrap();
        assert_eq!(stub.calls(), 1);
    }
}
