//! The team stage: one call over every specialist's report.

use crate::agent::prompts::team_prompt;
use crate::agent::{TextAnalysisTask, TextGenerator};
use crate::error::AggregationError;
use crate::models::{AggregatedInput, ResultMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Task name used for the team call in logs.
pub const TEAM_TASK_NAME: &str = "MultidisciplinaryTeam";

/// Builds an [`AggregatedInput`] from a fixed set of roles and runs a single
/// task over it.
pub struct AggregationStage {
    roles: Vec<String>,
    instructions: String,
    generator: Arc<dyn TextGenerator>,
    timeout: Option<Duration>,
}

impl AggregationStage {
    pub fn new(
        roles: Vec<String>,
        instructions: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            roles,
            instructions: instructions.into(),
            generator,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Gather each role's report from `results`. Missing roles become "".
    pub fn build_input(&self, results: &ResultMap) -> AggregatedInput {
        let input = AggregatedInput::from_results(&self.roles, results);

        let missing = input.missing_roles();
        if !missing.is_empty() {
            warn!("No report for {:?}; the team will see empty text", missing);
        }

        input
    }

    /// Run the team call over `results`.
    pub async fn execute(&self, results: &ResultMap) -> Result<String, AggregationError> {
        let input = self.build_input(results);
        let prompt = team_prompt(&self.instructions, &input.to_prompt());

        info!("Running team review over {} reports", self.roles.len());

        TextAnalysisTask::new(TEAM_TASK_NAME, prompt, Arc::clone(&self.generator))
            .with_timeout(self.timeout)
            .execute()
            .await
            .map_err(|source| AggregationError::Call { source })
    }
}
