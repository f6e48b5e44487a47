//! Two-stage pipeline: specialists in parallel, then the team.
//!
//! A run moves through `Idle -> Dispatching -> Aggregating -> Done`, or
//! ends in `Failed` from either working state. Nothing carries over between
//! runs; every call to [`Pipeline::run`] starts again from `Idle`.

use crate::agent::prompts::{specialist_instructions, specialist_prompt, TEAM_PROMPT};
use crate::agent::{TextAnalysisTask, TextGenerator};
use crate::analysis::aggregator::AggregationStage;
use crate::analysis::dispatcher::{Batch, ConcurrentDispatcher};
use crate::error::{DispatchError, PipelineError};
use crate::models::{ResultMap, Specialist};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Dispatching,
    Aggregating,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether a run may move from `self` to `next`.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Dispatching)
                | (Dispatching, Aggregating)
                | (Dispatching, Failed)
                | (Aggregating, Done)
                | (Aggregating, Failed)
        )
    }

    #[allow(dead_code)] // Utility for state observers
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineState::Idle => "idle",
            PipelineState::Dispatching => "dispatching",
            PipelineState::Aggregating => "aggregating",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// Knobs shared by every task in a run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Upper bound on concurrently running specialist calls.
    pub concurrency: usize,
    /// Per-call limit. `None` waits indefinitely.
    pub task_timeout: Option<Duration>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            task_timeout: None,
        }
    }
}

/// A first-stage participant: its task name, instructions and model.
pub struct SpecialistAgent {
    name: String,
    instructions: String,
    generator: Arc<dyn TextGenerator>,
}

impl SpecialistAgent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            generator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Successful result of a run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Each specialist's output, keyed by name.
    pub results: ResultMap,
    /// The team's final text.
    pub final_text: String,
}

/// Specialists, then the team. The single entry point for an analysis.
pub struct Pipeline {
    specialists: Vec<SpecialistAgent>,
    dispatcher: ConcurrentDispatcher,
    aggregation: AggregationStage,
    task_timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new(
        specialists: Vec<SpecialistAgent>,
        aggregation: AggregationStage,
        settings: &PipelineSettings,
    ) -> Self {
        Self {
            specialists,
            dispatcher: ConcurrentDispatcher::new(settings.concurrency),
            aggregation: aggregation.with_timeout(settings.task_timeout),
            task_timeout: settings.task_timeout,
        }
    }

    /// The cardiologist / psychologist / pulmonologist panel feeding a
    /// multidisciplinary team, all served by `generator`.
    pub fn medical(generator: Arc<dyn TextGenerator>, settings: &PipelineSettings) -> Self {
        let specialists = Specialist::ALL
            .iter()
            .map(|role| {
                SpecialistAgent::new(
                    role.name(),
                    specialist_instructions(*role),
                    Arc::clone(&generator),
                )
            })
            .collect();

        let roles = Specialist::ALL.iter().map(|r| r.name().to_string()).collect();
        let aggregation = AggregationStage::new(roles, TEAM_PROMPT, generator);

        Self::new(specialists, aggregation, settings)
    }

    /// Names of the first-stage tasks.
    pub fn specialist_names(&self) -> Vec<&str> {
        self.specialists.iter().map(|s| s.name()).collect()
    }

    /// Analyse `report`, returning the team's text and every specialist's
    /// output, or the first failure.
    pub async fn run(&self, report: &str) -> Result<PipelineOutcome, PipelineError> {
        let (state, _) = watch::channel(PipelineState::Idle);
        self.run_observed(report, &state).await
    }

    /// Same as [`Pipeline::run`], publishing each state change on `state`.
    pub async fn run_observed(
        &self,
        report: &str,
        state: &watch::Sender<PipelineState>,
    ) -> Result<PipelineOutcome, PipelineError> {
        state.send_replace(PipelineState::Idle);

        let outcome = self.run_stages(report, state).await;
        if let Err(ref e) = outcome {
            error!(stage = e.stage(), "Pipeline failed: {}", e);
            advance(state, PipelineState::Failed);
        }

        outcome
    }

    async fn run_stages(
        &self,
        report: &str,
        state: &watch::Sender<PipelineState>,
    ) -> Result<PipelineOutcome, PipelineError> {
        advance(state, PipelineState::Dispatching);
        let batch = self.build_batch(report)?;
        let results = self.dispatcher.dispatch(batch).await?;

        advance(state, PipelineState::Aggregating);
        let final_text = self.aggregation.execute(&results).await?;

        advance(state, PipelineState::Done);
        info!("Pipeline complete ({} bytes of final text)", final_text.len());

        Ok(PipelineOutcome {
            results,
            final_text,
        })
    }

    fn build_batch(&self, report: &str) -> Result<Batch, DispatchError> {
        Batch::from_tasks(self.specialists.iter().map(|s| {
            TextAnalysisTask::new(
                s.name.clone(),
                specialist_prompt(&s.instructions, report),
                Arc::clone(&s.generator),
            )
            .with_timeout(self.task_timeout)
        }))
    }
}

fn advance(state: &watch::Sender<PipelineState>, next: PipelineState) {
    let current = *state.borrow();
    debug_assert!(
        current.can_transition_to(next),
        "invalid pipeline transition {} -> {}",
        current,
        next
    );
    debug!("Pipeline {} -> {}", current, next);
    state.send_replace(next);
}
