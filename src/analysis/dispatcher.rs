//! Concurrent fan-out of independent tasks with fail-fast fan-in.
//!
//! Every task in a [`Batch`] runs on its own tokio worker, bounded by a
//! semaphore that is never narrower than the batch, so no task waits on a
//! sibling to start. Completions are observed in arrival order and stored under the
//! task's name. The first failure ends the batch: the error names the
//! failing task, and the remaining workers are aborted when the `JoinSet`
//! holding them is dropped. Their outputs, if any, are never read.
//!
//! When several tasks fail at about the same time, whichever failure is
//! observed first is reported. Which one that is depends on scheduling and
//! is not deterministic.

use crate::agent::TextAnalysisTask;
use crate::error::{DispatchError, ExternalCallError};
use crate::models::ResultMap;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// An ordered set of uniquely named tasks submitted together.
#[derive(Debug, Default)]
pub struct Batch {
    tasks: Vec<TextAnalysisTask>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a batch, rejecting duplicate names.
    pub fn from_tasks(
        tasks: impl IntoIterator<Item = TextAnalysisTask>,
    ) -> Result<Self, DispatchError> {
        let mut batch = Self::new();
        for task in tasks {
            batch.push(task)?;
        }
        Ok(batch)
    }

    /// Add a task. Fails if a task with the same name is already present.
    pub fn push(&mut self, task: TextAnalysisTask) -> Result<(), DispatchError> {
        if self.tasks.iter().any(|t| t.name() == task.name()) {
            return Err(DispatchError::DuplicateTask(task.name().to_string()));
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task names in submission order.
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }
}

/// What a worker hands back: the task name and how the call ended.
type WorkerOutcome = (String, std::thread::Result<Result<String, ExternalCallError>>);

/// Runs a [`Batch`] concurrently and collects a [`ResultMap`].
#[derive(Debug, Clone)]
pub struct ConcurrentDispatcher {
    concurrency: usize,
}

impl Default for ConcurrentDispatcher {
    fn default() -> Self {
        Self::new(4)
    }
}

impl ConcurrentDispatcher {
    /// Create a dispatcher with a pool of `concurrency` workers. A batch
    /// wider than that widens the pool for its own run.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    #[allow(dead_code)] // Accessor
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Permits for a batch of `width` tasks.
    fn pool_size(&self, width: usize) -> usize {
        self.concurrency.max(width)
    }

    /// Run every task and return their outputs keyed by name.
    ///
    /// Returns as soon as one task fails, with that task's name.
    pub async fn dispatch(&self, batch: Batch) -> Result<ResultMap, DispatchError> {
        if batch.is_empty() {
            return Err(DispatchError::EmptyBatch);
        }

        let width = batch.len();
        let pool = self.pool_size(width);
        if pool > self.concurrency {
            warn!(
                "Worker pool ({}) is narrower than the batch ({}); widening to {}",
                self.concurrency, width, pool
            );
        }
        info!("Dispatching {} tasks: {:?}", width, batch.names());

        let semaphore = Arc::new(Semaphore::new(pool));
        let mut workers: JoinSet<WorkerOutcome> = JoinSet::new();

        for task in batch.tasks {
            let semaphore = Arc::clone(&semaphore);
            workers.spawn(async move {
                let name = task.name().to_string();
                let outcome = AssertUnwindSafe(async move {
                    // The semaphore is never closed.
                    let _permit = semaphore.acquire().await.ok();
                    task.execute().await
                })
                .catch_unwind()
                .await;
                (name, outcome)
            });
        }

        let mut results = ResultMap::with_capacity(width);

        while let Some(joined) = workers.join_next().await {
            let (name, outcome) = joined.map_err(|e| DispatchError::Join(e.to_string()))?;

            match outcome {
                Ok(Ok(output)) => {
                    debug!(task = %name, "task finished ({}/{})", results.len() + 1, width);
                    results.insert(name, output);
                }
                Ok(Err(source)) => {
                    error!(task = %name, error = %source, "task failed, abandoning batch");
                    return Err(DispatchError::TaskFailed { task: name, source });
                }
                Err(_) => {
                    error!(task = %name, "task panicked, abandoning batch");
                    return Err(DispatchError::WorkerPanicked { task: name });
                }
            }
        }

        info!("All {} tasks completed", results.len());
        Ok(results)
    }
}
