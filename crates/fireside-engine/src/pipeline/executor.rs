//! # Pipeline Executor
//!
//! A request maps to an ordered list of stages sharing one mutable
//! [`RequestContext`]. Each stage either continues, short-circuits with
//! the final result, or fails. Failure aborts the chain; because every
//! mutation is deferred to a single store call inside the terminal
//! stage, an aborted pipeline has never touched the table.
//!
//! Lifecycle: `Pending → Running(stage i) → Done`, where `Done` is
//! reached by a stage returning a result or by an error.

use crate::domain::RequestContext;
use async_trait::async_trait;
use shared_types::CoreError;
use tracing::{debug, instrument};

/// What a stage decided.
#[derive(Debug)]
pub enum StageOutcome<R> {
    /// Proceed to the next stage.
    Continue,
    /// Skip every remaining stage and return this result.
    Done(R),
}

/// One authorization or business step in a pipeline.
#[async_trait]
pub trait Stage<R: Send>: Send + Sync {
    /// Stable name for tracing.
    fn name(&self) -> &'static str;

    /// Runs against the shared context.
    async fn run(&self, ctx: &mut RequestContext) -> Result<StageOutcome<R>, CoreError>;
}

/// An ordered list of stages producing an `R`.
pub struct Pipeline<R: Send> {
    operation: &'static str,
    stages: Vec<Box<dyn Stage<R>>>,
}

impl<R: Send> Pipeline<R> {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            stages: Vec::new(),
        }
    }

    /// Appends a stage.
    pub fn stage(mut self, stage: impl Stage<R> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Appends an already-boxed stage (for stages chosen at runtime).
    pub fn stage_boxed(mut self, stage: Box<dyn Stage<R>>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Runs the chain to completion.
    ///
    /// # Errors
    /// The first stage error, verbatim. A pipeline whose stages all
    /// continue without producing a result is a construction bug.
    #[instrument(skip_all, fields(operation = self.operation))]
    pub async fn execute(&self, ctx: &mut RequestContext) -> Result<R, CoreError> {
        for (index, stage) in self.stages.iter().enumerate() {
            debug!(stage = stage.name(), index, "running stage");
            match stage.run(ctx).await {
                Ok(StageOutcome::Continue) => {}
                Ok(StageOutcome::Done(result)) => {
                    if index + 1 < self.stages.len() {
                        debug!(
                            stage = stage.name(),
                            skipped = self.stages.len() - index - 1,
                            "pipeline short-circuited"
                        );
                    }
                    return Ok(result);
                }
                Err(err) => {
                    debug!(stage = stage.name(), error = %err, "pipeline aborted");
                    return Err(err);
                }
            }
        }
        Err(CoreError::Internal(format!(
            "pipeline {} ended without a result",
            self.operation
        )))
    }
}
