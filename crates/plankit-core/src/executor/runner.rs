//! The step runner seam: the only place execution touches the outside world.

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use log::warn;
use serde::Serialize;

use super::events::panic_message;
use crate::models::{Step, Task};

/// What running one step produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// Attaches output to a failure.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

/// Performs the effect of a single step.
///
/// An `Err` is treated exactly like an unsuccessful [`StepOutcome`]. The
/// executor imposes no timeout; a runner that needs one owns it.
#[async_trait]
pub trait StepRunner: Send + Sync {
    async fn run(&self, step: &Step, task: &Task) -> anyhow::Result<StepOutcome>;
}

/// Runner used for dry runs: reports success without doing anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

#[async_trait]
impl StepRunner for DryRunRunner {
    async fn run(&self, step: &Step, task: &Task) -> anyhow::Result<StepOutcome> {
        Ok(StepOutcome::success(format!(
            "[dry run] task {} step {}: {}",
            task.id, step.number, step.description
        )))
    }
}

/// Adapts a synchronous closure into a [`StepRunner`].
///
/// ```rust
/// use plankit_core::executor::{FnRunner, StepOutcome};
///
/// let runner = FnRunner::new(|step, _task| Ok(StepOutcome::success(step.description.clone())));
/// # let _ = runner;
/// ```
pub struct FnRunner<F> {
    run: F,
}

impl<F> FnRunner<F>
where
    F: Fn(&Step, &Task) -> anyhow::Result<StepOutcome> + Send + Sync,
{
    pub fn new(run: F) -> Self {
        Self { run }
    }
}

#[async_trait]
impl<F> StepRunner for FnRunner<F>
where
    F: Fn(&Step, &Task) -> anyhow::Result<StepOutcome> + Send + Sync,
{
    async fn run(&self, step: &Step, task: &Task) -> anyhow::Result<StepOutcome> {
        (self.run)(step, task)
    }
}

/// Runs one step, turning runner errors and panics into failed outcomes.
pub(crate) async fn run_step(runner: &dyn StepRunner, step: &Step, task: &Task) -> StepOutcome {
    match AssertUnwindSafe(runner.run(step, task)).catch_unwind().await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            warn!("step {} of task {} errored: {err:#}", step.number, task.id);
            StepOutcome::failure(format!("{err:#}"))
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!(
                "step runner panicked on step {} of task {}: {message}",
                step.number, task.id
            );
            StepOutcome::failure(format!("step runner panicked: {message}"))
        }
    }
}
