//! Dependency-ordered execution of a plan.
//!
//! The [`Executor`] walks a plan one task at a time. A task becomes eligible
//! once every dependency has completed; among eligible tasks the first in
//! declaration order runs next (`priority` is descriptive only). Each step is
//! handed to the injected [`StepRunner`], and progress is reported through
//! [`ExecutionListener`]s and an optional [`ProgressCallback`].
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use plankit_core::{
//!     executor::{ExecuteOptions, Executor, FnRunner, StepOutcome},
//!     parser::parse,
//! };
//!
//! # async fn example() {
//! let mut plan = parse("# Demo\n\n## Task 1: Only\n\n1. Implement it\n");
//! let executor = Executor::new(Arc::new(FnRunner::new(|_step, _task| {
//!     Ok(StepOutcome::success("ok"))
//! })));
//!
//! let result = executor.execute(&mut plan, ExecuteOptions::default()).await;
//! assert!(result.success);
//! assert_eq!(result.completed_tasks, vec![1]);
//! # }
//! ```

mod control;
mod events;
mod runner;


use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    str::FromStr,
    sync::Arc,
    time::Instant,
};

use jiff::Timestamp;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub use self::{
    control::{ControlState, ExecutionControl},
    events::{ExecutionEvent, ExecutionListener, ProgressCallback, ProgressStatus},
    runner::{DryRunRunner, FnRunner, StepOutcome, StepRunner},
};
use self::{
    events::{dispatch, report},
    runner::run_step,
};
use crate::models::{Plan, PlanStatus, Task, TaskResult, TaskStatus};

/// How a failing step affects its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// Any failing step fails the task
    #[default]
    Strict,
    /// Only critical steps fail the task; other failures are recorded
    Lenient,
}

impl StepPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepPolicy::Strict => "strict",
            StepPolicy::Lenient => "lenient",
        }
    }
}

impl FromStr for StepPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(StepPolicy::Strict),
            "lenient" => Ok(StepPolicy::Lenient),
            _ => Err(format!("Invalid step policy: {s}")),
        }
    }
}

/// Options for a single [`Executor::execute`] call.
#[derive(Clone)]
pub struct ExecuteOptions {
    /// Replace the runner with [`DryRunRunner`]
    pub dry_run: bool,
    /// Abort the run after the first failed task
    pub stop_on_error: bool,
    pub step_policy: StepPolicy,
    pub on_progress: Option<ProgressCallback>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            stop_on_error: true,
            step_policy: StepPolicy::Strict,
            on_progress: None,
        }
    }
}

impl fmt::Debug for ExecuteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteOptions")
            .field("dry_run", &self.dry_run)
            .field("stop_on_error", &self.stop_on_error)
            .field("step_policy", &self.step_policy)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// Summary of one execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// No task failed or was skipped, every task was reached, and the run was
    /// not cancelled
    pub success: bool,
    /// Outcome per task id, for tasks that ran or were skipped
    pub task_results: BTreeMap<u32, TaskResult>,
    /// Ids in completion order
    pub completed_tasks: Vec<u32>,
    pub failed_tasks: Vec<u32>,
    pub skipped_tasks: Vec<u32>,
    pub duration_ms: u64,
    /// Run-level problems: cancellation, unreachable tasks
    pub errors: Vec<String>,
}

/// How a single task ended.
enum TaskRun {
    Completed,
    Failed,
    /// Failed because the run was cancelled between its steps
    Cancelled,
}

/// Runs plans against a [`StepRunner`].
pub struct Executor {
    runner: Arc<dyn StepRunner>,
    listeners: Vec<Box<dyn ExecutionListener>>,
    control: ExecutionControl,
}

impl Executor {
    pub fn new(runner: Arc<dyn StepRunner>) -> Self {
        Self {
            runner,
            listeners: Vec::new(),
            control: ExecutionControl::new(),
        }
    }

    /// Registers a listener; listeners are called in registration order.
    pub fn add_listener(&mut self, listener: impl ExecutionListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Handle for pausing, resuming or cancelling from elsewhere.
    pub fn control(&self) -> ExecutionControl {
        self.control.clone()
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn cancel(&self) {
        self.control.cancel();
    }

    pub fn is_paused_state(&self) -> bool {
        self.control.is_paused()
    }

    /// Executes every reachable task of `plan`.
    ///
    /// Task statuses and results are written back into `plan`, and
    /// `plan.status` ends as `Completed` or `Failed`. Tasks that are not
    /// pending when the call starts keep their status; completed ones still
    /// satisfy dependencies. Never fails: runner errors become failed tasks.
    pub async fn execute(&self, plan: &mut Plan, options: ExecuteOptions) -> ExecutionResult {
        let started = Instant::now();
        self.control.clear_cancellation();

        let runner: &dyn StepRunner = if options.dry_run {
            &DryRunRunner
        } else {
            self.runner.as_ref()
        };

        // First occurrence wins for duplicate ids
        let mut index = HashMap::with_capacity(plan.tasks.len());
        for (position, task) in plan.tasks.iter().enumerate() {
            index.entry(task.id).or_insert(position);
        }

        plan.status = PlanStatus::Executing;
        plan.touch();
        info!(
            "executing plan '{}' ({} tasks{})",
            plan.name,
            plan.tasks.len(),
            if options.dry_run { ", dry run" } else { "" }
        );
        self.emit(&ExecutionEvent::ExecutionStarted {
            plan_name: plan.name.clone(),
            total_tasks: plan.tasks.len(),
        });

        let mut result = ExecutionResult::default();
        let mut stop_reason = None;

        loop {
            if self.control.is_cancelled() {
                stop_reason = Some("Execution cancelled".to_string());
                break;
            }

            self.skip_blocked(plan, &index, &mut result, &options);

            let Some(position) = next_eligible(plan, &index) else {
                break;
            };
            let task_id = plan.tasks[position].id;

            match self.run_task(plan, position, runner, &options, &mut result).await {
                TaskRun::Completed => result.completed_tasks.push(task_id),
                TaskRun::Failed => {
                    result.failed_tasks.push(task_id);
                    if options.stop_on_error {
                        stop_reason = Some(format!("Execution stopped after task {task_id} failed"));
                        break;
                    }
                }
                TaskRun::Cancelled => {
                    result.failed_tasks.push(task_id);
                    stop_reason = Some("Execution cancelled".to_string());
                    break;
                }
            }
        }

        match stop_reason {
            Some(reason) => {
                if self.control.is_cancelled() {
                    result.errors.push(reason.clone());
                }
                let remaining: Vec<usize> = pending_positions(plan).collect();
                for position in remaining {
                    self.skip(plan, position, &reason, &mut result, &options);
                }
            }
            None => {
                for position in pending_positions(plan) {
                    let task = &plan.tasks[position];
                    let waiting: Vec<String> = task
                        .dependencies
                        .iter()
                        .filter(|dep| !dependency_has_status(plan, &index, **dep, TaskStatus::Completed))
                        .map(u32::to_string)
                        .collect();
                    let message = format!(
                        "Task {} is unreachable (waiting on {})",
                        task.id,
                        waiting.join(", ")
                    );
                    warn!("{message}");
                    result.errors.push(message);
                }
            }
        }

        result.success = result.failed_tasks.is_empty()
            && result.skipped_tasks.is_empty()
            && result.errors.is_empty();
        result.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        plan.status = if result.success {
            PlanStatus::Completed
        } else {
            PlanStatus::Failed
        };
        plan.touch();

        info!(
            "plan '{}' finished in {} ms: {} completed, {} failed, {} skipped",
            plan.name,
            result.duration_ms,
            result.completed_tasks.len(),
            result.failed_tasks.len(),
            result.skipped_tasks.len()
        );
        self.emit(&ExecutionEvent::ExecutionCompleted {
            success: result.success,
            duration_ms: result.duration_ms,
        });

        result
    }

    async fn run_task(
        &self,
        plan: &mut Plan,
        position: usize,
        runner: &dyn StepRunner,
        options: &ExecuteOptions,
        result: &mut ExecutionResult,
    ) -> TaskRun {
        let progress = options.on_progress.as_ref();
        let task_id = plan.tasks[position].id;

        plan.tasks[position].status = TaskStatus::InProgress;
        debug!("starting task {task_id}");
        self.emit(&ExecutionEvent::TaskStarted {
            task_id,
            task_name: plan.tasks[position].name.clone(),
        });
        report(progress, task_id, None, ProgressStatus::Started);

        let task: &Task = &plan.tasks[position];
        let mut steps: Vec<_> = task.steps.iter().collect();
        steps.sort_by_key(|step| step.number);

        let mut output = Vec::new();
        let mut failure = None;
        let mut cancelled = false;

        for step in steps {
            if !self.control.checkpoint().await {
                cancelled = true;
                failure = Some(format!(
                    "Execution cancelled before step {}",
                    step.number
                ));
                break;
            }

            report(progress, task_id, Some(step.number), ProgressStatus::Started);
            let outcome = run_step(runner, step, task).await;
            if !outcome.output.trim().is_empty() {
                output.push(outcome.output.trim_end().to_string());
            }

            if outcome.success {
                report(progress, task_id, Some(step.number), ProgressStatus::Completed);
                continue;
            }

            report(progress, task_id, Some(step.number), ProgressStatus::Failed);
            let message = format!(
                "Step {} failed: {}",
                step.number,
                outcome.error.as_deref().unwrap_or("no error reported")
            );
            if options.step_policy == StepPolicy::Lenient && !step.critical {
                debug!("task {task_id}: ignoring non-critical failure: {message}");
                output.push(format!("{message} (ignored)"));
                continue;
            }
            failure = Some(message);
            break;
        }

        let task_result = TaskResult {
            success: failure.is_none(),
            output: output.join("\n"),
            error: failure.clone(),
            completed_at: Timestamp::now(),
        };
        let status = if task_result.success {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };

        let task = &mut plan.tasks[position];
        task.status = status;
        task.result = Some(task_result.clone());
        result.task_results.insert(task_id, task_result.clone());

        self.emit(&ExecutionEvent::TaskCompleted {
            task_id,
            status,
            result: task_result,
        });

        match failure {
            None => {
                report(progress, task_id, None, ProgressStatus::Completed);
                TaskRun::Completed
            }
            Some(error) => {
                warn!("task {task_id} failed: {error}");
                self.emit(&ExecutionEvent::TaskFailed { task_id, error });
                report(progress, task_id, None, ProgressStatus::Failed);
                if cancelled {
                    TaskRun::Cancelled
                } else {
                    TaskRun::Failed
                }
            }
        }
    }

    /// Skips pending tasks whose dependencies failed or were skipped, until no
    /// more can be skipped.
    fn skip_blocked(
        &self,
        plan: &mut Plan,
        index: &HashMap<u32, usize>,
        result: &mut ExecutionResult,
        options: &ExecuteOptions,
    ) {
        loop {
            let blocked = pending_positions(plan).find_map(|position| {
                plan.tasks[position]
                    .dependencies
                    .iter()
                    .find(|dep| {
                        dependency_has_status(plan, index, **dep, TaskStatus::Failed)
                            || dependency_has_status(plan, index, **dep, TaskStatus::Skipped)
                    })
                    .map(|dep| (position, *dep))
            });
            let Some((position, dependency)) = blocked else {
                return;
            };
            let reason = format!("Dependency task {dependency} did not complete");
            self.skip(plan, position, &reason, result, options);
        }
    }

    fn skip(
        &self,
        plan: &mut Plan,
        position: usize,
        reason: &str,
        result: &mut ExecutionResult,
        options: &ExecuteOptions,
    ) {
        let task = &mut plan.tasks[position];
        let task_result = TaskResult {
            success: false,
            output: String::new(),
            error: Some(reason.to_string()),
            completed_at: Timestamp::now(),
        };
        task.status = TaskStatus::Skipped;
        task.result = Some(task_result.clone());

        let task_id = task.id;
        debug!("skipping task {task_id}: {reason}");
        result.task_results.insert(task_id, task_result);
        result.skipped_tasks.push(task_id);
        self.emit(&ExecutionEvent::TaskSkipped {
            task_id,
            reason: reason.to_string(),
        });
        report(
            options.on_progress.as_ref(),
            task_id,
            None,
            ProgressStatus::Skipped,
        );
    }

    fn emit(&self, event: &ExecutionEvent) {
        dispatch(&self.listeners, event);
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("listeners", &self.listeners.len())
            .field("control", &self.control.state())
            .finish()
    }
}

fn pending_positions(plan: &Plan) -> impl Iterator<Item = usize> + '_ {
    plan.tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.status == TaskStatus::Pending)
        .map(|(position, _)| position)
}

fn dependency_has_status(
    plan: &Plan,
    index: &HashMap<u32, usize>,
    dependency: u32,
    status: TaskStatus,
) -> bool {
    index
        .get(&dependency)
        .is_some_and(|position| plan.tasks[*position].status == status)
}

/// First pending task, in declaration order, whose dependencies all completed.
fn next_eligible(plan: &Plan, index: &HashMap<u32, usize>) -> Option<usize> {
    pending_positions(plan).find(|position| {
        plan.tasks[*position]
            .dependencies
            .iter()
            .all(|dep| dependency_has_status(plan, index, *dep, TaskStatus::Completed))
    })
}
