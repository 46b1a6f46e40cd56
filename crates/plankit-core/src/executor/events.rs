//! Execution events and the observer seams that receive them.

use std::{
    any::Any,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use log::warn;
use serde::Serialize;

use crate::models::{TaskResult, TaskStatus};

/// Something that happened during [`Executor::execute`](super::Executor::execute).
///
/// Events are delivered synchronously, in the order they occur.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
    ExecutionStarted {
        plan_name: String,
        total_tasks: usize,
    },
    TaskStarted {
        task_id: u32,
        task_name: String,
    },
    /// Emitted for every task that ran, whatever its outcome
    TaskCompleted {
        task_id: u32,
        status: TaskStatus,
        result: TaskResult,
    },
    /// Emitted after `TaskCompleted` for tasks that failed
    TaskFailed {
        task_id: u32,
        error: String,
    },
    TaskSkipped {
        task_id: u32,
        reason: String,
    },
    ExecutionCompleted {
        success: bool,
        duration_ms: u64,
    },
}

impl ExecutionEvent {
    /// Task the event refers to, if any.
    pub fn task_id(&self) -> Option<u32> {
        match self {
            ExecutionEvent::TaskStarted { task_id, .. }
            | ExecutionEvent::TaskCompleted { task_id, .. }
            | ExecutionEvent::TaskFailed { task_id, .. }
            | ExecutionEvent::TaskSkipped { task_id, .. } => Some(*task_id),
            ExecutionEvent::ExecutionStarted { .. } | ExecutionEvent::ExecutionCompleted { .. } => {
                None
            }
        }
    }
}

/// Receives execution events.
///
/// Errors and panics raised by a listener are logged and otherwise ignored;
/// they never affect the run. Any `Fn(&ExecutionEvent)` closure is a
/// listener.
pub trait ExecutionListener: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent) -> anyhow::Result<()>;
}

impl<F> ExecutionListener for F
where
    F: Fn(&ExecutionEvent) + Send + Sync,
{
    fn on_event(&self, event: &ExecutionEvent) -> anyhow::Result<()> {
        self(event);
        Ok(())
    }
}

/// Coarse progress reported through [`ProgressCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Started,
    Completed,
    Failed,
    Skipped,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Started => "started",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Failed => "failed",
            ProgressStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Called with `(task_id, step_number, status)`; `step_number` is `None` for
/// task-level progress.
pub type ProgressCallback = Arc<dyn Fn(u32, Option<u32>, ProgressStatus) + Send + Sync>;

/// Delivers `event` to every listener, isolating their failures.
pub(crate) fn dispatch(listeners: &[Box<dyn ExecutionListener>], event: &ExecutionEvent) {
    for (index, listener) in listeners.iter().enumerate() {
        match catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!("listener {index} failed on {event:?}: {err:#}"),
            Err(panic) => warn!(
                "listener {index} panicked on {event:?}: {}",
                panic_message(panic.as_ref())
            ),
        }
    }
}

/// Invokes the progress callback, isolating its failures like a listener.
pub(crate) fn report(
    callback: Option<&ProgressCallback>,
    task_id: u32,
    step_number: Option<u32>,
    status: ProgressStatus,
) {
    let Some(callback) = callback else {
        return;
    };
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(task_id, step_number, status))) {
        warn!(
            "progress callback panicked for task {task_id}: {}",
            panic_message(panic.as_ref())
        );
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
