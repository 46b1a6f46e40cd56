//! Pause, resume and cancel signalling for a running execution.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

/// Execution control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    #[default]
    Running,
    Paused,
    Cancelled,
}

/// Cloneable handle driving an [`Executor`](super::Executor) from another
/// task, a signal handler or a UI.
///
/// The executor consults the state only at step boundaries: a pause takes
/// effect before the next step starts and a cancel stops the run there. A
/// step already in flight is never interrupted.
#[derive(Debug, Clone)]
pub struct ExecutionControl {
    state: Arc<watch::Sender<ControlState>>,
}

impl ExecutionControl {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ControlState::Running);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> ControlState {
        *self.state.borrow()
    }

    /// Requests a pause before the next step. Has no effect once cancelled.
    pub fn pause(&self) {
        self.transition(ControlState::Running, ControlState::Paused);
    }

    /// Lets a paused execution continue.
    pub fn resume(&self) {
        self.transition(ControlState::Paused, ControlState::Running);
    }

    /// Stops the execution at the next step boundary. Also releases a pause.
    pub fn cancel(&self) {
        self.state.send_replace(ControlState::Cancelled);
    }

    pub fn is_paused(&self) -> bool {
        self.state() == ControlState::Paused
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == ControlState::Cancelled
    }

    /// Forgets a cancellation left over from a previous run.
    pub(crate) fn clear_cancellation(&self) {
        self.transition(ControlState::Cancelled, ControlState::Running);
    }

    /// Waits out a pause. Returns `false` when the run has been cancelled.
    pub(crate) async fn checkpoint(&self) -> bool {
        let mut receiver = self.state.subscribe();
        let cancelled = match receiver
            .wait_for(|state| *state != ControlState::Paused)
            .await
        {
            Ok(state) => *state == ControlState::Cancelled,
            // The sender lives in `self`, so the channel cannot close here
            Err(_) => false,
        };
        !cancelled
    }

    fn transition(&self, from: ControlState, to: ControlState) {
        self.state.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        });
    }
}

impl Default for ExecutionControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_transitions() {
        let control = ExecutionControl::new();
        assert_eq!(control.state(), ControlState::Running);

        control.pause();
        assert!(control.is_paused());
        control.resume();
        assert_eq!(control.state(), ControlState::Running);

        control.resume();
        assert_eq!(control.state(), ControlState::Running);

        control.cancel();
        control.pause();
        assert!(control.is_cancelled());

        control.clear_cancellation();
        assert_eq!(control.state(), ControlState::Running);
    }

    #[test]
    fn test_clones_share_state() {
        let control = ExecutionControl::new();
        let handle = control.clone();
        handle.pause();
        assert!(control.is_paused());
    }

    #[tokio::test]
    async fn test_checkpoint_passes_when_running() {
        assert!(ExecutionControl::new().checkpoint().await);
    }

    #[tokio::test]
    async fn test_checkpoint_waits_for_resume() {
        let control = ExecutionControl::new();
        control.pause();

        let waiter = {
            let control = control.clone();
            tokio::spawn(async move { control.checkpoint().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        control.resume();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_cancel_releases_paused_checkpoint() {
        let control = ExecutionControl::new();
        control.pause();

        let waiter = {
            let control = control.clone();
            tokio::spawn(async move { control.checkpoint().await })
        };
        control.cancel();
        assert!(!waiter.await.unwrap());
    }
}
