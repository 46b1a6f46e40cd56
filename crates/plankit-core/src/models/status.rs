//! Status and type enumerations for plans, tasks and steps.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle of a whole plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Freshly parsed or generated, not yet validated
    #[default]
    Draft,

    /// Validated without blocking issues
    Ready,

    /// An executor is currently driving the plan
    Executing,

    /// Every task completed
    Completed,

    /// At least one task failed, was skipped or never became reachable
    Failed,
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PlanStatus::Draft),
            "ready" => Ok(PlanStatus::Ready),
            "executing" => Ok(PlanStatus::Executing),
            "completed" => Ok(PlanStatus::Completed),
            "failed" => Ok(PlanStatus::Failed),
            _ => Err(format!("Invalid plan status: {s}")),
        }
    }
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::Ready => "ready",
            PlanStatus::Executing => "executing",
            PlanStatus::Completed => "completed",
            PlanStatus::Failed => "failed",
        }
    }
}

/// Lifecycle of a single task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for its dependencies or for the executor
    #[default]
    Pending,

    /// Being planned in more detail by an agent
    Planning,

    /// Steps are running
    InProgress,

    /// Work is done and awaiting review
    UnderReview,

    /// All steps succeeded
    Completed,

    /// A step failed or the run was cancelled mid-task
    Failed,

    /// Never ran because a dependency failed or the run aborted
    Skipped,
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "planning" => Ok(TaskStatus::Planning),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "under_review" | "underreview" => Ok(TaskStatus::UnderReview),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            "skipped" => Ok(TaskStatus::Skipped),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Planning => "planning",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::UnderReview => "under_review",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        }
    }

    /// Whether the task can no longer change during an execution.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plankit_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(TaskStatus::InProgress.with_icon(), "➤ In Progress");
    /// assert_eq!(TaskStatus::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "○ Pending",
            TaskStatus::Planning => "◐ Planning",
            TaskStatus::InProgress => "➤ In Progress",
            TaskStatus::UnderReview => "◎ Under Review",
            TaskStatus::Completed => "✓ Completed",
            TaskStatus::Failed => "✗ Failed",
            TaskStatus::Skipped => "↷ Skipped",
        }
    }
}

/// Kind of work a step performs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Test,
    #[default]
    Implement,
    Verify,
    Review,
    Commit,
}

impl FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "test" => Ok(StepType::Test),
            "implement" => Ok(StepType::Implement),
            "verify" => Ok(StepType::Verify),
            "review" => Ok(StepType::Review),
            "commit" => Ok(StepType::Commit),
            _ => Err(format!("Invalid step type: {s}")),
        }
    }
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Test => "test",
            StepType::Implement => "implement",
            StepType::Verify => "verify",
            StepType::Review => "review",
            StepType::Commit => "commit",
        }
    }

    /// Infer a step type from its description.
    ///
    /// Keywords are matched case-insensitively with a fixed priority:
    /// test, then verify, then commit; anything else is `Implement`.
    ///
    /// ```rust
    /// use plankit_core::models::StepType;
    ///
    /// assert_eq!(StepType::infer("Write the failing test"), StepType::Test);
    /// assert_eq!(StepType::infer("Verify the output and commit"), StepType::Verify);
    /// assert_eq!(StepType::infer("Commit changes"), StepType::Commit);
    /// assert_eq!(StepType::infer("Add the handler"), StepType::Implement);
    /// ```
    pub fn infer(description: &str) -> Self {
        const RULES: [(StepType, &[&str]); 3] = [
            (StepType::Test, &["test", "spec"]),
            (StepType::Verify, &["verify", "check", "confirm", "ensure"]),
            (StepType::Commit, &["commit"]),
        ];

        let lower = description.to_lowercase();
        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map_or(StepType::Implement, |(step_type, _)| *step_type)
    }
}
