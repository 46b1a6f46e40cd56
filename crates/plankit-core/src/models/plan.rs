//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{PlanStatus, Task};

/// Represents a complete plan: a goal and the ordered tasks that reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Name of the plan, taken from the level-1 heading
    pub name: String,

    /// What the plan is meant to achieve
    pub goal: String,

    /// Free-text architecture notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    /// Technologies the plan relies on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tech_stack: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Path or link to the design document the plan implements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_doc: Option<String>,

    /// Tasks in declaration order (not execution order)
    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub status: PlanStatus,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last modified (UTC)
    pub updated_at: Timestamp,
}

impl Plan {
    /// Creates an empty draft plan stamped with the current time.
    pub fn new(name: impl Into<String>, goal: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            name: name.into(),
            goal: goal.into(),
            architecture: None,
            tech_stack: Vec::new(),
            version: None,
            author: None,
            design_doc: None,
            tasks: Vec::new(),
            status: PlanStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Looks up a task by its id.
    pub fn task(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Looks up a task by its id for mutation.
    pub fn task_mut(&mut self, id: u32) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    /// Highest task id in the plan, or 0 when there are no tasks.
    pub fn max_task_id(&self) -> u32 {
        self.tasks.iter().map(|task| task.id).max().unwrap_or(0)
    }

    /// Records a modification.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
