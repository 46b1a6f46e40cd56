//! Task model definition and related functionality.

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Step, StepType, TaskStatus};

/// Files a task touches, grouped by what happens to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct FileRefs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modify: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<String>,
}

impl FileRefs {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.modify.is_empty()
            && self.test.is_empty()
            && self.delete.is_empty()
    }
}

/// Outcome of running a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResult {
    pub success: bool,

    /// Collected output of every step that ran
    pub output: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub completed_at: Timestamp,
}

/// A unit of work with ordered steps and optional dependencies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Positive identifier, unique within the plan
    pub id: u32,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub files: FileRefs,

    /// Steps, numbered sequentially from 1
    #[serde(default)]
    pub steps: Vec<Step>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,

    /// Ids of tasks that must complete before this one may start
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Descriptive only; scheduling ignores it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
}

impl Task {
    /// Creates a pending task with no steps.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            files: FileRefs::default(),
            steps: Vec::new(),
            estimated_minutes: None,
            dependencies: Vec::new(),
            tags: Vec::new(),
            priority: None,
            status: TaskStatus::Pending,
            result: None,
        }
    }

    /// Whether any step has the given type.
    pub fn has_step_type(&self, step_type: StepType) -> bool {
        self.steps.iter().any(|step| step.step_type == step_type)
    }

    /// Whether the task carries tests, either as a test step or as test files.
    pub fn has_tests(&self) -> bool {
        self.has_step_type(StepType::Test) || !self.files.test.is_empty()
    }

    /// Renumbers steps sequentially from 1 in their current order.
    pub fn renumber_steps(&mut self) {
        for (index, step) in self.steps.iter_mut().enumerate() {
            step.number = index as u32 + 1;
        }
    }
}
