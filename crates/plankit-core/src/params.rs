//! Parameter structures for plankit operations
//!
//! These structures are shared by every interface (CLI, MCP, embedding
//! applications) and carry no framework-specific derives beyond serde. JSON
//! schema generation is available behind the `schema` feature so the MCP
//! server can expose them directly:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{FileRefs, Step, StepType};

/// Parameters for creating a new plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePlan {
    /// Name of the plan
    pub name: String,
    /// What the plan should achieve
    pub goal: String,
    /// Optional free-text architecture notes
    #[serde(default)]
    pub architecture: Option<String>,
    /// Technologies involved
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Path or link to the design document
    #[serde(default)]
    pub design_doc: Option<String>,
}

/// Parameters for one step of a new task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct NewStep {
    /// What the step does
    pub description: String,
    /// Step type; inferred from the description when omitted
    #[serde(default, rename = "type")]
    pub step_type: Option<StepType>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Shell command performing or checking the step
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub critical: bool,
}

impl NewStep {
    /// A step with only a description; its type is inferred.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Sets an explicit step type.
    pub fn with_type(mut self, step_type: StepType) -> Self {
        self.step_type = Some(step_type);
        self
    }

    /// Sets the command to run.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub(crate) fn into_step(self, number: u32) -> Step {
        let step_type = self
            .step_type
            .unwrap_or_else(|| StepType::infer(&self.description));
        Step {
            number,
            description: self.description,
            step_type,
            code: self.code,
            language: self.language,
            command: self.command,
            expected_output: self.expected_output,
            critical: self.critical,
        }
    }
}

/// Parameters for adding a task to a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct NewTask {
    /// Name of the task
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: FileRefs,
    /// Steps in execution order; they are numbered from 1
    #[serde(default)]
    pub steps: Vec<NewStep>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    /// Ids of tasks that must complete first
    #[serde(default)]
    pub dependencies: Vec<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Option<u32>,
}

impl NewTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Appends a step.
    pub fn step(mut self, step: NewStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Sets the dependencies.
    pub fn depends_on(mut self, dependencies: impl IntoIterator<Item = u32>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }
}

/// Parameters for instantiating a task template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct TemplateTask {
    /// Name of the resulting task; substituted for `{name}` in step text
    pub name: String,
    #[serde(default)]
    pub files: FileRefs,
    #[serde(default)]
    pub dependencies: Vec<u32>,
}

impl TemplateTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
