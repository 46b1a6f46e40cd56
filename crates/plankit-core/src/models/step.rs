//! Step model definition and related functionality.

use serde::{Deserialize, Serialize};

use super::StepType;

/// The smallest unit of execution within a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    /// Position within the task, starting at 1
    pub number: u32,

    pub description: String,

    #[serde(rename = "type", default)]
    pub step_type: StepType,

    /// Code snippet attached to the step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Language tag of the code fence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Shell command that performs or checks the step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,

    /// Failure of a critical step always fails its task
    #[serde(default)]
    pub critical: bool,
}

impl Step {
    /// Creates a step with no code, command or expectations.
    pub fn new(number: u32, description: impl Into<String>, step_type: StepType) -> Self {
        Self {
            number,
            description: description.into(),
            step_type,
            code: None,
            language: None,
            command: None,
            expected_output: None,
            critical: false,
        }
    }

    /// Creates a step whose type is inferred from the description.
    pub fn inferred(number: u32, description: impl Into<String>) -> Self {
        let description = description.into();
        let step_type = StepType::infer(&description);
        Self::new(number, description, step_type)
    }
}
