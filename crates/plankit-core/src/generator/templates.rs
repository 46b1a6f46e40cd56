//! Built-in task templates.
//!
//! Each template is a canned list of steps with a `{name}` placeholder that
//! is replaced by the task name when the template is instantiated.

use serde::Serialize;

use crate::{models::StepType, params::NewStep};

/// Placeholder substituted with the task name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// One canned step of a template.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateStep {
    pub description: &'static str,
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<&'static str>,
    pub critical: bool,
}

/// A reusable task shape.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TaskTemplate {
    /// Catalog key, e.g. `fix-bug`
    pub name: &'static str,
    pub summary: &'static str,
    pub estimated_minutes: u32,
    pub steps: &'static [TemplateStep],
}

impl TaskTemplate {
    /// Instantiates the steps for a task called `task_name`.
    pub fn steps_for(&self, task_name: &str) -> Vec<NewStep> {
        self.steps
            .iter()
            .map(|step| NewStep {
                description: step.description.replace(NAME_PLACEHOLDER, task_name),
                step_type: Some(step.step_type),
                expected_output: step.expected_output.map(str::to_string),
                critical: step.critical,
                ..Default::default()
            })
            .collect()
    }
}

const fn step(description: &'static str, step_type: StepType) -> TemplateStep {
    TemplateStep {
        description,
        step_type,
        expected_output: None,
        critical: false,
    }
}

const fn expecting(
    description: &'static str,
    step_type: StepType,
    expected_output: &'static str,
) -> TemplateStep {
    TemplateStep {
        description,
        step_type,
        expected_output: Some(expected_output),
        critical: false,
    }
}

const fn critical(description: &'static str, step_type: StepType) -> TemplateStep {
    TemplateStep {
        description,
        step_type,
        expected_output: None,
        critical: true,
    }
}

static CATALOG: &[TaskTemplate] = &[
    TaskTemplate {
        name: "create-component",
        summary: "Create a new component test-first",
        estimated_minutes: 5,
        steps: &[
            step("Write a failing test for {name}", StepType::Test),
            expecting("Run the test to see it fail", StepType::Verify, "FAIL"),
            step("Implement {name}", StepType::Implement),
            expecting("Run the test to see it pass", StepType::Verify, "PASS"),
            step("Commit {name}", StepType::Commit),
        ],
    },
    TaskTemplate {
        name: "add-api-endpoint",
        summary: "Add an API endpoint with request tests",
        estimated_minutes: 8,
        steps: &[
            step("Write a failing request test for the {name} endpoint", StepType::Test),
            step("Define the request and response types for {name}", StepType::Implement),
            critical("Implement the {name} handler and route", StepType::Implement),
            expecting("Run the endpoint tests", StepType::Verify, "PASS"),
            step("Commit the {name} endpoint", StepType::Commit),
        ],
    },
    TaskTemplate {
        name: "fix-bug",
        summary: "Reproduce a bug with a test, then fix it",
        estimated_minutes: 5,
        steps: &[
            step("Write a test that reproduces {name}", StepType::Test),
            expecting("Run the test to confirm the bug", StepType::Verify, "FAIL"),
            critical("Fix {name}", StepType::Implement),
            expecting("Run the full test suite", StepType::Verify, "PASS"),
            step("Commit the fix for {name}", StepType::Commit),
        ],
    },
    TaskTemplate {
        name: "add-feature",
        summary: "Add a feature in small test-first steps",
        estimated_minutes: 10,
        steps: &[
            step("Write failing tests for {name}", StepType::Test),
            step("Implement {name}", StepType::Implement),
            expecting("Run the tests", StepType::Verify, "PASS"),
            step("Review {name} for edge cases", StepType::Review),
            step("Commit {name}", StepType::Commit),
        ],
    },
    TaskTemplate {
        name: "refactor",
        summary: "Restructure code without changing behaviour",
        estimated_minutes: 5,
        steps: &[
            expecting("Run the tests before refactoring {name}", StepType::Verify, "PASS"),
            step("Refactor {name}", StepType::Implement),
            critical("Run the tests after refactoring {name}", StepType::Verify),
            step("Commit the {name} refactor", StepType::Commit),
        ],
    },
    TaskTemplate {
        name: "write-docs",
        summary: "Document a component",
        estimated_minutes: 5,
        steps: &[
            step("Write documentation for {name}", StepType::Implement),
            step("Review the {name} documentation", StepType::Review),
            step("Commit the {name} documentation", StepType::Commit),
        ],
    },
];

/// Every built-in template, in catalog order.
pub fn list_templates() -> &'static [TaskTemplate] {
    CATALOG
}

/// Looks up a template by name, ignoring case.
pub fn find_template(name: &str) -> Option<&'static TaskTemplate> {
    CATALOG
        .iter()
        .find(|template| template.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names() {
        let names: Vec<_> = list_templates().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "create-component",
                "add-api-endpoint",
                "fix-bug",
                "add-feature",
                "refactor",
                "write-docs"
            ]
        );
    }

    #[test]
    fn test_every_template_mentions_name() {
        for template in list_templates() {
            assert!(!template.steps.is_empty(), "{}", template.name);
            assert!(
                template
                    .steps
                    .iter()
                    .any(|step| step.description.contains(NAME_PLACEHOLDER)),
                "{} never uses the placeholder",
                template.name
            );
        }
    }

    #[test]
    fn test_find_template_is_case_insensitive() {
        assert_eq!(find_template("Fix-Bug").map(|t| t.name), Some("fix-bug"));
        assert!(find_template("deploy").is_none());
    }

    #[test]
    fn test_steps_for_substitutes_name() {
        let template = find_template("fix-bug").unwrap();
        let steps = template.steps_for("login crash");
        assert_eq!(steps[2].description, "Fix login crash");
        assert!(steps[2].critical);
        assert_eq!(steps[1].expected_output.as_deref(), Some("FAIL"));
        assert_eq!(steps[0].step_type, Some(StepType::Test));
    }
}
