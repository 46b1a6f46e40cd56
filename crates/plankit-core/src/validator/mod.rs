//! Plan validation.
//!
//! [`validate`] inspects a [`Plan`] without mutating it and reports every
//! problem it finds as a [`ValidationIssue`]. Nothing here ever fails: a
//! dependency cycle is an issue like any other. Callers are expected to gate
//! execution on [`ValidationResult::valid`].

pub mod graph;


use std::collections::HashSet;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{Plan, StepType, Task};

/// Estimated minutes assumed for a task without an estimate.
pub const DEFAULT_TASK_MINUTES: u32 = 3;

/// Knobs controlling which checks run and how strict they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default)]
pub struct ValidationOptions {
    pub max_task_minutes: u32,
    pub min_task_minutes: u32,
    /// Every task needs a test step or test files
    pub require_tests: bool,
    /// Every task needs a commit step
    pub require_commits: bool,
    pub max_steps_per_task: usize,
    pub min_steps_per_task: usize,
    /// Every task needs at least one file reference
    pub require_files: bool,
    /// Warnings also make the plan invalid
    pub strict: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_task_minutes: 10,
            min_task_minutes: 1,
            require_tests: false,
            require_commits: false,
            max_steps_per_task: 15,
            min_steps_per_task: 1,
            require_files: false,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// Blocks execution
    Error,
    /// Blocks execution only in strict mode
    Warning,
    /// Advisory
    Info,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Info => "info",
        }
    }
}

/// A single finding about the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    fn new(severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            task_id: None,
            step_number: None,
            suggestion: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, message)
    }

    fn warning(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Warning, message)
    }

    fn info(message: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Info, message)
    }

    fn task(mut self, task_id: u32) -> Self {
        self.task_id = Some(task_id);
        self
    }

    fn step(mut self, step_number: u32) -> Self {
        self.step_number = Some(step_number);
        self
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Aggregate numbers about a plan, reported regardless of validity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_tasks: usize,
    pub total_steps: usize,
    /// Sum of task estimates, counting [`DEFAULT_TASK_MINUTES`] when missing
    pub estimated_minutes: u32,
    pub tasks_with_tests: usize,
    pub tasks_with_commits: usize,
    /// Rounded to one decimal
    pub avg_steps_per_task: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub stats: ValidationStats,
}

impl ValidationResult {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(IssueSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(IssueSeverity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(IssueSeverity::Info)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    fn with_severity(&self, severity: IssueSeverity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity == severity)
    }
}

/// Validates a plan against the given options.
///
/// ```rust
/// use plankit_core::{parser::parse, validator::{validate, ValidationOptions}};
///
/// let plan = parse("# P\n\nGoal: G\n\n## Task 1: A\n**Depends on:** 2\n1. Do\n\n## Task 2: B\n**Depends on:** 1\n1. Do\n");
/// let result = validate(&plan, &ValidationOptions::default());
/// assert!(!result.valid);
/// assert!(result.errors().any(|issue| issue.message.contains("1 -> 2 -> 1")));
/// ```
pub fn validate(plan: &Plan, options: &ValidationOptions) -> ValidationResult {
    let mut issues = Vec::new();

    check_plan(plan, &mut issues);

    let mut seen_ids = HashSet::new();
    for task in &plan.tasks {
        if !seen_ids.insert(task.id) {
            issues.push(
                ValidationIssue::error(format!("Duplicate task id {}", task.id))
                    .task(task.id)
                    .suggest("Give every task a unique id"),
            );
        }
        check_task(task, options, &mut issues);
        check_steps(task, &mut issues);
    }

    check_dependencies(plan, &mut issues);

    let has_errors = issues.iter().any(|i| i.severity == IssueSeverity::Error);
    let has_warnings = issues.iter().any(|i| i.severity == IssueSeverity::Warning);

    ValidationResult {
        valid: !has_errors && (!options.strict || !has_warnings),
        issues,
        stats: compute_stats(plan),
    }
}

fn check_plan(plan: &Plan, issues: &mut Vec<ValidationIssue>) {
    if plan.name.trim().is_empty() {
        issues.push(
            ValidationIssue::error("Plan has no name")
                .suggest("Add a level-1 heading such as `# My Plan`"),
        );
    }
    if plan.goal.trim().is_empty() {
        issues.push(
            ValidationIssue::error("Plan has no goal").suggest("Add a `**Goal:** ...` line"),
        );
    }
    if plan.tasks.is_empty() {
        issues.push(
            ValidationIssue::error("Plan has no tasks")
                .suggest("Add a `## Task 1: ...` section"),
        );
    }
    if plan.architecture.as_deref().is_none_or(|a| a.trim().is_empty()) {
        issues.push(ValidationIssue::info("Plan has no architecture description"));
    }
    if plan.tech_stack.is_empty() {
        issues.push(ValidationIssue::info("Plan has no tech stack"));
    }
}

fn check_task(task: &Task, options: &ValidationOptions, issues: &mut Vec<ValidationIssue>) {
    let id = task.id;

    if id == 0 {
        issues.push(ValidationIssue::error("Task ids must be positive").task(id));
    }

    if task.name.trim().is_empty() {
        issues.push(ValidationIssue::error(format!("Task {id} has no name")).task(id));
    }

    let step_count = task.steps.len();
    if step_count == 0 {
        issues.push(
            ValidationIssue::error(format!("Task {id} has no steps"))
                .task(id)
                .suggest("Add numbered steps under the task heading"),
        );
    } else if step_count < options.min_steps_per_task {
        issues.push(
            ValidationIssue::warning(format!(
                "Task {id} has {step_count} steps, fewer than the minimum of {}",
                options.min_steps_per_task
            ))
            .task(id),
        );
    } else if step_count > options.max_steps_per_task {
        issues.push(
            ValidationIssue::warning(format!(
                "Task {id} has {step_count} steps, more than the maximum of {}",
                options.max_steps_per_task
            ))
            .task(id)
            .suggest("Split the task into smaller tasks"),
        );
    }

    if let Some(minutes) = task.estimated_minutes {
        if minutes > options.max_task_minutes {
            issues.push(
                ValidationIssue::warning(format!(
                    "Task {id} is estimated at {minutes} minutes, above the maximum of {}",
                    options.max_task_minutes
                ))
                .task(id)
                .suggest("Break the task into bite-sized pieces"),
            );
        } else if minutes < options.min_task_minutes {
            issues.push(
                ValidationIssue::info(format!(
                    "Task {id} is estimated at {minutes} minutes, below the minimum of {}",
                    options.min_task_minutes
                ))
                .task(id)
                .suggest("Consider merging it with a related task"),
            );
        }
    }

    if options.require_tests && !task.has_tests() {
        issues.push(
            ValidationIssue::warning(format!("Task {id} has no tests"))
                .task(id)
                .suggest("Add a test step or a `Test:` file"),
        );
    }

    if options.require_commits && !task.has_step_type(StepType::Commit) {
        issues.push(
            ValidationIssue::warning(format!("Task {id} has no commit step"))
                .task(id)
                .suggest("End the task with a commit step"),
        );
    }

    if options.require_files && task.files.is_empty() {
        issues.push(
            ValidationIssue::warning(format!("Task {id} references no files"))
                .task(id)
                .suggest("Add a `Files:` block"),
        );
    }
}

fn check_steps(task: &Task, issues: &mut Vec<ValidationIssue>) {
    let id = task.id;
    let mut seen_numbers = HashSet::new();
    let mut reported_sequence = false;

    for (position, step) in task.steps.iter().enumerate() {
        let number = step.number;

        if !seen_numbers.insert(number) {
            issues.push(
                ValidationIssue::warning(format!("Task {id} has duplicate step number {number}"))
                    .task(id)
                    .step(number),
            );
        }

        if step.description.trim().is_empty() {
            issues.push(
                ValidationIssue::error(format!("Step {number} of task {id} has no description"))
                    .task(id)
                    .step(number),
            );
        }

        match step.step_type {
            StepType::Verify if step.expected_output.is_none() && step.command.is_none() => {
                issues.push(
                    ValidationIssue::info(format!(
                        "Verify step {number} of task {id} has no command or expected output"
                    ))
                    .task(id)
                    .step(number)
                    .suggest("Add `Run:` and `Expect:` lines"),
                );
            }
            StepType::Test if step.code.is_none() && step.command.is_none() => {
                issues.push(
                    ValidationIssue::info(format!(
                        "Test step {number} of task {id} has no code or command"
                    ))
                    .task(id)
                    .step(number)
                    .suggest("Attach the test code or a `Run:` line"),
                );
            }
            _ => {}
        }

        if !reported_sequence && number != position as u32 + 1 {
            reported_sequence = true;
            issues.push(
                ValidationIssue::info(format!("Task {id} has non-sequential step numbers"))
                    .task(id)
                    .step(number)
                    .suggest("Number steps 1, 2, 3, ..."),
            );
        }
    }
}

fn check_dependencies(plan: &Plan, issues: &mut Vec<ValidationIssue>) {
    let ids: HashSet<u32> = plan.tasks.iter().map(|task| task.id).collect();

    for task in &plan.tasks {
        for &dep in &task.dependencies {
            if dep == task.id {
                issues.push(
                    ValidationIssue::error(format!("Task {} depends on itself", task.id))
                        .task(task.id),
                );
            } else if !ids.contains(&dep) {
                issues.push(
                    ValidationIssue::error(format!(
                        "Task {} depends on non-existent task {dep}",
                        task.id
                    ))
                    .task(task.id),
                );
            }
        }
    }

    for cycle in graph::find_cycles(&plan.tasks) {
        let path = graph::format_cycle(&cycle);
        let mut issue = ValidationIssue::error(format!("Circular dependency: {path}"))
            .suggest("Remove one of the dependencies in the cycle");
        issue.task_id = cycle.first().copied();
        issues.push(issue);
    }
}

fn compute_stats(plan: &Plan) -> ValidationStats {
    let total_tasks = plan.tasks.len();
    let total_steps: usize = plan.tasks.iter().map(|task| task.steps.len()).sum();
    let avg_steps_per_task = if total_tasks == 0 {
        0.0
    } else {
        (total_steps as f64 / total_tasks as f64 * 10.0).round() / 10.0
    };

    ValidationStats {
        total_tasks,
        total_steps,
        estimated_minutes: plan
            .tasks
            .iter()
            .map(|task| task.estimated_minutes.unwrap_or(DEFAULT_TASK_MINUTES))
            .fold(0, u32::saturating_add),
        tasks_with_tests: plan.tasks.iter().filter(|task| task.has_tests()).count(),
        tasks_with_commits: plan
            .tasks
            .iter()
            .filter(|task| task.has_step_type(StepType::Commit))
            .count(),
        avg_steps_per_task,
    }
}
