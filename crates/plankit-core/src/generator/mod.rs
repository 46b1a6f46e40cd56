//! Programmatic construction and transformation of plans.
//!
//! [`PlanGenerator`] creates plans, appends tasks (optionally enforcing test
//! and commit steps), instantiates [`templates`], and clones or merges whole
//! plans. [`to_markdown`] turns a plan back into text the parser accepts.

mod markdown;
pub mod templates;


use std::collections::HashSet;

use jiff::Timestamp;
use log::debug;
use serde::{Deserialize, Serialize};

pub use self::markdown::to_markdown;
use crate::{
    models::{Plan, PlanStatus, StepType, Task, TaskStatus},
    params::{CreatePlan, NewStep, NewTask, TemplateTask},
};

/// Policy applied by [`PlanGenerator::add_task`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Prepend a test step to tasks that have none
    pub require_tests: bool,
    /// Append a commit step to tasks that have none
    pub require_commits: bool,
}

/// Builds and transforms plans.
#[derive(Debug, Clone, Default)]
pub struct PlanGenerator {
    config: GeneratorConfig,
}

impl PlanGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Creates a draft plan with no tasks.
    pub fn create_plan(&self, params: &CreatePlan) -> Plan {
        let mut plan = Plan::new(params.name.trim(), params.goal.trim());
        plan.architecture = params
            .architecture
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        plan.tech_stack = params
            .tech_stack
            .iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        plan.version = params.version.clone();
        plan.author = params.author.clone();
        plan.design_doc = params.design_doc.clone();
        plan
    }

    /// Appends a task with the next free id and returns it.
    ///
    /// Steps are numbered from 1 in the order given. When the generator is
    /// configured to require tests or commits and the task lacks them, a test
    /// step is prepended and a commit step appended before renumbering.
    pub fn add_task<'a>(&self, plan: &'a mut Plan, params: NewTask) -> &'a Task {
        let id = plan.max_task_id().saturating_add(1);
        let mut task = Task::new(id, params.name.trim());
        task.description = params
            .description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        task.files = params.files;
        task.estimated_minutes = params.estimated_minutes;
        task.dependencies = params.dependencies;
        task.tags = params.tags;
        task.priority = params.priority;
        task.steps = params
            .steps
            .into_iter()
            .zip(1..)
            .map(|(step, number)| step.into_step(number))
            .collect();

        if self.config.require_tests && !task.has_step_type(StepType::Test) {
            let step = NewStep::new(format!("Write a failing test for {}", task.name))
                .with_type(StepType::Test)
                .into_step(0);
            task.steps.insert(0, step);
        }
        if self.config.require_commits && !task.has_step_type(StepType::Commit) {
            let step = NewStep::new(format!("Commit {}", task.name))
                .with_type(StepType::Commit)
                .into_step(0);
            task.steps.push(step);
        }
        task.renumber_steps();

        debug!("added task {id} '{}' with {} steps", task.name, task.steps.len());
        plan.tasks.push(task);
        plan.touch();
        &plan.tasks[plan.tasks.len() - 1]
    }

    /// Appends a task built from a named template.
    ///
    /// Returns `None`, leaving the plan untouched, when no template has that
    /// name.
    pub fn add_task_from_template<'a>(
        &self,
        plan: &'a mut Plan,
        template: &str,
        params: &TemplateTask,
    ) -> Option<&'a Task> {
        let template = templates::find_template(template)?;
        let task = NewTask {
            name: params.name.clone(),
            description: Some(template.summary.to_string()),
            files: params.files.clone(),
            steps: template.steps_for(params.name.trim()),
            estimated_minutes: Some(template.estimated_minutes),
            dependencies: params.dependencies.clone(),
            tags: vec![template.name.to_string()],
            priority: None,
        };
        Some(self.add_task(plan, task))
    }

    /// Renders the plan as markdown; see [`to_markdown`].
    pub fn to_markdown(&self, plan: &Plan) -> String {
        to_markdown(plan)
    }

    /// Deep copy of `plan` with all execution state reset.
    pub fn clone_plan(&self, plan: &Plan) -> Plan {
        let mut copy = plan.clone();
        reset(&mut copy);
        copy
    }

    /// Combines two plans into a new draft plan.
    ///
    /// Tasks of `second` are renumbered after the highest id of `first`, and
    /// dependencies between them follow. Dependencies that pointed outside of
    /// `second` are kept verbatim.
    pub fn merge_plans(&self, first: &Plan, second: &Plan) -> Plan {
        let offset = first.max_task_id();
        let mut merged = self.clone_plan(first);

        merged.goal = join_non_empty([first.goal.as_str(), second.goal.as_str()], "; ");
        let architecture = join_non_empty(
            [
                first.architecture.as_deref().unwrap_or(""),
                second.architecture.as_deref().unwrap_or(""),
            ],
            "\n\n",
        );
        merged.architecture = Some(architecture).filter(|text| !text.is_empty());

        let mut seen = HashSet::new();
        merged.tech_stack = first
            .tech_stack
            .iter()
            .chain(&second.tech_stack)
            .filter(|item| seen.insert(item.as_str()))
            .cloned()
            .collect();

        merged.version = first.version.clone().or_else(|| second.version.clone());
        merged.author = first.author.clone().or_else(|| second.author.clone());
        merged.design_doc = first
            .design_doc
            .clone()
            .or_else(|| second.design_doc.clone());

        let internal: HashSet<u32> = second.tasks.iter().map(|task| task.id).collect();
        for task in &second.tasks {
            let mut task = task.clone();
            task.id = task.id.saturating_add(offset);
            for dependency in &mut task.dependencies {
                if internal.contains(dependency) {
                    *dependency = dependency.saturating_add(offset);
                }
            }
            task.status = TaskStatus::Pending;
            task.result = None;
            merged.tasks.push(task);
        }

        debug!(
            "merged '{}' and '{}' into {} tasks (offset {offset})",
            first.name,
            second.name,
            merged.tasks.len()
        );
        merged
    }
}

fn reset(plan: &mut Plan) {
    plan.status = PlanStatus::Draft;
    for task in &mut plan.tasks {
        task.status = TaskStatus::Pending;
        task.result = None;
    }
    let now = Timestamp::now();
    plan.created_at = now;
    plan.updated_at = now;
}

fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
