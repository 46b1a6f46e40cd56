//! Markdown serialization of plans.
//!
//! The output uses the same dialect the parser reads, so
//! `parse(&to_markdown(&plan))` gives back the plan's structure. Execution
//! state (statuses, results, timestamps) is not written.

use crate::{
    models::{FileRefs, Plan, Step, StepType, Task},
    parser::lexer::strip_closing_sequence,
};

/// Renders a plan as markdown.
pub fn to_markdown(plan: &Plan) -> String {
    let mut out = Lines::default();

    out.push(format!("# {}", heading_text(&plan.name)));
    out.blank();

    let metadata = [
        ("Goal", Some(plan.goal.as_str()).filter(|goal| !goal.trim().is_empty())),
        ("Version", plan.version.as_deref()),
        ("Author", plan.author.as_deref()),
        ("Design Doc", plan.design_doc.as_deref()),
    ];
    let mut wrote_metadata = false;
    for (key, value) in metadata {
        if let Some(value) = value {
            out.push(format!("**{key}:** {}", one_line(value)));
            wrote_metadata = true;
        }
    }
    if wrote_metadata {
        out.blank();
    }

    if let Some(architecture) = plan.architecture.as_deref() {
        out.push("## Architecture");
        out.blank();
        out.push(architecture.trim());
        out.blank();
    }

    if !plan.tech_stack.is_empty() {
        out.push("## Tech Stack");
        out.blank();
        for item in &plan.tech_stack {
            out.push(format!("- {}", one_line(item)));
        }
        out.blank();
    }

    for task in &plan.tasks {
        write_task(&mut out, task);
    }

    out.finish()
}

fn write_task(out: &mut Lines, task: &Task) {
    out.push(format!("## Task {}: {}", task.id, heading_text(&task.name)).trim_end());
    out.blank();

    if let Some(description) = task.description.as_deref()
        && !description.trim().is_empty()
    {
        out.push(description.trim());
        out.blank();
    }

    if !task.files.is_empty() {
        write_files(out, &task.files);
        out.blank();
    }

    let mut wrote_metadata = false;
    if let Some(minutes) = task.estimated_minutes {
        out.push(format!("**Estimated:** {minutes} minutes"));
        wrote_metadata = true;
    }
    if !task.dependencies.is_empty() {
        out.push(format!("**Depends on:** {}", join_ids(&task.dependencies)));
        wrote_metadata = true;
    }
    if let Some(priority) = task.priority {
        out.push(format!("**Priority:** {priority}"));
        wrote_metadata = true;
    }
    if !task.tags.is_empty() {
        out.push(format!("**Tags:** {}", task.tags.join(", ")));
        wrote_metadata = true;
    }
    if wrote_metadata {
        out.blank();
    }

    if !task.steps.is_empty() {
        for step in &task.steps {
            write_step(out, step);
        }
        out.blank();
    }
}

fn write_files(out: &mut Lines, files: &FileRefs) {
    out.push("**Files:**");
    let buckets = [
        ("Create", &files.create),
        ("Modify", &files.modify),
        ("Test", &files.test),
        ("Delete", &files.delete),
    ];
    for (label, paths) in buckets {
        if paths.is_empty() {
            continue;
        }
        let quoted: Vec<String> = paths.iter().map(|path| format!("`{path}`")).collect();
        out.push(format!("- {label}: {}", quoted.join(", ")));
    }
}

fn write_step(out: &mut Lines, step: &Step) {
    let description = one_line(&step.description);
    let line = if needs_type_tag(step) {
        format!("{}. [{}] {description}", step.number, step.step_type.as_str())
    } else {
        format!("{}. {description}", step.number)
    };
    out.push(line.trim_end());

    if let Some(code) = step.code.as_deref() {
        let fence = if code.contains("```") { "~~~" } else { "```" };
        out.push(format!("   {fence}{}", step.language.as_deref().unwrap_or("")));
        for line in code.split('\n') {
            out.push(format!("   {line}"));
        }
        out.push(format!("   {fence}"));
    }
    if let Some(command) = step.command.as_deref() {
        out.push(format!("   - Run: `{}`", one_line(command)));
    }
    if let Some(expected) = step.expected_output.as_deref() {
        out.push(format!("   - Expect: {}", one_line(expected)));
    }
    if step.critical {
        out.push("   - Critical");
    }
}

/// An explicit `[type]` tag is written when inference would not reproduce the
/// type, or when the description itself starts with a bracket.
fn needs_type_tag(step: &Step) -> bool {
    StepType::infer(&step.description) != step.step_type || step.description.starts_with('[')
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Heading text the parser reads back unchanged. A name whose trailing `#`
/// run would be taken for a closing sequence gets an explicit one.
fn heading_text(value: &str) -> String {
    let text = one_line(value);
    if strip_closing_sequence(&text) == text {
        text
    } else {
        format!("{text} #")
    }
}

fn one_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ").trim().to_string()
}

/// Output buffer that never emits two blank lines in a row.
#[derive(Default)]
struct Lines {
    lines: Vec<String>,
}

impl Lines {
    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|last| !last.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn finish(mut self) -> String {
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
