//! Display implementations for domain models.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::{
    generator::templates::TaskTemplate,
    models::{FileRefs, Plan, PlanStatus, Step, StepType, Task, TaskStatus},
};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.name)?;
        writeln!(f)?;

        if !self.goal.is_empty() {
            writeln!(f, "- Goal: {}", self.goal)?;
        }
        writeln!(f, "- Status: {}", self.status)?;
        if let Some(version) = &self.version {
            writeln!(f, "- Version: {version}")?;
        }
        if let Some(author) = &self.author {
            writeln!(f, "- Author: {author}")?;
        }
        if let Some(design_doc) = &self.design_doc {
            writeln!(f, "- Design doc: {design_doc}")?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(architecture) = &self.architecture {
            writeln!(f, "\n## Architecture\n")?;
            writeln!(f, "{architecture}")?;
        }

        if !self.tech_stack.is_empty() {
            writeln!(f, "\n## Tech Stack\n")?;
            for item in &self.tech_stack {
                writeln!(f, "- {item}")?;
            }
        }

        if self.tasks.is_empty() {
            return writeln!(f, "\nNo tasks in this plan.");
        }

        writeln!(f, "\n## Tasks\n")?;
        write!(f, "{}", TaskOverview(self))?;
        for task in &self.tasks {
            writeln!(f)?;
            write!(f, "{task}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### Task {}: {} ({})",
            self.id,
            self.name,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        if let Some(description) = &self.description {
            writeln!(f, "{description}")?;
            writeln!(f)?;
        }

        let mut details = Vec::new();
        if let Some(minutes) = self.estimated_minutes {
            details.push(format!("Estimated: {minutes} min"));
        }
        if !self.dependencies.is_empty() {
            details.push(format!("Depends on: {}", join(&self.dependencies)));
        }
        if let Some(priority) = self.priority {
            details.push(format!("Priority: {priority}"));
        }
        if !self.tags.is_empty() {
            details.push(format!("Tags: {}", self.tags.join(", ")));
        }
        if !self.files.is_empty() {
            details.push(format!("Files: {}", FileList(&self.files)));
        }
        if !details.is_empty() {
            for detail in details {
                writeln!(f, "- {detail}")?;
            }
            writeln!(f)?;
        }

        for step in &self.steps {
            write!(f, "{step}")?;
        }

        if let Some(result) = &self.result {
            writeln!(f)?;
            writeln!(f, "#### Result")?;
            writeln!(f)?;
            if let Some(error) = &result.error {
                writeln!(f, "**Error:** {error}")?;
                writeln!(f)?;
            }
            if !result.output.is_empty() {
                writeln!(f, "```text\n{}\n```", result.output)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. *{}* {}", self.number, self.step_type, self.description)?;
        if self.critical {
            write!(f, " **(critical)**")?;
        }
        writeln!(f)?;
        if let Some(command) = &self.command {
            writeln!(f, "   - Run: `{command}`")?;
        }
        if let Some(expected) = &self.expected_output {
            writeln!(f, "   - Expect: {expected}")?;
        }
        Ok(())
    }
}

/// Compact markdown table of a plan's tasks.
pub struct TaskOverview<'a>(pub &'a Plan);

impl fmt::Display for TaskOverview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| # | Task | Status | Steps | Depends on |")?;
        writeln!(f, "|---|------|--------|-------|------------|")?;
        for task in &self.0.tasks {
            let dependencies = if task.dependencies.is_empty() {
                "-".to_string()
            } else {
                join(&task.dependencies)
            };
            writeln!(
                f,
                "| {} | {} | {} | {} | {} |",
                task.id,
                task.name.replace('|', "\\|"),
                task.status.with_icon(),
                task.steps.len(),
                dependencies
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for TaskTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}\n", self.name)?;
        writeln!(f, "{} (about {} minutes)\n", self.summary, self.estimated_minutes)?;
        for (index, step) in self.steps.iter().enumerate() {
            write!(f, "{}. *{}* {}", index + 1, step.step_type, step.description)?;
            if step.critical {
                f.write_str(" (critical)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Markdown listing of task templates, one section each.
pub struct TemplateCatalog<'a>(pub &'a [TaskTemplate]);

impl fmt::Display for TemplateCatalog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No templates available.");
        }
        writeln!(f, "# Task Templates")?;
        for template in self.0 {
            writeln!(f)?;
            write!(f, "{template}")?;
        }
        Ok(())
    }
}

struct FileList<'a>(&'a FileRefs);

impl fmt::Display for FileList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups = [
            ("create", &self.0.create),
            ("modify", &self.0.modify),
            ("test", &self.0.test),
            ("delete", &self.0.delete),
        ];
        let rendered: Vec<String> = groups
            .iter()
            .filter(|(_, paths)| !paths.is_empty())
            .map(|(label, paths)| format!("{label} `{}`", paths.join("`, `")))
            .collect();
        f.write_str(&rendered.join("; "))
    }
}

fn join(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Plan {
        let mut plan = Plan::new("Demo", "Show things");
        let mut task = Task::new(1, "Build | ship");
        task.steps.push(Step::inferred(1, "Write the test"));
        task.files.create.push("src/a.rs".to_string());
        task.dependencies = vec![];
        plan.tasks.push(task);
        let mut second = Task::new(2, "Wire");
        second.dependencies = vec![1];
        second.status = TaskStatus::Completed;
        plan.tasks.push(second);
        plan
    }

    #[test]
    fn test_overview_table() {
        let text = TaskOverview(&sample()).to_string();
        assert!(text.contains("| 1 | Build \\| ship | ○ Pending | 1 | - |"));
        assert!(text.contains("| 2 | Wire | ✓ Completed | 0 | 1 |"));
    }

    #[test]
    fn test_plan_display_sections() {
        let text = sample().to_string();
        assert!(text.starts_with("# Demo\n\n- Goal: Show things\n- Status: draft\n"));
        assert!(text.contains("## Tasks"));
        assert!(text.contains("### Task 1: Build | ship (○ Pending)"));
        assert!(text.contains("- Files: create `src/a.rs`"));
        assert!(text.contains("1. *test* Write the test"));
    }

    #[test]
    fn test_empty_plan_display() {
        let text = Plan::new("Empty", "").to_string();
        assert!(text.contains("No tasks in this plan."));
        assert!(!text.contains("Goal"));
    }

    #[test]
    fn test_template_catalog() {
        let text = TemplateCatalog(crate::generator::templates::list_templates()).to_string();
        assert!(text.starts_with("# Task Templates\n"));
        assert!(text.contains("### fix-bug\n"));
        assert!(text.contains("*implement* Fix {name} (critical)"));
        assert_eq!(TemplateCatalog(&[]).to_string(), "No templates available.\n");
    }
}
