//! Display implementations for validation and execution reports.

use std::fmt;

use super::datetime::Elapsed;
use crate::{
    executor::ExecutionResult,
    validator::{IssueSeverity, ValidationIssue, ValidationResult},
};

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.task_id, self.step_number) {
            (Some(task), Some(step)) => write!(f, "[task {task}, step {step}] ")?,
            (Some(task), None) => write!(f, "[task {task}] ")?,
            _ => {}
        }
        write!(f, "{}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " *({suggestion})*")?;
        }
        Ok(())
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            writeln!(f, "# ✓ Plan is valid")?;
        } else {
            writeln!(f, "# ✗ Plan is invalid")?;
        }

        let groups = [
            ("Errors", IssueSeverity::Error),
            ("Warnings", IssueSeverity::Warning),
            ("Info", IssueSeverity::Info),
        ];
        for (title, severity) in groups {
            let issues: Vec<_> = self
                .issues
                .iter()
                .filter(|issue| issue.severity == severity)
                .collect();
            if issues.is_empty() {
                continue;
            }
            writeln!(f, "\n## {title} ({})\n", issues.len())?;
            for issue in issues {
                writeln!(f, "- {issue}")?;
            }
        }

        let stats = &self.stats;
        writeln!(f, "\n## Statistics\n")?;
        writeln!(f, "- Tasks: {}", stats.total_tasks)?;
        writeln!(
            f,
            "- Steps: {} (avg {:.1} per task)",
            stats.total_steps, stats.avg_steps_per_task
        )?;
        writeln!(f, "- Estimated time: {} min", stats.estimated_minutes)?;
        writeln!(f, "- Tasks with tests: {}", stats.tasks_with_tests)?;
        writeln!(f, "- Tasks with commits: {}", stats.tasks_with_commits)
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            writeln!(f, "# ✓ Execution succeeded")?;
        } else {
            writeln!(f, "# ✗ Execution failed")?;
        }
        writeln!(f)?;
        writeln!(f, "- Completed: {}", ids(&self.completed_tasks))?;
        writeln!(f, "- Failed: {}", ids(&self.failed_tasks))?;
        writeln!(f, "- Skipped: {}", ids(&self.skipped_tasks))?;
        writeln!(f, "- Duration: {}", Elapsed(self.duration_ms))?;

        let failures: Vec<_> = self
            .task_results
            .iter()
            .filter_map(|(id, result)| result.error.as_ref().map(|error| (id, error)))
            .collect();
        if !failures.is_empty() {
            writeln!(f, "\n## Task errors\n")?;
            for (id, error) in failures {
                writeln!(f, "- Task {id}: {error}")?;
            }
        }

        if !self.errors.is_empty() {
            writeln!(f, "\n## Run errors\n")?;
            for error in &self.errors {
                writeln!(f, "- {error}")?;
            }
        }
        Ok(())
    }
}

fn ids(ids: &[u32]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use jiff::Timestamp;

    use super::*;
    use crate::{
        models::{Plan, TaskResult},
        validator::{ValidationOptions, validate},
    };

    #[test]
    fn test_validation_report_groups_issues() {
        let plan = Plan::new("", "");
        let text = validate(&plan, &ValidationOptions::default()).to_string();
        assert!(text.starts_with("# ✗ Plan is invalid"));
        assert!(text.contains("## Errors (3)"));
        assert!(text.contains("## Info (2)"));
        assert!(!text.contains("## Warnings"));
        assert!(text.contains("- Tasks: 0"));
    }

    #[test]
    fn test_issue_prefix() {
        let issue = ValidationIssue {
            severity: IssueSeverity::Warning,
            message: "Too long".to_string(),
            task_id: Some(3),
            step_number: Some(2),
            suggestion: Some("Split it".to_string()),
        };
        assert_eq!(issue.to_string(), "[task 3, step 2] Too long *(Split it)*");
    }

    #[test]
    fn test_execution_report() {
        let mut task_results = BTreeMap::new();
        task_results.insert(
            2,
            TaskResult {
                success: false,
                output: String::new(),
                error: Some("Step 1 failed: boom".to_string()),
                completed_at: Timestamp::now(),
            },
        );
        let result = ExecutionResult {
            success: false,
            task_results,
            completed_tasks: vec![1],
            failed_tasks: vec![2],
            skipped_tasks: vec![],
            duration_ms: 1_500,
            errors: vec!["Execution cancelled".to_string()],
        };

        let text = result.to_string();
        assert!(text.contains("- Completed: 1\n- Failed: 2\n- Skipped: none"));
        assert!(text.contains("- Duration: 1.5 s"));
        assert!(text.contains("- Task 2: Step 1 failed: boom"));
        assert!(text.contains("- Execution cancelled"));
    }
}
