//! Step runner that executes step commands in a shell.

use std::path::PathBuf;

use async_trait::async_trait;
use log::debug;
use plankit_core::{Step, StepOutcome, StepRunner, Task};
use tokio::process::Command;

/// Runs `step.command` with `sh -c`.
///
/// A step succeeds when the command exits with status 0 and, if the step
/// has an expected output, stdout or stderr contains it. Steps without a
/// command are manual and always succeed.
#[derive(Debug, Clone, Default)]
pub struct ShellStepRunner {
    working_directory: Option<PathBuf>,
}

impl ShellStepRunner {
    pub fn new(working_directory: Option<PathBuf>) -> Self {
        Self { working_directory }
    }
}

#[async_trait]
impl StepRunner for ShellStepRunner {
    async fn run(&self, step: &Step, task: &Task) -> anyhow::Result<StepOutcome> {
        let Some(command) = step.command.as_deref() else {
            return Ok(StepOutcome::success(format!(
                "manual step: {}",
                step.description
            )));
        };

        debug!("task {} step {}: running `{command}`", task.id, step.number);
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).kill_on_drop(true);
        if let Some(dir) = &self.working_directory {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = match (stdout.trim_end(), stderr.trim_end()) {
            (out, "") => out.to_string(),
            ("", err) => err.to_string(),
            (out, err) => format!("{out}\n{err}"),
        };

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "a signal".to_string(), |code| format!("code {code}"));
            return Ok(
                StepOutcome::failure(format!("`{command}` exited with {code}"))
                    .with_output(combined),
            );
        }

        if let Some(expected) = &step.expected_output
            && !combined.contains(expected.as_str())
        {
            return Ok(StepOutcome::failure(format!(
                "expected output containing '{expected}'"
            ))
            .with_output(combined));
        }

        Ok(StepOutcome::success(combined))
    }
}
