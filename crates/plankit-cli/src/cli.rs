//! Command handlers for the `pk` binary.
//!
//! Each handler reads its input files, calls into `plankit_core`, and hands
//! the resulting markdown to the [`TerminalRenderer`]. Plan documents
//! themselves (`new`, `fmt`, `merge`) are printed verbatim so they can be
//! redirected into files.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use log::{info, warn};
use plankit_core::{
    ExecutionEvent, Executor, PlanGenerator, PlanKitConfig, TemplateCatalog, TemplateTask,
    generator::templates::list_templates, read_plan, to_markdown, validate, write_plan,
};
use serde::Serialize;

use crate::{
    args::{FmtArgs, MergeArgs, NewArgs, ParseArgs, RunArgs, ValidateArgs},
    renderer::TerminalRenderer,
    runner::ShellStepRunner,
};

pub struct Cli {
    config: PlanKitConfig,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(config: PlanKitConfig, renderer: TerminalRenderer) -> Self {
        Self { config, renderer }
    }

    fn generator(&self) -> PlanGenerator {
        PlanGenerator::new(self.config.generator)
    }

    pub fn parse_plan(&self, args: &ParseArgs) -> Result<()> {
        let plan = read_plan(&args.file)?;
        if args.json {
            return print_json(&plan);
        }
        self.renderer.render(&plan.to_string());
        Ok(())
    }

    pub fn validate_plan(&self, args: &ValidateArgs) -> Result<()> {
        let plan = read_plan(&args.file)?;
        let options = args.apply(self.config.validation.clone());
        let report = validate(&plan, &options);

        if args.json {
            print_json(&report)?;
        } else {
            self.renderer.render(&report.to_string());
        }

        if !report.valid {
            bail!("Plan '{}' is invalid", args.file.display());
        }
        Ok(())
    }

    pub async fn run_plan(&self, args: &RunArgs) -> Result<()> {
        let mut plan = read_plan(&args.file)?;

        let report = validate(&plan, &self.config.validation);
        if !report.valid {
            if !args.force {
                self.renderer.render(&report.to_string());
                bail!(
                    "Plan '{}' is invalid; fix the errors or pass --force",
                    args.file.display()
                );
            }
            warn!("running invalid plan '{}' because of --force", plan.name);
        }

        let working_directory = args
            .working_dir
            .clone()
            .or_else(|| self.config.execution.working_directory.clone());
        let mut executor = Executor::new(Arc::new(ShellStepRunner::new(working_directory)));
        if !args.json {
            executor.add_listener(print_progress);
        }

        let control = executor.control();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling after the current step");
                control.cancel();
            }
        });

        let options = args.apply(self.config.execution.execute_options());
        let result = executor.execute(&mut plan, options).await;
        interrupt.abort();

        if args.json {
            print_json(&result)?;
        } else {
            self.renderer.render(&result.to_string());
        }

        if !result.success {
            bail!("Plan '{}' did not complete", plan.name);
        }
        Ok(())
    }

    pub fn new_plan(&self, args: &NewArgs) -> Result<()> {
        let generator = self.generator();
        let mut plan = generator.create_plan(&args.into());

        for spec in &args.tasks {
            generator
                .add_task_from_template(&mut plan, &spec.template, &TemplateTask::new(&spec.name))
                .ok_or_else(|| {
                    anyhow!(
                        "Unknown template '{}'; run `pk templates` to list them",
                        spec.template
                    )
                })?;
        }

        match &args.output {
            Some(path) => {
                write_plan(path, &plan)?;
                info!("created plan '{}' at {}", plan.name, path.display());
                self.renderer.render(&format!(
                    "Created plan **{}** with {} tasks at `{}`",
                    plan.name,
                    plan.tasks.len(),
                    path.display()
                ));
            }
            None => print!("{}", to_markdown(&plan)),
        }
        Ok(())
    }

    pub fn format_plan(&self, args: &FmtArgs) -> Result<()> {
        let plan = read_plan(&args.file)?;
        if args.write {
            write_plan(&args.file, &plan)?;
            self.renderer
                .render(&format!("Formatted `{}`", args.file.display()));
        } else {
            print!("{}", to_markdown(&plan));
        }
        Ok(())
    }

    pub fn merge_plans(&self, args: &MergeArgs) -> Result<()> {
        let first = read_plan(&args.first)?;
        let second = read_plan(&args.second)?;
        let merged = self.generator().merge_plans(&first, &second);

        match &args.output {
            Some(path) => {
                write_plan(path, &merged)?;
                self.renderer.render(&format!(
                    "Merged {} tasks into `{}`",
                    merged.tasks.len(),
                    path.display()
                ));
            }
            None => print!("{}", to_markdown(&merged)),
        }
        Ok(())
    }

    pub fn list_templates(&self) {
        self.renderer
            .render(&TemplateCatalog(list_templates()).to_string());
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Reports task progress on stderr while a plan runs.
fn print_progress(event: &ExecutionEvent) {
    match event {
        ExecutionEvent::TaskStarted { task_id, task_name } => {
            eprintln!("▶ Task {task_id}: {task_name}");
        }
        ExecutionEvent::TaskCompleted {
            task_id, result, ..
        } if result.success => eprintln!("✓ Task {task_id} completed"),
        ExecutionEvent::TaskFailed { task_id, error } => {
            eprintln!("✗ Task {task_id} failed: {error}");
        }
        ExecutionEvent::TaskSkipped { task_id, reason } => {
            eprintln!("⊘ Task {task_id} skipped: {reason}");
        }
        _ => {}
    }
}
