//! Command-line interface definitions using clap
//!
//! Clap structures stay in this crate; each converts into the core's
//! parameter or option types, so the core never sees clap:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params / Options → Core Logic
//! ```
//!
//! Flags layer over the loaded configuration: an argument only overrides a
//! setting when it is given.

use std::{path::PathBuf, str::FromStr};

use clap::{Args as ClapArgs, Parser, Subcommand};
use plankit_core::{CreatePlan, ExecuteOptions, StepPolicy, ValidationOptions};

/// Author, validate and run markdown implementation plans
///
/// A plan is a markdown document made of small tasks with numbered steps and
/// dependencies between tasks. `pk` parses and checks plans, generates them
/// from templates, runs their step commands in dependency order, and serves
/// the same operations over MCP (Model Context Protocol) for AI assistants.
#[derive(Parser)]
#[command(version, about, name = "pk")]
pub struct Args {
    /// Path to a JSON configuration file. Defaults to
    /// $XDG_CONFIG_HOME/plankit/config.json when it exists
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a plan and show its structure
    #[command(alias = "p")]
    Parse(ParseArgs),
    /// Check a plan against the validation rules
    #[command(alias = "v")]
    Validate(ValidateArgs),
    /// Execute a plan's steps in dependency order
    #[command(alias = "r")]
    Run(RunArgs),
    /// Create a new plan, optionally with tasks from templates
    #[command(alias = "n")]
    New(NewArgs),
    /// Rewrite a plan in canonical markdown
    Fmt(FmtArgs),
    /// Merge two plans into one
    Merge(MergeArgs),
    /// List the built-in task templates
    #[command(alias = "t")]
    Templates,
    /// Start the MCP server
    Serve,
}

/// Parse a plan file
#[derive(ClapArgs)]
pub struct ParseArgs {
    /// Plan file to read
    pub file: PathBuf,
    /// Print the parsed plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate a plan file
///
/// Every flag overrides the matching `validation` setting from the
/// configuration file.
#[derive(ClapArgs)]
pub struct ValidateArgs {
    /// Plan file to check
    pub file: PathBuf,
    #[arg(long, help = "Largest acceptable task estimate, in minutes")]
    pub max_task_minutes: Option<u32>,
    #[arg(long, help = "Smallest sensible task estimate, in minutes")]
    pub min_task_minutes: Option<u32>,
    #[arg(long, help = "Largest acceptable number of steps per task")]
    pub max_steps: Option<usize>,
    #[arg(long, help = "Smallest acceptable number of steps per task")]
    pub min_steps: Option<usize>,
    /// Warn about tasks without a test step or test file
    #[arg(long)]
    pub require_tests: bool,
    /// Warn about tasks without a commit step
    #[arg(long)]
    pub require_commits: bool,
    /// Warn about tasks that reference no files
    #[arg(long)]
    pub require_files: bool,
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ValidateArgs {
    /// Applies the given flags on top of `options`.
    pub fn apply(&self, mut options: ValidationOptions) -> ValidationOptions {
        if let Some(minutes) = self.max_task_minutes {
            options.max_task_minutes = minutes;
        }
        if let Some(minutes) = self.min_task_minutes {
            options.min_task_minutes = minutes;
        }
        if let Some(steps) = self.max_steps {
            options.max_steps_per_task = steps;
        }
        if let Some(steps) = self.min_steps {
            options.min_steps_per_task = steps;
        }
        options.require_tests |= self.require_tests;
        options.require_commits |= self.require_commits;
        options.require_files |= self.require_files;
        options.strict |= self.strict;
        options
    }
}

/// Run a plan file
#[derive(ClapArgs)]
pub struct RunArgs {
    /// Plan file to execute
    pub file: PathBuf,
    /// Report what would run without executing any command
    #[arg(long)]
    pub dry_run: bool,
    /// Keep running independent tasks after a task fails
    #[arg(long)]
    pub continue_on_error: bool,
    /// Only critical step failures fail a task
    #[arg(long)]
    pub lenient_steps: bool,
    /// Run even if the plan fails validation
    #[arg(long)]
    pub force: bool,
    /// Directory to run step commands in
    #[arg(short = 'C', long)]
    pub working_dir: Option<PathBuf>,
    /// Print the execution result as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Applies the given flags on top of `options`.
    pub fn apply(&self, mut options: ExecuteOptions) -> ExecuteOptions {
        options.dry_run = self.dry_run;
        if self.continue_on_error {
            options.stop_on_error = false;
        }
        if self.lenient_steps {
            options.step_policy = StepPolicy::Lenient;
        }
        options
    }
}

/// Create a new plan
#[derive(ClapArgs)]
pub struct NewArgs {
    /// Name of the plan
    pub name: String,
    /// What the plan should achieve
    #[arg(short, long)]
    pub goal: String,
    #[arg(long, help = "Architecture notes for the plan")]
    pub architecture: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Technologies involved, as a comma-separated list"
    )]
    pub tech: Vec<String>,
    #[arg(long = "plan-version", help = "Version of the plan document")]
    pub version: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long, help = "Path or link to the design document")]
    pub design_doc: Option<String>,
    /// Task to add from a template, as TEMPLATE:NAME (repeatable)
    #[arg(short, long = "task", value_name = "TEMPLATE:NAME")]
    pub tasks: Vec<TemplateSpec>,
    /// Write the plan to this file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl From<&NewArgs> for CreatePlan {
    fn from(val: &NewArgs) -> Self {
        CreatePlan {
            name: val.name.clone(),
            goal: val.goal.clone(),
            architecture: val.architecture.clone(),
            tech_stack: val.tech.clone(),
            version: val.version.clone(),
            author: val.author.clone(),
            design_doc: val.design_doc.clone(),
        }
    }
}

/// A `template:name` pair given to `pk new --task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    pub template: String,
    pub name: String,
}

impl FromStr for TemplateSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (template, name) = s
            .split_once(':')
            .ok_or_else(|| format!("expected TEMPLATE:NAME, got '{s}'"))?;
        let (template, name) = (template.trim(), name.trim());
        if template.is_empty() || name.is_empty() {
            return Err(format!("expected TEMPLATE:NAME, got '{s}'"));
        }
        Ok(Self {
            template: template.to_string(),
            name: name.to_string(),
        })
    }
}

/// Format a plan file
#[derive(ClapArgs)]
pub struct FmtArgs {
    /// Plan file to format
    pub file: PathBuf,
    /// Rewrite the file in place instead of printing
    #[arg(short, long)]
    pub write: bool,
}

/// Merge two plan files
#[derive(ClapArgs)]
pub struct MergeArgs {
    /// Plan whose tasks come first
    pub first: PathBuf,
    /// Plan whose tasks are appended with shifted ids
    pub second: PathBuf,
    /// Write the merged plan to this file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_template_spec_parse() {
        assert_eq!(
            "fix-bug: login crash".parse::<TemplateSpec>(),
            Ok(TemplateSpec {
                template: "fix-bug".to_string(),
                name: "login crash".to_string(),
            })
        );
        assert!("fix-bug".parse::<TemplateSpec>().is_err());
        assert!("fix-bug:".parse::<TemplateSpec>().is_err());
    }

    #[test]
    fn test_validate_flags_override_config() {
        let args = Args::parse_from(["pk", "validate", "plan.md", "--strict", "--max-steps", "4"]);
        let Commands::Validate(validate) = args.command else {
            panic!("expected validate command");
        };
        let config = ValidationOptions {
            require_tests: true,
            ..Default::default()
        };
        let options = validate.apply(config);
        assert!(options.strict);
        assert!(options.require_tests);
        assert_eq!(options.max_steps_per_task, 4);
        assert_eq!(options.max_task_minutes, 10);
    }

    #[test]
    fn test_run_flags() {
        let args = Args::parse_from([
            "pk",
            "run",
            "plan.md",
            "--continue-on-error",
            "--lenient-steps",
        ]);
        let Commands::Run(run) = args.command else {
            panic!("expected run command");
        };
        let options = run.apply(ExecuteOptions::default());
        assert!(!options.stop_on_error);
        assert_eq!(options.step_policy, StepPolicy::Lenient);
        assert!(!options.dry_run);
    }
}
