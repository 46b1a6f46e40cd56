//! Core library for PlanKit: markdown implementation plans that can be
//! parsed, validated, generated and executed.
//!
//! Data flows one way:
//!
//! ```text
//! text ──▶ parser ──▶ Plan ──▶ validator ──▶ executor ──▶ ExecutionResult
//!                      ▲
//!                      └── generator (create, templates, merge) ──▶ markdown
//! ```
//!
//! Parsing, validation and generation never fail; problems are reported as
//! data. The executor never fails either: a step runner that errors or
//! panics fails its task. Only the I/O edges ([`planfile`], [`config`])
//! return [`Result`].
//!
//! # Display Architecture
//!
//! Models are plain data; their markdown [`std::fmt::Display`]
//! implementations live in [`display`] and feed the CLI's terminal renderer
//! and the MCP server alike.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use plankit_core::{
//!     ExecuteOptions, Executor, FnRunner, PlanGenerator, StepOutcome, ValidationOptions,
//!     params::{CreatePlan, TemplateTask},
//!     validate,
//! };
//!
//! # async fn example() {
//! let generator = PlanGenerator::default();
//! let mut plan = generator.create_plan(&CreatePlan {
//!     name: "Auth".to_string(),
//!     goal: "Add login".to_string(),
//!     ..Default::default()
//! });
//! generator
//!     .add_task_from_template(&mut plan, "add-feature", &TemplateTask::new("login form"))
//!     .expect("template exists");
//!
//! let report = validate(&plan, &ValidationOptions::default());
//! assert!(report.valid);
//!
//! let executor = Executor::new(Arc::new(FnRunner::new(|step, _task| {
//!     Ok(StepOutcome::success(format!("did: {}", step.description)))
//! })));
//! let result = executor.execute(&mut plan, ExecuteOptions::default()).await;
//! println!("{result}");
//! # }
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod executor;
pub mod generator;
pub mod models;
pub mod params;
pub mod parser;
pub mod planfile;
pub mod validator;

// Re-export commonly used types
pub use config::{ConfigLoader, ExecutionDefaults, PlanKitConfig};
pub use display::{Elapsed, LocalDateTime, TaskOverview, TemplateCatalog};
pub use error::{PlanKitError, Result};
pub use executor::{
    ControlState, DryRunRunner, ExecuteOptions, ExecutionControl, ExecutionEvent,
    ExecutionListener, ExecutionResult, Executor, FnRunner, ProgressCallback, ProgressStatus,
    StepOutcome, StepPolicy, StepRunner,
};
pub use generator::{GeneratorConfig, PlanGenerator, templates::TaskTemplate, to_markdown};
pub use models::{FileRefs, Plan, PlanStatus, Step, StepType, Task, TaskResult, TaskStatus};
pub use params::{CreatePlan, NewStep, NewTask, TemplateTask};
pub use parser::parse;
pub use planfile::{read_plan, write_plan};
pub use validator::{
    IssueSeverity, ValidationIssue, ValidationOptions, ValidationResult, ValidationStats, validate,
};
