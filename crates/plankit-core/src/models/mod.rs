//! Data models for plans, tasks and steps.
//!
//! A [`Plan`] exclusively owns its [`Task`]s, which own their [`Step`]s.
//! Display implementations for these models live in [`crate::display`] to
//! keep data separate from presentation.
//!
//! # Examples
//!
//! ```rust
//! use plankit_core::models::{Plan, Step, StepType, Task, TaskStatus};
//!
//! let mut plan = Plan::new("Auth", "Add login");
//! let mut task = Task::new(1, "Login form");
//! task.steps.push(Step::inferred(1, "Write the failing test"));
//! plan.tasks.push(task);
//!
//! assert_eq!(plan.tasks[0].steps[0].step_type, StepType::Test);
//! assert_eq!(plan.tasks[0].status, TaskStatus::Pending);
//! ```

pub mod plan;
pub mod status;
pub mod step;
pub mod task;


pub use plan::Plan;
pub use status::{PlanStatus, StepType, TaskStatus};
pub use step::Step;
pub use task::{FileRefs, Task, TaskResult};
