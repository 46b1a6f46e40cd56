//! Markdown rendering of plans and reports.
//!
//! Domain types implement [`std::fmt::Display`] here rather than next to
//! their definitions, so the models stay plain data. All output is markdown,
//! meant for the CLI's terminal renderer or for MCP tool responses.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Display impls & │    │   Markdown      │
//! │ (Plan, Task ..) │───▶│ report wrappers │───▶│ (Terminal/MCP)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ```rust
//! use plankit_core::{display::TaskOverview, parser::parse};
//!
//! let plan = parse("# Demo\n\n**Goal:** Show it\n\n## Task 1: Only\n\n1. Implement it\n");
//! let text = plan.to_string();
//! assert!(text.contains("# Demo"));
//! assert!(text.contains("○ Pending"));
//!
//! let overview = TaskOverview(&plan).to_string();
//! assert!(overview.contains("| 1 | Only |"));
//! ```

mod datetime;
mod models;
mod report;

pub use datetime::{Elapsed, LocalDateTime};
pub use models::{TaskOverview, TemplateCatalog};
