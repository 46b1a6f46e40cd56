//! Markdown plan parser.
//!
//! Parsing is a two-pass affair: [`lexer::tokenize`] classifies lines into a
//! token stream, then [`assembler::assemble`] builds the [`Plan`] from it.
//! The parser never fails; whatever it cannot recognize is dropped and gaps
//! (a missing goal, a task without steps) are left for the validator.
//!
//! # Grammar
//!
//! ~~~text
//! # Plan name
//!
//! **Goal:** One line goal
//! **Version:** 1.0
//!
//! ## Architecture
//! Free text.
//!
//! ## Tech Stack
//! - Rust
//!
//! ## Task 1: Task name
//! Optional description paragraph.
//!
//! **Files:**
//! - Create: `src/lib.rs`
//! - Test: `tests/lib.rs`
//!
//! **Estimated:** 5 minutes
//! **Depends on:** 2, 3
//!
//! 1. Write the failing test
//!    ```rust
//!    #[test] fn it_works() {}
//!    ```
//!    - Run: `cargo test`
//!    - Expect: FAILED
//! 2. [review] Look over the diff
//!    - Critical
//! ~~~

pub mod assembler;
pub mod lexer;

#[cfg(test)]
mod tests;

use crate::models::Plan;

/// Parses plan text into a draft [`Plan`].
///
/// ```rust
/// use plankit_core::parser::parse;
///
/// let plan = parse("# Demo\n\nGoal: Show parsing\n\n## Task 1: Only\n\n1. Do it\n");
/// assert_eq!(plan.name, "Demo");
/// assert_eq!(plan.goal, "Show parsing");
/// assert_eq!(plan.tasks[0].steps[0].description, "Do it");
/// ```
pub fn parse(text: &str) -> Plan {
    assembler::assemble(lexer::tokenize(text))
}
