//! Tests for the parser module.

use super::*;
use crate::models::{PlanStatus, StepType, TaskStatus};

const SAMPLE: &str = r#"# Auth Service

**Goal:** Add password login to the API
**Version:** 1.2
**Author:** Platform Team
**Design Doc:** `docs/auth.md`

## Architecture

Stateless handlers backed by a session table.

- Sessions expire after 24h

## Tech Stack

- Rust
- Axum, SQLx

---

## Task 1: Session table

Create the migration for sessions.

**Files:**
- Create: `migrations/001_sessions.sql`
- Test: `tests/sessions.rs`, `tests/common.rs`

**Estimated:** 5 minutes
**Priority:** 2
**Tags:** db, schema

1. Write the failing test for session insert
   ```rust
   #[test]
   fn inserts_session() {}
   ```
   - Run: `cargo test sessions`
   - Expect: FAILED
2. Create the migration
3. Verify the migration applies
   - Run: `sqlx migrate run`
   - Critical
4. Commit the migration

## Task 2: Login handler

**Depends on:** Task 1, nonsense
**Estimated:** 8 minutes

1. [review] Walk through the handler with the team
2. Implement the handler
"#;

#[test]
fn test_parse_plan_header() {
    let plan = parse(SAMPLE);

    assert_eq!(plan.name, "Auth Service");
    assert_eq!(plan.goal, "Add password login to the API");
    assert_eq!(plan.version.as_deref(), Some("1.2"));
    assert_eq!(plan.author.as_deref(), Some("Platform Team"));
    assert_eq!(plan.design_doc.as_deref(), Some("docs/auth.md"));
    assert_eq!(plan.status, PlanStatus::Draft);
    assert_eq!(
        plan.architecture.as_deref(),
        Some("Stateless handlers backed by a session table.\n\n- Sessions expire after 24h")
    );
    assert_eq!(plan.tech_stack, vec!["Rust", "Axum", "SQLx"]);
}

#[test]
fn test_parse_tasks_and_metadata() {
    let plan = parse(SAMPLE);
    assert_eq!(plan.tasks.len(), 2);

    let first = &plan.tasks[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.name, "Session table");
    assert_eq!(
        first.description.as_deref(),
        Some("Create the migration for sessions.")
    );
    assert_eq!(first.files.create, vec!["migrations/001_sessions.sql"]);
    assert_eq!(first.files.test, vec!["tests/sessions.rs", "tests/common.rs"]);
    assert_eq!(first.estimated_minutes, Some(5));
    assert_eq!(first.priority, Some(2));
    assert_eq!(first.tags, vec!["db", "schema"]);
    assert_eq!(first.status, TaskStatus::Pending);

    let second = &plan.tasks[1];
    assert_eq!(second.dependencies, vec![1]);
    assert_eq!(second.estimated_minutes, Some(8));
    assert!(second.description.is_none());
}

#[test]
fn test_parse_steps() {
    let plan = parse(SAMPLE);
    let steps = &plan.tasks[0].steps;
    assert_eq!(steps.len(), 4);

    assert_eq!(steps[0].number, 1);
    assert_eq!(steps[0].step_type, StepType::Test);
    assert_eq!(steps[0].language.as_deref(), Some("rust"));
    assert_eq!(
        steps[0].code.as_deref(),
        Some("#[test]\nfn inserts_session() {}")
    );
    assert_eq!(steps[0].command.as_deref(), Some("cargo test sessions"));
    assert_eq!(steps[0].expected_output.as_deref(), Some("FAILED"));
    assert!(!steps[0].critical);

    assert_eq!(steps[1].step_type, StepType::Implement);
    assert_eq!(steps[2].step_type, StepType::Verify);
    assert!(steps[2].critical);
    assert_eq!(steps[2].command.as_deref(), Some("sqlx migrate run"));
    assert_eq!(steps[3].step_type, StepType::Commit);

    let second = &plan.tasks[1].steps;
    assert_eq!(second[0].step_type, StepType::Review);
    assert_eq!(second[0].description, "Walk through the handler with the team");
    assert_eq!(second[1].step_type, StepType::Implement);
}

#[test]
fn test_parse_empty_input() {
    let plan = parse("");
    assert!(plan.name.is_empty());
    assert!(plan.goal.is_empty());
    assert!(plan.tasks.is_empty());
}

#[test]
fn test_parse_garbage_never_fails() {
    let plan = parse("```\nunterminated\n## Task 1: hidden in fence");
    assert!(plan.tasks.is_empty());

    let plan = parse("## Task x: not a task\n1. stray step\n- Run: `ls`");
    assert!(plan.tasks.is_empty());
}

#[test]
fn test_missing_goal_left_empty() {
    let plan = parse("# Only a name\n\n## Task 1: Thing\n\n1. Do the thing\n");
    assert_eq!(plan.name, "Only a name");
    assert!(plan.goal.is_empty());
    assert_eq!(plan.tasks.len(), 1);
}

#[test]
fn test_metadata_after_first_task_is_not_plan_level() {
    let plan = parse("# P\n\n## Task 1: A\n\nGoal: not the plan goal\n1. Step\n");
    assert!(plan.goal.is_empty());
    assert_eq!(
        plan.tasks[0].description.as_deref(),
        Some("Goal: not the plan goal")
    );
}

#[test]
fn test_code_block_only_attaches_immediately_after_step() {
    let text = "# P\n\n## Task 1: A\n\n1. First\n\n   ```sh\n   echo hi\n   ```\n2. Second\n   Some prose\n   ```sh\n   echo late\n   ```\n";
    let plan = parse(text);
    let steps = &plan.tasks[0].steps;
    assert_eq!(steps[0].code.as_deref(), Some("echo hi"));
    assert_eq!(steps[0].language.as_deref(), Some("sh"));
    assert!(steps[1].code.is_none());
}

#[test]
fn test_non_task_level_two_heading_closes_task() {
    let text = "# P\n\n## Task 1: A\n\n1. Step\n\n## Notes\n\n1. Not a step\n";
    let plan = parse(text);
    assert_eq!(plan.tasks.len(), 1);
    assert_eq!(plan.tasks[0].steps.len(), 1);
}

#[test]
fn test_only_level_two_headings_open_tasks() {
    let text = "# P\n\n## Task 1: A\n\n### Task 2: Nested\n\n1. Step\n";
    let plan = parse(text);
    assert_eq!(plan.tasks.len(), 1);
    assert_eq!(plan.tasks[0].name, "A");
    assert_eq!(plan.tasks[0].steps.len(), 1);
}

#[test]
fn test_steps_keep_written_numbers() {
    let plan = parse("# P\n\n## Task 1: A\n\n1. One\n3. Three\n");
    let numbers: Vec<u32> = plan.tasks[0].steps.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 3]);
}

#[test]
fn test_inline_tech_stack_and_architecture_lines() {
    let plan = parse("# P\n\n**Architecture:** Event sourced\n**Tech Stack:** Rust, Tokio\n");
    assert_eq!(plan.architecture.as_deref(), Some("Event sourced"));
    assert_eq!(plan.tech_stack, vec!["Rust", "Tokio"]);
}
