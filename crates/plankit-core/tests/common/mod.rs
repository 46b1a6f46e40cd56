#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

/// A plan exercising most of the grammar: metadata, sections, files, code,
/// commands, expectations and dependencies.
pub const SAMPLE_PLAN: &str = r#"# Todo API

**Goal:** Serve a todo list over HTTP
**Version:** 0.1

## Architecture

Axum router in front of an in-memory store.

## Tech Stack

- Rust
- Axum
- Tokio

---

## Task 1: Store

Keep todos in memory.

**Files:**
- Create: `src/store.rs`
- Test: `tests/store.rs`

**Estimated:** 5 minutes

1. Write the failing store test
   ```rust
   #[test]
   fn inserts() {}
   ```
2. Implement the store
   - Run: `cargo build`
3. Verify the store responds
   - Run: `cargo test store`
   - Expect: ok
4. Commit the store

## Task 2: Routes

**Depends on:** Task 1
**Estimated:** 8 minutes
**Tags:** http, api

1. Write route tests
   - Run: `cargo test routes`
2. Implement the routes
3. Commit the routes

## Task 3: Docs

**Depends on:** 1
**Estimated:** 3 minutes

1. Document the API
2. [review] Proofread
"#;

/// Writes `contents` to `plan.md` in a fresh temporary directory.
pub fn write_plan_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("plan.md");
    std::fs::write(&path, contents).expect("Failed to write plan file");
    (temp_dir, path)
}
