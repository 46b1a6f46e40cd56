use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PLAN: &str = r#"# Greeter

**Goal:** Print a greeting

## Task 1: Write greeting

**Files:**
- Create: `greeting.txt`

1. Write the greeting file
   - Run: `echo hello > greeting.txt`
2. Verify the greeting
   - Run: `cat greeting.txt`
   - Expect: hello

## Task 2: Shout

**Depends on:** 1

1. Implement shouting
   - Run: `tr a-z A-Z < greeting.txt`
   - Expect: HELLO
"#;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

fn write_plan(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("plan.md");
    std::fs::write(&path, contents).expect("Failed to write plan");
    path
}

/// Command with --no-color and an isolated config directory
fn pk_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pk").expect("Failed to find pk binary");
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .arg("--no-color");
    cmd
}

#[test]
fn test_cli_parse_plan() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    pk_cmd(&temp_dir)
        .args(["parse", plan.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Greeter"))
        .stdout(predicate::str::contains("| 2 | Shout | ○ Pending | 1 | 1 |"));
}

#[test]
fn test_cli_parse_json() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    let output = pk_cmd(&temp_dir)
        .args(["parse", plan.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "Greeter");
    assert_eq!(json["tasks"][1]["dependencies"][0], 1);
    assert_eq!(json["tasks"][0]["steps"][1]["expected_output"], "hello");
}

#[test]
fn test_cli_parse_missing_file() {
    let temp_dir = create_cli_test_environment();

    pk_cmd(&temp_dir)
        .args(["parse", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.md"));
}

#[test]
fn test_cli_validate_valid_plan() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    pk_cmd(&temp_dir)
        .args(["validate", plan.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan is valid"));
}

#[test]
fn test_cli_validate_strict_fails() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    pk_cmd(&temp_dir)
        .args([
            "validate",
            plan.to_str().unwrap(),
            "--require-commits",
            "--strict",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Plan is invalid"))
        .stdout(predicate::str::contains("Task 1 has no commit step"))
        .stderr(predicate::str::contains("is invalid"));
}

#[test]
fn test_cli_validate_cycle() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(
        temp_dir.path(),
        "# Loop\n\n**Goal:** Spin\n\n## Task 1: A\n\n**Depends on:** 2\n\n1. Do it\n\n\
         ## Task 2: B\n\n**Depends on:** 1\n\n1. Do it\n",
    );

    pk_cmd(&temp_dir)
        .args(["validate", plan.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Circular dependency: 1 -> 2 -> 1"));
}

#[test]
fn test_cli_validate_uses_config_file() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);
    let config = temp_dir.path().join("plankit.json");
    std::fs::write(
        &config,
        r#"{ "validation": { "require_files": true, "strict": true } }"#,
    )
    .unwrap();

    pk_cmd(&temp_dir)
        .args([
            "--config",
            config.to_str().unwrap(),
            "validate",
            plan.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Task 2 references no files"));
}

#[test]
fn test_cli_invalid_config_file() {
    let temp_dir = create_cli_test_environment();
    let config = temp_dir.path().join("broken.json");
    std::fs::write(&config, "{ nope").unwrap();

    pk_cmd(&temp_dir)
        .args(["--config", config.to_str().unwrap(), "templates"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_cli_run_plan() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    pk_cmd(&temp_dir)
        .args([
            "run",
            plan.to_str().unwrap(),
            "-C",
            temp_dir.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: 1, 2"))
        .stderr(predicate::str::contains("▶ Task 1: Write greeting"))
        .stderr(predicate::str::contains("✓ Task 2 completed"));

    let greeting = std::fs::read_to_string(temp_dir.path().join("greeting.txt")).unwrap();
    assert_eq!(greeting.trim(), "hello");
}

#[test]
fn test_cli_run_failure_skips_dependents() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(
        temp_dir.path(),
        &PLAN.replace("echo hello > greeting.txt", "exit 1"),
    );

    pk_cmd(&temp_dir)
        .args([
            "run",
            plan.to_str().unwrap(),
            "-C",
            temp_dir.path().to_str().unwrap(),
            "--continue-on-error",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed: 1"))
        .stdout(predicate::str::contains("Skipped: 2"))
        .stderr(predicate::str::contains("⊘ Task 2 skipped"));
}

#[test]
fn test_cli_run_dry_run_executes_nothing() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    pk_cmd(&temp_dir)
        .args([
            "run",
            plan.to_str().unwrap(),
            "-C",
            temp_dir.path().to_str().unwrap(),
            "--dry-run",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"))
        .stdout(predicate::str::contains("[dry run] task 1 step 1"));

    assert!(!temp_dir.path().join("greeting.txt").exists());
}

#[test]
fn test_cli_run_refuses_invalid_plan() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(
        temp_dir.path(),
        "# Broken\n\n**Goal:** Fail\n\n## Task 1: A\n\n**Depends on:** 9\n\n1. Do it\n",
    );

    pk_cmd(&temp_dir)
        .args(["run", plan.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("depends on non-existent task 9"))
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_cli_new_plan_from_templates() {
    let temp_dir = create_cli_test_environment();
    let output = temp_dir.path().join("plans/auth.md");

    pk_cmd(&temp_dir)
        .args([
            "new",
            "Auth",
            "--goal",
            "Add login",
            "--tech",
            "Rust,Axum",
            "--task",
            "add-feature:login form",
            "--task",
            "fix-bug:session expiry",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("with 2 tasks"));

    let markdown = std::fs::read_to_string(&output).unwrap();
    assert!(markdown.starts_with("# Auth\n"));
    assert!(markdown.contains("- Axum"));
    assert!(markdown.contains("## Task 1: login form"));
    assert!(markdown.contains("## Task 2: session expiry"));
}

#[test]
fn test_cli_new_unknown_template() {
    let temp_dir = create_cli_test_environment();

    pk_cmd(&temp_dir)
        .args(["new", "Auth", "--goal", "Add login", "--task", "deploy:prod"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown template 'deploy'"));
}

#[test]
fn test_cli_new_rejects_malformed_task() {
    let temp_dir = create_cli_test_environment();

    pk_cmd(&temp_dir)
        .args(["new", "Auth", "--goal", "Add login", "--task", "fix-bug"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TEMPLATE:NAME"));
}

#[test]
fn test_cli_fmt_write_is_idempotent() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(
        temp_dir.path(),
        "# Messy\nGoal: Tidy up\n## Task 1: Only\n1. implement it\n",
    );

    pk_cmd(&temp_dir)
        .args(["fmt", plan.to_str().unwrap(), "--write"])
        .assert()
        .success();
    let first = std::fs::read_to_string(&plan).unwrap();
    assert!(first.contains("**Goal:** Tidy up"));

    pk_cmd(&temp_dir)
        .args(["fmt", plan.to_str().unwrap()])
        .assert()
        .success()
        .stdout(first);
}

#[test]
fn test_cli_merge_plans() {
    let temp_dir = create_cli_test_environment();
    let first = write_plan(temp_dir.path(), PLAN);
    let second = temp_dir.path().join("second.md");
    std::fs::write(
        &second,
        "# Extra\n\n**Goal:** Wave\n\n## Task 1: Wave\n\n1. Implement waving\n",
    )
    .unwrap();

    pk_cmd(&temp_dir)
        .args(["merge", first.to_str().unwrap(), second.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("**Goal:** Print a greeting; Wave"))
        .stdout(predicate::str::contains("## Task 3: Wave"));
}

#[test]
fn test_cli_templates() {
    let temp_dir = create_cli_test_environment();

    pk_cmd(&temp_dir)
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("### create-component"))
        .stdout(predicate::str::contains("### write-docs"));
}
