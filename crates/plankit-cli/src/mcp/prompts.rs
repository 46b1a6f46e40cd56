//! Prompt templates for MCP server

use std::sync::LazyLock;

/// Argument definition for a prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplateArg {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Definition of a prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub description: &'static str,
    /// Body with `{argument}` placeholders
    pub template: &'static str,
    pub arguments: Vec<PromptTemplateArg>,
}

pub static PROMPT_TEMPLATES: LazyLock<Vec<PromptTemplate>> = LazyLock::new(|| {
    vec![
        PromptTemplate {
            name: "draft_plan",
            description: "Draft a markdown implementation plan for a goal",
            template: r#"You are writing an implementation plan that PlanKit can parse, validate and run.

# Goal
{goal}

# Context
{context}

# Format
Write one markdown document:

```markdown
# <Plan name>

**Goal:** <one sentence>

## Architecture

<a short paragraph>

## Tech Stack

- <technology>

## Task 1: <name>

<what and why, one or two sentences>

**Files:**
- Create: `path/to/new.rs`
- Test: `tests/new.rs`

**Estimated:** 5 minutes

1. Write the failing test
2. Implement the change
   - Run: `cargo test`
   - Expect: ok
3. Commit the change

## Task 2: <name>

**Depends on:** 1
...
```

# Rules
- Keep every task under 10 minutes and between 1 and 15 steps.
- Start tasks with a test step and end them with a commit step.
- Give steps a `Run:` command when they can be checked automatically, and an `Expect:` line for output that proves success.
- Only depend on earlier tasks; never create cycles.

# Checking Your Work
Call `validate_plan` with the draft and fix every error it reports. Use `list_templates` and `add_template_task` for common task shapes."#,
            arguments: vec![
                PromptTemplateArg {
                    name: "goal",
                    description: "What the plan should achieve",
                    required: true,
                },
                PromptTemplateArg {
                    name: "context",
                    description: "Relevant background such as the codebase or constraints",
                    required: false,
                },
            ],
        },
        PromptTemplate {
            name: "review_plan",
            description: "Review an existing plan and tighten its tasks",
            template: r#"Review the implementation plan at `{path}`.

1. Call `validate_plan` with `path` set to `{path}` and `options.strict` set to true.
2. For every issue, propose the concrete markdown change that resolves it.
3. Split tasks estimated above the limit into smaller tasks and keep their dependencies correct.
4. Call `format_plan` on the result so the document is in canonical form."#,
            arguments: vec![PromptTemplateArg {
                name: "path",
                description: "Path to the plan markdown file",
                required: true,
            }],
        },
    ]
});
