//! Builds a [`Plan`] from the lexer's token stream.

use log::debug;

use super::lexer::{Token, split_key_value};
use crate::models::{FileRefs, Plan, Step, StepType, Task};

/// Which part of the document the assembler is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Architecture,
    TechStack,
    Task,
    Other,
}

/// Assembles tokens into a plan. Unrecognized tokens are dropped.
pub fn assemble(tokens: Vec<Token>) -> Plan {
    let mut assembler = Assembler::new();
    for token in tokens {
        assembler.accept(token);
    }
    assembler.finish()
}

struct Assembler {
    plan: Plan,
    section: Section,
    seen_task: bool,
    current: Option<Task>,
    description: Vec<String>,
    architecture: Vec<String>,
    /// Set right after a step item, so a following fence attaches to it
    awaiting_code: bool,
}

impl Assembler {
    fn new() -> Self {
        Self {
            plan: Plan::new("", ""),
            section: Section::Preamble,
            seen_task: false,
            current: None,
            description: Vec::new(),
            architecture: Vec::new(),
            awaiting_code: false,
        }
    }

    fn accept(&mut self, token: Token) {
        if !matches!(token, Token::Blank | Token::Fence { .. }) {
            self.awaiting_code = false;
        }

        match token {
            Token::Heading { level, text } => self.heading(level, &text),
            Token::Metadata { key, value, raw } => self.metadata(&key, &value, raw),
            Token::ListItem { number, text, .. } => match number {
                Some(number) => self.numbered_item(number, &text),
                None => self.bullet_item(text),
            },
            Token::Fence { language, body } => self.fence(language, body),
            Token::Text(text) => self.text(text),
            Token::Blank => match self.section {
                Section::Architecture => self.architecture.push(String::new()),
                Section::Task if !self.description.is_empty() => self.text(String::new()),
                _ => {}
            },
        }
    }

    fn heading(&mut self, level: usize, text: &str) {
        if level == 1 {
            if self.plan.name.is_empty() {
                self.plan.name = text.to_string();
            }
            return;
        }

        if level == 2
            && let Some((id, name)) = parse_task_heading(text)
        {
            self.flush_task();
            debug!("parsed task heading {id}: {name}");
            self.current = Some(Task::new(id, name));
            self.seen_task = true;
            self.section = Section::Task;
            return;
        }

        // Sub-headings inside a task (e.g. `### Steps`) keep the task open
        if level > 2 {
            return;
        }

        self.flush_task();
        self.section = match text.to_lowercase().as_str() {
            "architecture" => Section::Architecture,
            "tech stack" | "tech-stack" | "technology stack" => Section::TechStack,
            _ => Section::Other,
        };
    }

    fn metadata(&mut self, key: &str, value: &str, raw: String) {
        match self.section {
            Section::Task => {
                if !self.task_field(key, value) {
                    self.text(raw);
                }
            }
            Section::Architecture => self.architecture.push(raw),
            Section::TechStack => push_list(&mut self.plan.tech_stack, value),
            Section::Preamble | Section::Other if !self.seen_task => {
                self.plan_field(key, value);
            }
            Section::Preamble | Section::Other => {}
        }
    }

    fn plan_field(&mut self, key: &str, value: &str) {
        let value = value.to_string();
        match key.to_lowercase().as_str() {
            "goal" => self.plan.goal = value,
            "version" => self.plan.version = Some(value),
            "author" => self.plan.author = Some(value),
            "design doc" | "design document" | "design" => {
                self.plan.design_doc = Some(strip_backticks(&value).to_string());
            }
            "architecture" => self.plan.architecture = Some(value),
            "tech stack" | "tech-stack" => push_list(&mut self.plan.tech_stack, &value),
            _ => {}
        }
    }

    /// Applies a task-level `Key: value`; returns false when the key is not
    /// task metadata.
    fn task_field(&mut self, key: &str, value: &str) -> bool {
        let Some(task) = self.current.as_mut() else {
            return false;
        };

        match key.to_lowercase().as_str() {
            "estimated" | "estimate" | "estimated time" | "time" => {
                task.estimated_minutes = parse_minutes(value);
            }
            "depends on" | "dependencies" | "depends" => {
                task.dependencies = parse_dependencies(value);
            }
            "priority" => task.priority = first_number(value),
            "tags" => {
                task.tags = split_list(value);
            }
            "files" => {}
            "description" => self.description.push(value.to_string()),
            other => {
                if let Some(paths) = file_bucket(&mut task.files, other) {
                    paths.extend(split_list(value));
                } else {
                    return false;
                }
            }
        }
        true
    }

    fn numbered_item(&mut self, number: u32, text: &str) {
        match self.section {
            Section::Task => {
                let Some(task) = self.current.as_mut() else {
                    return;
                };
                let (explicit, description) = split_type_tag(text);
                let step_type = explicit.unwrap_or_else(|| StepType::infer(description));
                task.steps.push(Step::new(number, description, step_type));
                self.awaiting_code = true;
            }
            Section::Architecture => self.architecture.push(format!("{number}. {text}")),
            Section::TechStack => push_list(&mut self.plan.tech_stack, text),
            Section::Preamble | Section::Other => {}
        }
    }

    fn bullet_item(&mut self, text: String) {
        match self.section {
            Section::Task => self.task_bullet(&text),
            Section::Architecture => self.architecture.push(format!("- {text}")),
            Section::TechStack => push_list(&mut self.plan.tech_stack, &text),
            Section::Preamble | Section::Other => {}
        }
    }

    fn task_bullet(&mut self, text: &str) {
        let plain = text.trim_matches('*').trim();
        if plain.eq_ignore_ascii_case("critical") {
            if let Some(step) = self.last_step() {
                step.critical = true;
            }
            return;
        }

        let Some((key, value)) = split_key_value(text) else {
            return;
        };

        match key.to_lowercase().as_str() {
            "run" | "command" => {
                if let Some(step) = self.last_step() {
                    step.command = Some(strip_backticks(&value).to_string());
                }
            }
            "expect" | "expected" | "expected output" => {
                if let Some(step) = self.last_step() {
                    step.expected_output = Some(strip_backticks(&value).to_string());
                }
            }
            "critical" => {
                if let Some(step) = self.last_step() {
                    step.critical = !value.eq_ignore_ascii_case("false");
                }
            }
            _ => {
                self.task_field(&key, &value);
            }
        }
    }

    fn fence(&mut self, language: Option<String>, body: String) {
        if self.awaiting_code
            && let Some(step) = self.last_step()
            && step.code.is_none()
        {
            step.code = Some(body);
            step.language = language;
            self.awaiting_code = false;
            return;
        }

        if self.section == Section::Architecture {
            self.architecture.push(body);
        }
    }

    fn text(&mut self, text: String) {
        match self.section {
            Section::Task => {
                let has_steps = self
                    .current
                    .as_ref()
                    .is_some_and(|task| !task.steps.is_empty());
                if !has_steps {
                    self.description.push(text);
                }
            }
            Section::Architecture => self.architecture.push(text),
            Section::TechStack => push_list(&mut self.plan.tech_stack, &text),
            Section::Preamble | Section::Other => {}
        }
    }

    fn last_step(&mut self) -> Option<&mut Step> {
        self.current.as_mut()?.steps.last_mut()
    }

    fn flush_task(&mut self) {
        self.awaiting_code = false;
        if let Some(mut task) = self.current.take() {
            let description = self.description.join("\n").trim().to_string();
            if !description.is_empty() {
                task.description = Some(description);
            }
            self.plan.tasks.push(task);
        }
        self.description.clear();
    }

    fn finish(mut self) -> Plan {
        self.flush_task();
        let architecture = self.architecture.join("\n").trim().to_string();
        if !architecture.is_empty() {
            self.plan.architecture = Some(architecture);
        }
        debug!(
            "assembled plan '{}' with {} tasks",
            self.plan.name,
            self.plan.tasks.len()
        );
        self.plan
    }
}

/// Parses `Task <id>: <name>`; the separator may also be `.` or `-`.
fn parse_task_heading(text: &str) -> Option<(u32, String)> {
    let prefix = text.get(..4)?;
    if !prefix.eq_ignore_ascii_case("task") {
        return None;
    }
    let rest = text[4..].trim_start();
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let id = rest[..digits].parse().ok()?;
    let rest = rest[digits..].trim_start();
    let name = match rest.chars().next() {
        None => "",
        Some(':' | '.' | '-') => rest[1..].trim(),
        Some(_) => return None,
    };
    Some((id, name.to_string()))
}

/// Splits an optional leading `[type]` tag off a step description.
fn split_type_tag(text: &str) -> (Option<StepType>, &str) {
    if let Some(rest) = text.strip_prefix('[')
        && let Some(close) = rest.find(']')
        && let Ok(step_type) = rest[..close].parse::<StepType>()
    {
        return (Some(step_type), rest[close + 1..].trim());
    }
    (None, text)
}

fn file_bucket<'a>(files: &'a mut FileRefs, key: &str) -> Option<&'a mut Vec<String>> {
    match key {
        "create" => Some(&mut files.create),
        "modify" => Some(&mut files.modify),
        "test" | "tests" => Some(&mut files.test),
        "delete" => Some(&mut files.delete),
        _ => None,
    }
}

fn strip_backticks(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('`')
        .and_then(|inner| inner.strip_suffix('`'))
        .unwrap_or(trimmed)
}

/// Comma-separated list with backticks and blanks removed.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| strip_backticks(item).to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn push_list(target: &mut Vec<String>, value: &str) {
    target.extend(split_list(value));
}

fn first_number(value: &str) -> Option<u32> {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn parse_minutes(value: &str) -> Option<u32> {
    let number = first_number(value)?;
    if value.to_lowercase().contains("hour") {
        Some(number.saturating_mul(60))
    } else {
        Some(number)
    }
}

/// Parses `2, 3`, `Task 2, #3` and friends. Unparsable tokens are dropped.
fn parse_dependencies(value: &str) -> Vec<u32> {
    let mut ids = Vec::new();
    for token in value.split([',', ' ']).filter(|t| !t.trim().is_empty()) {
        let token = token.trim().trim_start_matches('#');
        if let Ok(id) = token.parse::<u32>()
            && id > 0
            && !ids.contains(&id)
        {
            ids.push(id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_heading_variants() {
        assert_eq!(
            parse_task_heading("Task 1: Setup"),
            Some((1, "Setup".to_string()))
        );
        assert_eq!(
            parse_task_heading("task 12 - Wire it"),
            Some((12, "Wire it".to_string()))
        );
        assert_eq!(parse_task_heading("Task 3"), Some((3, String::new())));
        assert_eq!(parse_task_heading("Tasks overview"), None);
        assert_eq!(parse_task_heading("Task list: misc"), None);
        assert_eq!(parse_task_heading("Architecture"), None);
    }

    #[test]
    fn test_parse_dependencies_drops_garbage() {
        assert_eq!(parse_dependencies("2, 3"), vec![2, 3]);
        assert_eq!(parse_dependencies("Task 2, #4, soon, 0"), vec![2, 4]);
        assert_eq!(parse_dependencies("none"), Vec::<u32>::new());
        assert_eq!(parse_dependencies("1, 1"), vec![1]);
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("5 minutes"), Some(5));
        assert_eq!(parse_minutes("~2-4 min"), Some(2));
        assert_eq!(parse_minutes("1 hour"), Some(60));
        assert_eq!(parse_minutes("soon"), None);
    }

    #[test]
    fn test_split_type_tag() {
        assert_eq!(
            split_type_tag("[review] Look it over"),
            (Some(StepType::Review), "Look it over")
        );
        assert_eq!(split_type_tag("[wip] Draft"), (None, "[wip] Draft"));
        assert_eq!(split_type_tag("Plain"), (None, "Plain"));
    }

    #[test]
    fn test_split_list_strips_backticks() {
        assert_eq!(
            split_list("`src/a.rs`, `src/b.rs`,"),
            vec!["src/a.rs".to_string(), "src/b.rs".to_string()]
        );
    }
}
