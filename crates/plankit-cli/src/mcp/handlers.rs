//! MCP tool handlers implementation

use std::sync::Arc;

use log::debug;
use plankit_core::{
    Plan, PlanGenerator, PlanKitConfig, TemplateCatalog, ValidationOptions,
    generator::templates::list_templates, params as core, parse, read_plan, to_markdown, validate,
};
use rmcp::{
    ErrorData, RoleServer,
    handler::server::tool::Parameters,
    model::{
        CallToolResult, Content, GetPromptRequestParam, GetPromptResult, ListPromptsResult,
        PaginatedRequestParam, Prompt, PromptArgument, PromptMessage, PromptMessageContent,
        PromptMessageRole,
    },
    service::RequestContext,
};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{errors::to_mcp_error, prompts::PROMPT_TEMPLATES};

/// Generic MCP wrapper for core parameter types
///
/// Adds the `Deserialize` and `JsonSchema` plumbing MCP needs while the core
/// types stay free of protocol concerns. `#[serde(transparent)]` passes the
/// JSON straight through to the wrapped type.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type CreatePlan = McpParams<core::CreatePlan>;

pub type McpResult = Result<CallToolResult, ErrorData>;

/// Where a tool reads its plan from: inline markdown or a file on disk.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct PlanSource {
    /// Plan markdown; takes precedence over `path`
    #[serde(default)]
    pub content: Option<String>,
    /// Path to a plan markdown file
    #[serde(default)]
    pub path: Option<String>,
}

impl PlanSource {
    fn load(&self) -> Result<Plan, ErrorData> {
        match (&self.content, &self.path) {
            (Some(content), _) => Ok(parse(content)),
            (None, Some(path)) => {
                read_plan(path).map_err(|e| to_mcp_error("Failed to read plan", &e))
            }
            (None, None) => Err(ErrorData::invalid_params(
                "Provide either 'content' or 'path'",
                None,
            )),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ParsePlan {
    #[serde(flatten)]
    pub source: PlanSource,
    /// Return the parsed plan as JSON instead of a markdown overview
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidatePlan {
    #[serde(flatten)]
    pub source: PlanSource,
    /// Validation settings; the server configuration is used when omitted
    #[serde(default)]
    pub options: Option<ValidationOptions>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FormatPlan {
    #[serde(flatten)]
    pub source: PlanSource,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTemplateTask {
    #[serde(flatten)]
    pub source: PlanSource,
    /// Template name, e.g. `fix-bug`; see `list_templates`
    pub template: String,
    /// Name of the new task
    pub name: String,
    /// Ids of tasks the new task depends on
    #[serde(default)]
    pub dependencies: Vec<u32>,
}

fn text(body: impl Into<String>) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(body.into())]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    config: Arc<PlanKitConfig>,
}

impl McpHandlers {
    pub fn new(config: Arc<PlanKitConfig>) -> Self {
        Self { config }
    }

    fn generator(&self) -> PlanGenerator {
        PlanGenerator::new(self.config.generator)
    }

    pub async fn parse_plan(&self, Parameters(params): Parameters<ParsePlan>) -> McpResult {
        debug!("parse_plan: {:?}", params.source.path);

        let plan = params.source.load()?;
        if params.json {
            let json = serde_json::to_string_pretty(&plan).map_err(|e| {
                ErrorData::internal_error(format!("Failed to serialize plan: {e}"), None)
            })?;
            return text(json);
        }
        text(plan.to_string())
    }

    pub async fn validate_plan(&self, Parameters(params): Parameters<ValidatePlan>) -> McpResult {
        debug!("validate_plan: {:?}", params.source.path);

        let plan = params.source.load()?;
        let options = params
            .options
            .unwrap_or_else(|| self.config.validation.clone());
        text(validate(&plan, &options).to_string())
    }

    pub async fn format_plan(&self, Parameters(params): Parameters<FormatPlan>) -> McpResult {
        debug!("format_plan: {:?}", params.source.path);

        let plan = params.source.load()?;
        text(to_markdown(&plan))
    }

    pub async fn create_plan(&self, Parameters(params): Parameters<CreatePlan>) -> McpResult {
        debug!("create_plan: {:?}", params);

        let plan = self.generator().create_plan(params.as_ref());
        text(to_markdown(&plan))
    }

    pub async fn list_templates(&self) -> McpResult {
        debug!("list_templates");
        text(TemplateCatalog(list_templates()).to_string())
    }

    pub async fn add_template_task(
        &self,
        Parameters(params): Parameters<AddTemplateTask>,
    ) -> McpResult {
        debug!("add_template_task: {} '{}'", params.template, params.name);

        let mut plan = params.source.load()?;
        let task = core::TemplateTask {
            name: params.name,
            dependencies: params.dependencies,
            ..Default::default()
        };
        if self
            .generator()
            .add_task_from_template(&mut plan, &params.template, &task)
            .is_none()
        {
            return Err(ErrorData::invalid_params(
                format!(
                    "Unknown template '{}'. Use list_templates to see the available ones.",
                    params.template
                ),
                None,
            ));
        }
        text(to_markdown(&plan))
    }

    /// List all available prompts
    pub async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        debug!("list_prompts");

        let prompts = PROMPT_TEMPLATES
            .iter()
            .map(|template| {
                Prompt::new(
                    template.name,
                    Some(template.description),
                    Some(
                        template
                            .arguments
                            .iter()
                            .map(|arg| PromptArgument {
                                name: arg.name.to_string(),
                                description: Some(arg.description.to_string()),
                                required: Some(arg.required),
                            })
                            .collect(),
                    ),
                )
            })
            .collect();

        Ok(ListPromptsResult {
            next_cursor: None,
            prompts,
        })
    }

    /// Get a specific prompt by name and apply arguments
    pub async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        debug!("get_prompt: {}", request.name);

        let template = PROMPT_TEMPLATES
            .iter()
            .find(|t| t.name == request.name)
            .ok_or_else(|| ErrorData::invalid_params("Prompt not found", None))?;

        let mut prompt_text = template.template.to_string();
        for arg in &template.arguments {
            let value = request
                .arguments
                .as_ref()
                .and_then(|args| args.get(arg.name))
                .and_then(|value| value.as_str());
            match value {
                Some(value) => {
                    prompt_text = prompt_text.replace(&format!("{{{}}}", arg.name), value);
                }
                None if arg.required => {
                    return Err(ErrorData::invalid_params(
                        format!("Required argument '{}' is missing", arg.name),
                        None,
                    ));
                }
                None => {
                    prompt_text = prompt_text.replace(&format!("{{{}}}", arg.name), "");
                }
            }
        }

        Ok(GetPromptResult {
            description: Some(template.description.to_string()),
            messages: vec![PromptMessage {
                role: PromptMessageRole::User,
                content: PromptMessageContent::text(prompt_text),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "# Demo\n\n**Goal:** Try it\n\n## Task 1: Only\n\n1. Implement it\n";

    fn handlers() -> McpHandlers {
        McpHandlers::new(Arc::new(PlanKitConfig::default()))
    }

    fn body(result: McpResult) -> String {
        let result = result.unwrap();
        let value = serde_json::to_value(&result).unwrap();
        value["content"][0]["text"].as_str().unwrap().to_string()
    }

    fn inline(content: &str) -> PlanSource {
        PlanSource {
            content: Some(content.to_string()),
            path: None,
        }
    }

    #[tokio::test]
    async fn test_validate_plan_reports() {
        let result = handlers()
            .validate_plan(Parameters(ValidatePlan {
                source: inline(PLAN),
                options: None,
            }))
            .await;
        assert!(body(result).contains("Plan is valid"));
    }

    #[tokio::test]
    async fn test_add_template_task() {
        let result = handlers()
            .add_template_task(Parameters(AddTemplateTask {
                source: inline(PLAN),
                template: "fix-bug".to_string(),
                name: "the crash".to_string(),
                dependencies: vec![1],
            }))
            .await;
        let markdown = body(result);
        assert!(markdown.contains("## Task 2: the crash"));
        assert!(markdown.contains("**Depends on:** 1"));
    }

    #[tokio::test]
    async fn test_unknown_template_is_invalid_params() {
        let result = handlers()
            .add_template_task(Parameters(AddTemplateTask {
                source: inline(PLAN),
                template: "nope".to_string(),
                name: "x".to_string(),
                dependencies: vec![],
            }))
            .await;
        assert!(result.unwrap_err().message.contains("Unknown template 'nope'"));
    }

    #[tokio::test]
    async fn test_missing_source() {
        let result = handlers()
            .format_plan(Parameters(FormatPlan {
                source: PlanSource::default(),
            }))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_source_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.md");
        std::fs::write(&path, PLAN).unwrap();
        let source = PlanSource {
            content: None,
            path: Some(path.display().to_string()),
        };
        assert_eq!(source.load().unwrap().name, "Demo");
    }
}
