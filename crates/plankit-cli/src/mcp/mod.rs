//! MCP server implementation for PlanKit
//!
//! Exposes plan parsing, validation, formatting and template-based
//! generation as Model Context Protocol tools over stdio. The server is
//! stateless: every tool call carries its plan as inline markdown or a path.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use log::{debug, error, info};
use plankit_core::PlanKitConfig;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{
        GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use tokio::signal::unix::{SignalKind, signal};

pub mod errors;
pub mod handlers;
pub mod prompts;

pub use handlers::{AddTemplateTask, CreatePlan, FormatPlan, McpResult, ParsePlan, ValidatePlan};

/// MCP server for PlanKit
#[derive(Clone)]
pub struct PlanKitMcpServer {
    config: Arc<PlanKitConfig>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PlanKitMcpServer {
    pub fn new(config: PlanKitConfig) -> Self {
        Self {
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(Arc::clone(&self.config))
    }

    #[tool(
        name = "parse_plan",
        description = "Parse a markdown implementation plan and return its structure: metadata, tasks with their status, steps and dependencies. Pass the plan as 'content' or a file 'path'. Set json=true for the full parsed plan as JSON."
    )]
    async fn parse_plan(&self, params: Parameters<ParsePlan>) -> McpResult {
        self.handlers().parse_plan(params).await
    }

    #[tool(
        name = "validate_plan",
        description = "Check a plan for structural problems: missing goal or steps, oversized tasks, missing tests or commits, unknown or circular dependencies. Returns issues grouped by severity with suggestions, plus statistics. Optional 'options' override the validation thresholds."
    )]
    async fn validate_plan(&self, params: Parameters<ValidatePlan>) -> McpResult {
        self.handlers().validate_plan(params).await
    }

    #[tool(
        name = "format_plan",
        description = "Rewrite a plan as canonical markdown. Parsing the output yields the same plan, so use this to normalise hand-written plans before saving them."
    )]
    async fn format_plan(&self, params: Parameters<FormatPlan>) -> McpResult {
        self.handlers().format_plan(params).await
    }

    #[tool(
        name = "create_plan",
        description = "Create an empty plan from a name and goal, with optional architecture, tech_stack, version, author and design_doc. Returns the plan markdown; add tasks with add_template_task."
    )]
    async fn create_plan(&self, params: Parameters<CreatePlan>) -> McpResult {
        self.handlers().create_plan(params).await
    }

    #[tool(
        name = "list_templates",
        description = "List the built-in task templates (such as fix-bug, add-feature, refactor) with their steps and estimates."
    )]
    async fn list_templates(&self) -> McpResult {
        self.handlers().list_templates().await
    }

    #[tool(
        name = "add_template_task",
        description = "Append a task built from a template to a plan. Provide the plan ('content' or 'path'), the template name, the task name and optional dependency ids. Returns the updated plan markdown; the file at 'path' is not modified."
    )]
    async fn add_template_task(&self, params: Parameters<AddTemplateTask>) -> McpResult {
        self.handlers().add_template_task(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for PlanKitMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "plankit".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"PlanKit works with markdown implementation plans: a goal broken into small tasks, each a numbered list of steps, with dependencies between tasks.

## Core Concepts
- **Plan**: `# Name`, a `**Goal:**` line, optional `## Architecture` and `## Tech Stack` sections
- **Task**: `## Task N: Name` with optional files, estimate, dependencies, tags and priority
- **Step**: a numbered line, optionally followed by a code block, `- Run:` command and `- Expect:` output

## Workflow
1. Start with `create_plan`, or use the `draft_plan` prompt to write one
2. Add common task shapes with `list_templates` and `add_template_task`
3. Check the plan with `validate_plan` and fix every error
4. Normalise it with `format_plan` before saving

Every tool takes the plan as inline `content` or a file `path`; the server never writes files."#.to_string()),
        }
    }

    async fn list_prompts(
        &self,
        request: Option<PaginatedRequestParam>,
        context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        self.handlers().list_prompts(request, context).await
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        self.handlers().get_prompt(request, context).await
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: PlanKitMcpServer) -> Result<()> {
    use rmcp::{ServiceExt, transport::stdio};

    info!("Starting PlanKit MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
