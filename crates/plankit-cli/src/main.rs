//! PlanKit CLI Application
//!
//! Command-line interface for authoring, validating and running markdown
//! implementation plans, and for serving the same operations over MCP.

mod args;
mod cli;
mod mcp;
mod renderer;
mod runner;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{PlanKitMcpServer, run_stdio_server};
use plankit_core::ConfigLoader;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        config,
        no_color,
        command,
    } = Args::parse();

    let config = ConfigLoader::new()
        .with_config_path(config)
        .load()
        .context("Failed to load configuration")?;

    info!("PlanKit started");

    let renderer = TerminalRenderer::new(!no_color);

    match command {
        Parse(args) => Cli::new(config, renderer).parse_plan(&args),
        Validate(args) => Cli::new(config, renderer).validate_plan(&args),
        Run(args) => Cli::new(config, renderer).run_plan(&args).await,
        New(args) => Cli::new(config, renderer).new_plan(&args),
        Fmt(args) => Cli::new(config, renderer).format_plan(&args),
        Merge(args) => Cli::new(config, renderer).merge_plans(&args),
        Templates => {
            Cli::new(config, renderer).list_templates();
            Ok(())
        }
        Serve => {
            info!("Starting PlanKit MCP server");
            run_stdio_server(PlanKitMcpServer::new(config))
                .await
                .context("MCP server failed")
        }
    }
}
