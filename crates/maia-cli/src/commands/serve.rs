//! `maia serve`: run the MCP server against Postgres.

use anyhow::{Context, Result};
use clap::Args;
use maia_adapter_pg::PostgresPlatform;
use maia_core::Transport;
use maia_mcp::{FeatureComposer, McpServer, Platform, ToolContext};
use std::sync::Arc;
use tracing::info;

use crate::settings::ConfigArgs;

/// Arguments for `maia serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Transport type (stdio or http). Overrides config file.
    #[arg(long)]
    pub transport: Option<Transport>,

    /// HTTP port (only for http transport). Overrides config file.
    #[arg(long)]
    pub port: Option<u16>,

    /// Pin every tool to this project. Overrides config file.
    #[arg(long, env = "MAIA_PROJECT_ID")]
    pub project_id: Option<String>,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = args.config.load()?;
    if let Some(transport) = args.transport {
        config.mcp.transport = transport;
    }
    if let Some(port) = args.port {
        config.mcp.port = port;
    }
    if let Some(project_id) = args.project_id {
        config.project_id = Some(project_id);
    }
    config.validate().context("Invalid configuration")?;

    let groups = config.feature_groups()?;
    let platform: Arc<dyn Platform> = Arc::new(
        PostgresPlatform::from_config(&config).context("Failed to configure Postgres platform")?,
    );

    let context = ToolContext::new(platform.clone(), config.project_id.clone());
    let registry = FeatureComposer::new(context)
        .compose_groups(&groups, config.mode)
        .context("Failed to compose tools")?;

    info!(
        transport = %config.mcp.transport,
        mode = %config.mode,
        project = ?config.project_id,
        tool_count = registry.len(),
        "MCP server starting"
    );

    McpServer::new(config.mcp, registry, platform)
        .run()
        .await
        .context("MCP server failed")?;

    Ok(())
}
