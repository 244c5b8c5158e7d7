//! `maia tools`: list the composed tools without touching a database.

use anyhow::{Context, Result};
use clap::Args;

use crate::offline;
use crate::settings::ConfigArgs;

/// Arguments for `maia tools`.
#[derive(Debug, Args)]
pub struct ToolsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Show input schemas.
    #[arg(long)]
    pub verbose: bool,
}

pub fn execute(args: ToolsArgs) -> Result<()> {
    let config = args.config.load()?;
    let registry = offline::compose(&config, config.mode).context("Failed to compose tools")?;

    println!("\n⚙️  Configuration:");
    println!("   Features: {}", config.features.join(", "));
    println!("   Mode: {}", config.mode);
    if let Some(project) = &config.project_id {
        println!("   Pinned project: {}", project);
    }

    println!("\n🔧 Available Tools ({}):", registry.len());

    for tool in registry.list() {
        let mut badges = Vec::new();
        if tool.is_mutation() {
            badges.push("write");
        } else {
            badges.push("read");
        }
        if tool.is_guarded() {
            badges.push("confirm");
        }

        println!("   • {} ({})", tool.name(), badges.join(", "));
        println!("     {}", tool.description());

        if args.verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(tool.input_schema())?
            );
        }
    }

    println!();

    Ok(())
}
