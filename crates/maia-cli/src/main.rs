use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod offline;
mod settings;

#[derive(Parser, Debug)]
#[command(name = "maia", version, about = "Maia MCP server")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server.
    Serve(commands::serve::ServeArgs),

    /// List the tools the current configuration exposes (offline).
    Tools(commands::tools::ToolsArgs),

    /// Validate the configuration and the tool composition for both modes.
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the stdio transport; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve(args) => commands::serve::execute(args).await,
        Command::Tools(args) => commands::tools::execute(args),
        Command::Check(args) => commands::check::execute(args),
    }
}
