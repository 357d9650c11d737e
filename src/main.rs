// Citewright - statement drafting backend
// Main entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use citewright::config::{load_config, load_config_from};
use citewright::server::ApiServer;

#[derive(Debug, Parser)]
#[command(name = "citewright", about = "LLM-backed statement drafting service")]
struct Args {
    /// Path to the config file (default: ~/.citewright/config.toml)
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Bind address override (e.g. "0.0.0.0:8300")
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    ApiServer::new(config).serve().await
}
