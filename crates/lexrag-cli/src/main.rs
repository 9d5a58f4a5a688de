//! LexRAG CLI
//!
//! Legal question answering with multi-model fan-out.

use anyhow::Result;
use clap::Parser;
use lexrag_core::error::exit_codes;
use lexrag_core::{Config, LexRagError, QueryService};
use std::path::Path;
use std::sync::Arc;

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; stderr keeps stdout clean for results and MCP
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    match cli.command {
        Commands::Config(args) => commands::config::run(args, &config_path),
        Commands::Backends => {
            let config = Config::load_from(&config_path)?;
            commands::backends::run(&config, cli.format)
        }
        Commands::Status => {
            let config = Config::load_from(&config_path)?;
            commands::status::run(&config, cli.format)
        }
        Commands::Ipc(args) => {
            let service = build_service(&config_path)?;
            commands::query::run_penal_code(args, &service, cli.format).await
        }
        Commands::Precedent(args) => {
            let service = build_service(&config_path)?;
            commands::query::run_precedent(args, &service, cli.format).await
        }
        Commands::Draft(args) => {
            let service = build_service(&config_path)?;
            commands::query::run_draft(args, &service, cli.format).await
        }
        Commands::Mcp => {
            let service = build_service(&config_path)?;
            lexrag_mcp::start_server(Arc::new(service)).await
        }
    }
}

fn build_service(config_path: &Path) -> Result<QueryService> {
    let config = Config::load_from(config_path)?;
    Ok(QueryService::from_config(&config)?)
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<LexRagError>()
        .map(LexRagError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
