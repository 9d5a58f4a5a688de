//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lexrag")]
#[command(
    author,
    version,
    about = "Retrieval-augmented answers over Indian legal corpora"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "LEXRAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask every fan-out backend about penal code sections
    Ipc(QueryArgs),

    /// Ask every fan-out backend for relevant case law
    Precedent(QueryArgs),

    /// Draft a legal document with the drafting backend
    Draft(QueryArgs),

    /// List configured generation backends
    Backends,

    /// Inspect or create the config file
    Config(ConfigArgs),

    /// Show local index status
    Status,

    /// Start MCP server
    Mcp,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Query or question text
    pub query: Vec<String>,

    /// Include retrieved documents in the output
    #[arg(long)]
    pub show_docs: bool,
}

impl QueryArgs {
    pub fn text(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration as YAML
    Show,
    /// Write the default configuration to the config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
    Md,
}
