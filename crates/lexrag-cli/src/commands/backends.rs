//! Backend listing

use crate::app::OutputFormat;
use anyhow::Result;
use lexrag_core::config::DraftingProvider;
use lexrag_core::Config;

pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let provider = match config.drafting.provider {
        DraftingProvider::Gemini { .. } => "gemini",
        DraftingProvider::Openai { .. } => "openai",
        DraftingProvider::Ollama { .. } => "ollama",
    };

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "fanout": {
                    "ollama_url": config.fanout.ollama_url,
                    "timeout_secs": config.fanout.timeout_secs,
                    "backends": config.fanout.backends,
                },
                "drafting": {
                    "provider": provider,
                    "model": config.drafting.provider.model(),
                },
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Md => {
            println!("# Backends\n");
            println!("| Name | Model |");
            println!("|------|-------|");
            for entry in &config.fanout.backends {
                println!("| {} | `{}` |", entry.name, entry.model);
            }
            println!(
                "\n**Drafting**: {} `{}`",
                provider,
                config.drafting.provider.model()
            );
        }
        OutputFormat::Cli => {
            println!("Fan-out ({}):", config.fanout.ollama_url);
            for entry in &config.fanout.backends {
                println!("  {:<16} {}", entry.name, entry.model);
            }
            println!();
            println!(
                "Drafting:  {} ({})",
                config.drafting.provider.model(),
                provider
            );
        }
    }
    Ok(())
}
