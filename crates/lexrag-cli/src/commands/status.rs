//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use lexrag_core::config::VectorIndexConfig;
use lexrag_core::{Config, Database};

pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let path = match config.vector_index {
        VectorIndexConfig::Sqlite { ref path } => path,
        VectorIndexConfig::Milvus { ref url, .. } => {
            println!("Vector index: Milvus at {}", url);
            return Ok(());
        }
    };

    let db = Database::open(path)?;
    db.initialize()?;
    let stats = db.get_stats()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        _ => {
            println!("Index:           {}", path.display());
            println!("Collections:     {}", stats.collection_count);
            println!("Chunks:          {}", stats.chunk_count);
            for collection in &stats.collections {
                println!();
                println!("{}:", collection.name);
                println!("  Chunks:        {}", collection.chunk_count);
                println!("  Dimensions:    {}", collection.dimensions);
                println!("  Filenames:     {}", if collection.has_filename { "yes" } else { "no" });
            }
        }
    }
    Ok(())
}
