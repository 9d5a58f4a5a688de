//! Config file commands

use crate::app::{ConfigAction, ConfigArgs};
use anyhow::{bail, Result};
use lexrag_core::Config;
use std::path::Path;

pub fn run(args: ConfigArgs, path: &Path) -> Result<()> {
    match args.action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = Config::load_from(path)?;
            config.validate()?;
            print!("{}", config.to_yaml()?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save_to(path)?;
            println!("Wrote default config to {}", path.display());
        }
    }
    Ok(())
}
