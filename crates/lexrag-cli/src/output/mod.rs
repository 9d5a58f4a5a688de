//! Output formatters

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use lexrag_core::{DraftAnswer, FanoutAnswer};
use std::io;

/// Format options
pub struct FormatOptions {
    /// Include retrieved and used documents
    pub show_docs: bool,
}

/// Print a fan-out answer to stdout
pub fn print_fanout(
    answer: &FanoutAnswer,
    format: OutputFormat,
    options: &FormatOptions,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            print!("{}", json::format_fanout(answer, options));
            Ok(())
        }
        OutputFormat::Md => {
            print!("{}", markdown::format_fanout(answer, options));
            Ok(())
        }
        OutputFormat::Cli => terminal::write_fanout(answer, options),
    }
}

/// Print a drafted document to stdout
pub fn print_draft(
    answer: &DraftAnswer,
    format: OutputFormat,
    options: &FormatOptions,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            print!("{}", json::format_draft(answer, options));
            Ok(())
        }
        OutputFormat::Md => {
            print!("{}", markdown::format_draft(answer, options));
            Ok(())
        }
        OutputFormat::Cli => terminal::write_draft(answer, options),
    }
}

/// Backend names in display order
pub(crate) fn sorted_names(answer: &FanoutAnswer) -> Vec<&str> {
    let mut names: Vec<&str> = answer.answers.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
