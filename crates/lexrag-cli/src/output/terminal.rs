//! Terminal output formatter

use super::{sorted_names, FormatOptions};
use lexrag_core::fanout::is_diagnostic;
use lexrag_core::{DraftAnswer, FanoutAnswer, RetrievedDocument};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub fn write_fanout(answer: &FanoutAnswer, options: &FormatOptions) -> io::Result<()> {
    let mut out = StandardStream::stdout(ColorChoice::Auto);

    for name in sorted_names(answer) {
        let text = &answer.answers[name];
        let failed = is_diagnostic(text);

        out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(if failed {
            Color::Red
        } else {
            Color::Cyan
        })))?;
        writeln!(out, "== {} ==", name)?;
        out.reset()?;
        writeln!(out, "{}\n", text)?;
    }

    if options.show_docs {
        write_documents(&mut out, &answer.retrieved_docs, &answer.used_docs)?;
    }
    Ok(())
}

pub fn write_draft(answer: &DraftAnswer, options: &FormatOptions) -> io::Result<()> {
    let mut out = StandardStream::stdout(ColorChoice::Auto);
    writeln!(out, "{}", answer.contract)?;

    if options.show_docs {
        writeln!(out)?;
        write_documents(&mut out, &answer.retrieved_docs, &answer.used_docs)?;
    }
    Ok(())
}

fn write_documents(
    out: &mut StandardStream,
    retrieved: &[RetrievedDocument],
    used: &[RetrievedDocument],
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, "Retrieved documents:")?;
    out.reset()?;

    if retrieved.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for doc in retrieved {
        let score_pct = (doc.score * 100.0) as u32;
        let marker = if used.contains(doc) { "*" } else { " " };
        writeln!(
            out,
            " {}{:>3}% {}",
            marker,
            score_pct,
            doc.filename.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}
