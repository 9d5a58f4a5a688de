//! Query commands

use crate::app::{OutputFormat, QueryArgs};
use crate::output::{print_draft, print_fanout, FormatOptions};
use anyhow::Result;
use lexrag_core::{FanoutAnswer, QueryService};

pub async fn run_penal_code(
    args: QueryArgs,
    service: &QueryService,
    format: OutputFormat,
) -> Result<()> {
    let answer = service.answer_penal_code_query(&args.text()).await?;
    report_failures(&answer);
    print_fanout(&answer, format, &options(&args))?;
    Ok(())
}

pub async fn run_precedent(
    args: QueryArgs,
    service: &QueryService,
    format: OutputFormat,
) -> Result<()> {
    let answer = service.answer_precedent_query(&args.text()).await?;
    report_failures(&answer);
    print_fanout(&answer, format, &options(&args))?;
    Ok(())
}

pub async fn run_draft(args: QueryArgs, service: &QueryService, format: OutputFormat) -> Result<()> {
    let answer = service.draft_document(&args.text()).await?;
    print_draft(&answer, format, &options(&args))?;
    Ok(())
}

fn options(args: &QueryArgs) -> FormatOptions {
    FormatOptions {
        show_docs: args.show_docs,
    }
}

fn report_failures(answer: &FanoutAnswer) {
    let failed = answer.results.values().filter(|r| !r.succeeded).count();
    if failed > 0 {
        eprintln!(
            "Warning: {} of {} backends failed",
            failed,
            answer.answers.len()
        );
    }
}
