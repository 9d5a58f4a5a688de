//! Markdown output formatter

use super::{sorted_names, FormatOptions};
use lexrag_core::{DraftAnswer, FanoutAnswer, RetrievedDocument};

pub fn format_fanout(answer: &FanoutAnswer, options: &FormatOptions) -> String {
    let mut output = String::from("# Answers\n\n");

    for name in sorted_names(answer) {
        output.push_str(&format!("## {}\n\n", name));
        output.push_str(&answer.answers[name]);
        output.push_str("\n\n---\n\n");
    }

    if options.show_docs {
        push_documents(&mut output, "Retrieved Documents", &answer.retrieved_docs);
        push_documents(&mut output, "Used Documents", &answer.used_docs);
    }

    output
}

pub fn format_draft(answer: &DraftAnswer, options: &FormatOptions) -> String {
    let mut output = String::from("# Draft\n\n");
    output.push_str(&answer.contract);
    output.push_str("\n\n");

    if options.show_docs {
        push_documents(&mut output, "Retrieved Documents", &answer.retrieved_docs);
        push_documents(&mut output, "Used Documents", &answer.used_docs);
    }

    output
}

fn push_documents(output: &mut String, heading: &str, docs: &[RetrievedDocument]) {
    output.push_str(&format!("## {}\n\n", heading));
    if docs.is_empty() {
        output.push_str("*None*\n\n");
        return;
    }
    for (i, doc) in docs.iter().enumerate() {
        output.push_str(&format!(
            "{}. `{}` (Score: {:.4})\n",
            i + 1,
            doc.filename.as_deref().unwrap_or("-"),
            doc.score
        ));
    }
    output.push('\n');
}
