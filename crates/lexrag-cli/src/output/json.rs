//! JSON output formatter

use super::FormatOptions;
use lexrag_core::{DraftAnswer, FanoutAnswer};

/// Response body shape of the fan-out endpoints
pub fn format_fanout(answer: &FanoutAnswer, options: &FormatOptions) -> String {
    let mut value = serde_json::json!({ "answers": answer.answers });
    if options.show_docs {
        value["retrieved_docs"] = serde_json::json!(answer.retrieved_docs);
        value["used_docs"] = serde_json::json!(answer.used_docs);
        value["unused_docs"] = serde_json::json!(answer.unused_docs);
    }

    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn format_draft(answer: &DraftAnswer, options: &FormatOptions) -> String {
    let value = if options.show_docs {
        serde_json::json!(answer)
    } else {
        serde_json::json!({ "contract": answer.contract })
    };

    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
