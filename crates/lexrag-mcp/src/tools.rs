//! MCP tool definitions and handlers

use crate::protocol::*;
use lexrag_core::{DraftAnswer, FanoutAnswer, LexRagError, QueryService, Result};
use serde_json::Value;

pub const IPC_QUERY: &str = "ipc_query";
pub const PRECEDENT_QUERY: &str = "precedent_query";
pub const DRAFT_DOCUMENT: &str = "draft_document";

fn query_schema(field: &str, description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            field: {
                "type": "string",
                "description": description
            }
        },
        "required": [field]
    })
}

pub fn ipc_query_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: IPC_QUERY.to_string(),
        description: "Answer a question about Indian Penal Code sections. Every configured model answers; failed models return an '[model] error' placeholder".to_string(),
        input_schema: query_schema("query", "Legal question, e.g. 'IPC for murder based on intention?'"),
    }
}

pub fn precedent_query_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: PRECEDENT_QUERY.to_string(),
        description: "Find Indian case law relevant to a question, answered by every configured model".to_string(),
        input_schema: query_schema("query", "Legal question or fact pattern"),
    }
}

pub fn draft_document_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: DRAFT_DOCUMENT.to_string(),
        description: "Draft a legal document (contract, affidavit, notice) with the drafting model".to_string(),
        input_schema: query_schema("question", "What to draft, with the parties and key terms"),
    }
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ipc_query_tool_definition(),
        precedent_query_tool_definition(),
        draft_document_tool_definition(),
    ]
}

/// Dispatch a `tools/call` by name
pub async fn call_tool(service: &QueryService, name: &str, args: Value) -> ToolResult {
    let result = match name {
        IPC_QUERY => handle_ipc_query(service, args).await,
        PRECEDENT_QUERY => handle_precedent_query(service, args).await,
        DRAFT_DOCUMENT => handle_draft_document(service, args).await,
        _ => Err(LexRagError::InvalidInput(format!("Unknown tool: {}", name))),
    };

    match result {
        Ok(tool_result) => tool_result,
        Err(e) => {
            if e.is_client_error() {
                tracing::debug!("Rejected {} call: {}", name, e);
            } else {
                tracing::warn!("Tool {} failed: {}", name, e);
            }
            ToolResult::error(e.to_string(), e.http_status())
        }
    }
}

fn string_arg<'a>(args: &'a Value, field: &str) -> &'a str {
    args.get(field).and_then(|v| v.as_str()).unwrap_or("")
}

pub async fn handle_ipc_query(service: &QueryService, args: Value) -> Result<ToolResult> {
    let answer = service
        .answer_penal_code_query(string_arg(&args, "query"))
        .await?;
    Ok(fanout_result(&answer))
}

pub async fn handle_precedent_query(service: &QueryService, args: Value) -> Result<ToolResult> {
    let answer = service
        .answer_precedent_query(string_arg(&args, "query"))
        .await?;
    Ok(fanout_result(&answer))
}

pub async fn handle_draft_document(service: &QueryService, args: Value) -> Result<ToolResult> {
    let answer = service
        .draft_document(string_arg(&args, "question"))
        .await?;
    Ok(draft_result(&answer))
}

fn fanout_result(answer: &FanoutAnswer) -> ToolResult {
    let mut names: Vec<&String> = answer.answers.keys().collect();
    names.sort();

    let mut summary = String::new();
    for name in names {
        summary.push_str(&format!("## {}\n{}\n\n", name, answer.answers[name]));
    }
    if !answer.retrieved_docs.is_empty() {
        summary.push_str(&format!(
            "Sources: {}\n",
            source_list(answer.retrieved_docs.iter().map(|d| d.filename.as_deref()))
        ));
    }

    ToolResult::success(
        summary,
        serde_json::json!({
            "answers": answer.answers,
            "retrievedDocs": answer.retrieved_docs,
            "usedDocs": answer.used_docs,
            "unusedDocs": answer.unused_docs,
            "httpStatus": 200,
        }),
    )
}

fn draft_result(answer: &DraftAnswer) -> ToolResult {
    ToolResult::success(
        answer.contract.clone(),
        serde_json::json!({
            "contract": answer.contract,
            "retrievedDocs": answer.retrieved_docs,
            "usedDocs": answer.used_docs,
            "unusedDocs": answer.unused_docs,
            "httpStatus": 200,
        }),
    )
}

fn source_list<'a>(filenames: impl Iterator<Item = Option<&'a str>>) -> String {
    filenames
        .map(|f| f.unwrap_or("(unnamed)"))
        .collect::<Vec<_>>()
        .join(", ")
}
