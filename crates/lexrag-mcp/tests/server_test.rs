//! Integration tests for the MCP server over in-memory pipes

use async_trait::async_trait;
use lexrag_core::{
    Database, DecodingOptions, Embedder, FanoutDispatcher, GenerationBackend, LexRagError,
    QueryService, Result, Retriever, ServiceSettings,
};
use lexrag_mcp::McpServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

struct ZeroEmbedder;

#[async_trait]
impl Embedder for ZeroEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "zero"
    }
}

enum Reply {
    Text(&'static str),
    After(Duration, &'static str),
    Down,
}

struct Model {
    id: &'static str,
    reply: Reply,
}

#[async_trait]
impl GenerationBackend for Model {
    async fn generate(&self, _prompt: &str, _options: Option<&DecodingOptions>) -> Result<String> {
        match self.reply {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::After(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text.to_string())
            }
            Reply::Down => Err(LexRagError::ExternalError("connection refused".to_string())),
        }
    }

    fn identifier(&self) -> &str {
        self.id
    }
}

fn service(fanout_reply: Reply, drafter_reply: Reply) -> Arc<QueryService> {
    let db = Database::open_in_memory().unwrap();
    db.initialize().unwrap();
    db.create_collection("IPC_collection", 2, true).unwrap();
    db.insert_chunk(
        "IPC_collection",
        Some("Section 302. Punishment for murder."),
        Some("ipc_302.txt"),
        &[0.0, 0.0],
    )
    .unwrap();
    db.create_collection("Document_Creation_collection", 2, true)
        .unwrap();

    let retriever = Retriever::new(Arc::new(ZeroEmbedder), Arc::new(db));
    let backends: Vec<(String, Arc<dyn GenerationBackend>)> = vec![
        (
            "Llama-3.2-1B".to_string(),
            Arc::new(Model {
                id: "llama3.2:1b",
                reply: fanout_reply,
            }) as Arc<dyn GenerationBackend>,
        ),
        (
            "Phi-2.7B".to_string(),
            Arc::new(Model {
                id: "phi:2.7b",
                reply: Reply::Text("Section 302 applies."),
            }) as Arc<dyn GenerationBackend>,
        ),
    ];
    let dispatcher =
        FanoutDispatcher::new(backends, DecodingOptions::default(), Duration::from_secs(500))
            .unwrap();
    let drafter = Arc::new(Model {
        id: "gemini-2.0-flash-exp",
        reply: drafter_reply,
    });

    Arc::new(QueryService::new(
        retriever,
        dispatcher,
        drafter,
        ServiceSettings::default(),
    ))
}

/// Feed `lines` to the server and collect its responses in write order
async fn exchange(service: Arc<QueryService>, lines: &[Value]) -> Vec<Value> {
    let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
    exchange_raw(service, &input).await
}

async fn exchange_raw(service: Arc<QueryService>, input: &str) -> Vec<Value> {
    let (writer, mut output) = tokio::io::duplex(1 << 20);
    let server = McpServer::new(service);
    server.serve(input.as_bytes(), writer).await.unwrap();

    let mut raw = String::new();
    output.read_to_string(&mut raw).await.unwrap();
    raw.lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn request(id: u64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
    request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let responses = exchange(
        service(Reply::Text("a"), Reply::Text("b")),
        &[
            request(1, "initialize", json!({})),
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            request(2, "tools/list", json!({})),
        ],
    )
    .await;

    // The notification gets no response
    assert_eq!(responses.len(), 2);

    let init = responses.iter().find(|r| r["id"] == 1).unwrap();
    assert_eq!(init["result"]["serverInfo"]["name"], "lexrag");

    let list = responses.iter().find(|r| r["id"] == 2).unwrap();
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["ipc_query", "precedent_query", "draft_document"]);
}

#[tokio::test]
async fn test_protocol_errors() {
    let input = format!(
        "{}\nnot json\n",
        request(7, "resources/list", json!({}))
    );
    let responses = exchange_raw(service(Reply::Text("a"), Reply::Text("b")), &input).await;

    assert_eq!(responses.len(), 2);
    let unknown = responses.iter().find(|r| r["id"] == 7).unwrap();
    assert_eq!(unknown["error"]["code"], -32601);
    let parse = responses.iter().find(|r| r["id"].is_null()).unwrap();
    assert_eq!(parse["error"]["code"], -32700);
}

#[tokio::test]
async fn test_ipc_query_returns_every_backend() {
    let responses = exchange(
        service(Reply::Text("Section 302. Punishment for murder. applies"), Reply::Text("b")),
        &[tool_call(3, "ipc_query", json!({ "query": "IPC for murder based on intention?" }))],
    )
    .await;

    let result = &responses[0]["result"];
    assert!(result.get("isError").is_none());
    let structured = &result["structuredContent"];
    assert_eq!(structured["httpStatus"], 200);
    assert_eq!(structured["answers"].as_object().unwrap().len(), 2);
    assert_eq!(structured["answers"]["Phi-2.7B"], "Section 302 applies.");
    assert_eq!(structured["retrievedDocs"].as_array().unwrap().len(), 1);
    assert_eq!(structured["retrievedDocs"][0]["filename"], "ipc_302.txt");
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("## Phi-2.7B"));
}

#[tokio::test]
async fn test_failed_backend_is_a_diagnostic_not_an_error() {
    let responses = exchange(
        service(Reply::Down, Reply::Text("b")),
        &[tool_call(4, "ipc_query", json!({ "query": "theft" }))],
    )
    .await;

    let structured = &responses[0]["result"]["structuredContent"];
    assert_eq!(structured["httpStatus"], 200);
    assert!(structured["answers"]["Llama-3.2-1B"]
        .as_str()
        .unwrap()
        .starts_with("[llama3.2:1b] error – "));
}

#[tokio::test]
async fn test_empty_query_is_client_error() {
    let responses = exchange(
        service(Reply::Text("a"), Reply::Text("b")),
        &[
            tool_call(5, "ipc_query", json!({ "query": "" })),
            tool_call(6, "draft_document", json!({})),
        ],
    )
    .await;

    for response in &responses {
        let result = &response["result"];
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["httpStatus"], 400);
    }
}

#[tokio::test]
async fn test_drafting_failure_is_server_error() {
    let responses = exchange(
        service(Reply::Text("a"), Reply::Down),
        &[tool_call(8, "draft_document", json!({ "question": "Draft a rental agreement" }))],
    )
    .await;

    let result = &responses[0]["result"];
    assert_eq!(result["isError"], true);
    assert_eq!(result["structuredContent"]["httpStatus"], 500);
}

#[tokio::test]
async fn test_draft_document_returns_contract() {
    let responses = exchange(
        service(Reply::Text("a"), Reply::Text("RENTAL AGREEMENT")),
        &[tool_call(9, "draft_document", json!({ "question": "Draft a rental agreement" }))],
    )
    .await;

    let structured = &responses[0]["result"]["structuredContent"];
    assert_eq!(structured["contract"], "RENTAL AGREEMENT");
    assert_eq!(structured["httpStatus"], 200);
}

#[tokio::test(start_paused = true)]
async fn test_slow_request_does_not_block_others() {
    let responses = exchange(
        service(
            Reply::After(Duration::from_secs(30), "slow answer"),
            Reply::Text("b"),
        ),
        &[
            tool_call(10, "ipc_query", json!({ "query": "murder" })),
            request(11, "ping", json!({})),
        ],
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 11);
    assert_eq!(responses[1]["id"], 10);
    assert_eq!(
        responses[1]["result"]["structuredContent"]["answers"]["Llama-3.2-1B"],
        "slow answer"
    );
}
