//! MCP server implementation
//!
//! Each request line is handled on its own task, so a slow fan-out does not
//! hold up other calls. Responses flow through one channel to a single writer
//! and are written whole, one per line.

use crate::protocol::*;
use crate::tools;
use anyhow::Result;
use lexrag_core::QueryService;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub struct McpServer {
    service: Arc<QueryService>,
}

impl McpServer {
    pub fn new(service: Arc<QueryService>) -> Self {
        Self { service }
    }

    /// Serve over stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = BufWriter::new(tokio::io::stdout());
        self.serve(reader, writer).await
    }

    /// Serve newline-delimited JSON-RPC over any reader/writer pair
    ///
    /// Returns once the reader is exhausted and every in-flight request has
    /// been answered.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut in_flight = JoinSet::new();
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    let response =
                        JsonRpcResponse::error(None, PARSE_ERROR, &format!("Parse error: {}", e));
                    let _ = tx.send(response);
                    continue;
                }
            };

            if request.is_notification() {
                tracing::debug!("Notification {}", request.method);
                continue;
            }

            let service = Arc::clone(&self.service);
            let tx = tx.clone();
            in_flight.spawn(async move {
                let response = handle_request(&service, &request).await;
                let _ = tx.send(response);
            });

            // Reap finished tasks so the set does not grow with every request
            while in_flight.try_join_next().is_some() {}
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Request task failed: {}", e);
            }
        }

        drop(tx);
        writer_task.await??;
        Ok(())
    }
}

async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    mut writer: W,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut json = serde_json::to_string(&response)?;
        json.push('\n');
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

async fn handle_request(service: &QueryService, request: &JsonRpcRequest) -> JsonRpcResponse {
    match request.method.as_str() {
        "initialize" => handle_initialize(request),
        "ping" => JsonRpcResponse::success(request.id.clone(), serde_json::json!({})),
        "tools/list" => handle_tools_list(request),
        "tools/call" => handle_tools_call(service, request).await,
        _ => JsonRpcResponse::error(
            request.id.clone(),
            METHOD_NOT_FOUND,
            &format!("Method not found: {}", request.method),
        ),
    }
}

fn handle_initialize(request: &JsonRpcRequest) -> JsonRpcResponse {
    let result = serde_json::json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": "lexrag",
            "version": env!("CARGO_PKG_VERSION")
        }
    });
    JsonRpcResponse::success(request.id.clone(), result)
}

fn handle_tools_list(request: &JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::success(
        request.id.clone(),
        serde_json::json!({ "tools": tools::tool_definitions() }),
    )
}

async fn handle_tools_call(service: &QueryService, request: &JsonRpcRequest) -> JsonRpcResponse {
    let name = request
        .params
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let arguments = request
        .params
        .get("arguments")
        .cloned()
        .unwrap_or(serde_json::json!({}));

    let result = tools::call_tool(service, name, arguments).await;

    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
        Err(e) => JsonRpcResponse::error(
            request.id.clone(),
            INTERNAL_ERROR,
            &format!("Internal error: {}", e),
        ),
    }
}

pub async fn start_server(service: Arc<QueryService>) -> Result<()> {
    tracing::info!("MCP server ready on stdio");
    let server = McpServer::new(service);
    server.run().await
}
