//! MCP server implementation.
//!
//! Dispatches JSON-RPC requests to the composed tool registry. The registry,
//! platform and configuration are immutable and shared, so requests can be
//! served concurrently.

use std::sync::Arc;

use maia_core::{McpConfig, Transport};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::descriptor::ToolOutput;
use crate::error::{McpError, ToolError};
use crate::http_transport::HttpServer;
use crate::platform::{Platform, SessionInfo};
use crate::protocol::*;
use crate::registry::ToolRegistry;

/// The MCP server.
#[derive(Clone)]
pub struct McpServer {
    config: McpConfig,
    tools: Arc<ToolRegistry>,
    platform: Arc<dyn Platform>,
}

impl McpServer {
    /// Create a server over a composed registry.
    pub fn new(config: McpConfig, tools: ToolRegistry, platform: Arc<dyn Platform>) -> Self {
        Self {
            config,
            tools: Arc::new(tools),
            platform,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    /// Start the MCP server on the configured transport.
    pub async fn run(self) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => {
                let addr = self.config.bind_addr();
                HttpServer::new(addr, Arc::new(self)).run().await
            }
        }
    }

    /// Run the server with stdio transport (one JSON-RPC message per line).
    async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!(tools = self.tools.len(), "Starting MCP server with stdio transport");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Unparseable request");
                    Some(JsonRpcResponse::error(
                        None,
                        codes::PARSE_ERROR,
                        format!("Parse error: {e}"),
                    ))
                }
            };

            if let Some(response) = response {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                stdout.write_all(&out).await?;
                stdout.flush().await?;
            }
        }

        tracing::info!("stdin closed, stopping MCP server");
        Ok(())
    }

    /// Handle a JSON-RPC request. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params).await,
            "initialized" | "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    async fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        let session = SessionInfo {
            client_name: params.client_info.as_ref().map(|c| c.name.clone()),
            client_version: params.client_info.as_ref().map(|c| c.version.clone()),
            protocol_version: params.protocol_version,
        };

        if let Err(e) = self.platform.init(&session).await {
            tracing::warn!(error = %e, "Platform init failed, continuing");
        }
        tracing::info!(client = ?session.client_name, "Client initialized");

        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": ServerInfo {
                name: "maia-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ListToolsResponse {
            tools: self.tools.definitions(),
        };
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, codes::INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        codes::INVALID_PARAMS,
                        format!("Invalid params: {e}"),
                    );
                }
            },
            None => return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing params"),
        };

        let Some(tool) = self.tools.get(&params.name) else {
            return JsonRpcResponse::error(
                id,
                codes::INVALID_PARAMS,
                format!("Tool not found: {}", params.name),
            );
        };

        tracing::info!(tool = %params.name, "Calling tool");
        let result = tool.invoke(params.arguments).await;
        if let Err(e) = &result {
            tracing::warn!(tool = %params.name, kind = e.kind(), error = %e, "Tool call failed");
        }

        match serde_json::to_value(tool_response(result)) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, codes::INTERNAL_ERROR, e.to_string()),
        }
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}

/// Map a tool result onto the MCP call-tool response.
fn tool_response(result: Result<ToolOutput, ToolError>) -> CallToolResponse {
    match result {
        Ok(output) => {
            let body = serde_json::to_string_pretty(&output.data).unwrap_or_default();
            CallToolResponse {
                content: vec![ToolContent::Text {
                    text: format!("{}\n\n{}", output.summary, body),
                }],
                structured_content: Some(output.data),
                is_error: Some(false),
            }
        }
        Err(err) => CallToolResponse {
            content: vec![ToolContent::Text {
                text: format!("{}: {}", err.kind(), err),
            }],
            structured_content: Some(err.to_json()),
            is_error: Some(true),
        },
    }
}
