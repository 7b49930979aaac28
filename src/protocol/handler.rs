//! Request routing for the MCP host

use std::future::Future;
use std::sync::Arc;

use serde_json::{Value, json};

use super::messages::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, Methods, ServerInfo,
};
use crate::tools::{ArgumentBag, Dispatcher};

/// Handler trait for processing requests
pub trait RequestHandler: Send + Sync {
    /// Handle a request; notifications yield no response
    fn handle(&self, request: JsonRpcRequest) -> impl Future<Output = Option<JsonRpcResponse>> + Send;
}

/// Serves the law tools over MCP
pub struct McpHandler {
    dispatcher: Arc<Dispatcher>,
    server_info: ServerInfo,
    instructions: Option<String>,
}

impl McpHandler {
    pub fn new(dispatcher: Arc<Dispatcher>, server_info: ServerInfo) -> Self {
        Self {
            dispatcher,
            server_info,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    fn initialize(&self, params: Value) -> Value {
        let params: InitializeParams = serde_json::from_value(params).unwrap_or_default();
        let result = InitializeResult::negotiate(
            params.protocol_version.as_deref(),
            self.server_info.clone(),
            self.instructions.clone(),
        );
        log::info!(
            "Client initialized with protocol {}",
            result.protocol_version
        );
        to_value(&result)
    }

    fn list_tools(&self) -> Value {
        to_value(&ListToolsResult {
            tools: self.dispatcher.list_tools(),
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)))?;
        let args: ArgumentBag = params.arguments.unwrap_or_default();

        log::info!("CALL {}", params.name);
        let result = self.dispatcher.dispatch(&params.name, &args).await;
        Ok(to_value(&CallToolResult::text(result.to_text())))
    }
}

impl RequestHandler for McpHandler {
    fn handle(&self, request: JsonRpcRequest) -> impl Future<Output = Option<JsonRpcResponse>> + Send {
        async move {
            let Some(id) = request.id else {
                log::debug!("Notification {}", request.method);
                return None;
            };

            let outcome = match request.method.as_str() {
                Methods::INITIALIZE => Ok(self.initialize(request.params)),
                Methods::PING => Ok(json!({})),
                Methods::TOOLS_LIST => Ok(self.list_tools()),
                Methods::TOOLS_CALL => self.call_tool(request.params).await,
                other => {
                    log::warn!("Unknown method: {}", other);
                    Err(JsonRpcError::method_not_found(other))
                }
            };

            Some(match outcome {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(error) => JsonRpcResponse::error(id, error),
            })
        }
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
