//! MCP stdio host
//!
//! Line-delimited JSON-RPC 2.0 framing, method routing, and the
//! concurrent server loop.

mod codec;
mod handler;
mod messages;
mod server;

pub use handler::{McpHandler, RequestHandler};
pub use messages::{
    CallToolParams, CallToolResult, ErrorCode, InitializeParams, InitializeResult, JSONRPC_VERSION,
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, LATEST_PROTOCOL_VERSION, ListToolsResult, Methods,
    SUPPORTED_PROTOCOL_VERSIONS, ServerInfo, TextContent,
};
pub use server::{McpServer, ServerConfig};
