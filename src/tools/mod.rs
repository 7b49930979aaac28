//! Tool System - catalog, request sanitization, and dispatch
//!
//! Leaf-first: the whitelist and identifier resolver feed the request
//! builder; the dispatcher ties them to a `LawApi` and normalizes results.

mod catalog;
mod definition;
mod dispatcher;
pub mod identifier;
mod request;
mod whitelist;

pub use catalog::{LAW_NUM_ERAS, LAW_NUM_TYPES, ToolCatalog};
pub use definition::{SchemaKind, SchemaNode, ToolDefinition, ToolName};
pub use dispatcher::{DEFAULT_FILE_CONTENT_TYPE, Dispatcher, ToolResult};
pub use identifier::{IdentifierSource, ResolvedIdentifier, resolve};
pub use request::{DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT, OutboundRequest, ResponseKind, build};
pub use whitelist::ParameterWhitelist;

/// Caller-supplied tool arguments
pub type ArgumentBag = serde_json::Map<String, serde_json::Value>;
