//! egov-laws-mcp - MCP tools for the e-Gov law API
//!
//! Exposes five read-only tools (`list_laws`, `search_laws`, `get_law`,
//! `get_law_revisions`, `get_law_file`) that sanitize caller arguments,
//! forward them to the e-Gov law API v2, and return the JSON it sends back.

pub mod api;
pub mod error;
pub mod protocol;
pub mod tools;

pub use error::{LawsError, Result};
