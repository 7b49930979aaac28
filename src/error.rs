//! Error types for egov-laws-mcp
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while serving law tools
#[derive(Debug, Error)]
pub enum LawsError {
    /// No usable law or revision locator was supplied
    #[error("{tool} requires one of law_id, law_num or law_revision_id")]
    MissingIdentifier { tool: String },

    /// A required argument is absent or empty
    #[error("{tool} requires a non-empty '{argument}' argument")]
    MissingArgument { tool: String, argument: String },

    /// Arguments present but of the wrong shape
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Tool name not in the catalog
    #[error("Unknown tool name: {0}")]
    UnknownTool(String),

    /// Network-level failure talking to the law API
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Outbound call exceeded its time budget
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Law API answered with a non-2xx status
    #[error("Remote API returned {status}: {message}")]
    RemoteStatus { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LawsError {
    pub fn missing_identifier(tool: impl Into<String>) -> Self {
        Self::MissingIdentifier { tool: tool.into() }
    }

    pub fn missing_argument(tool: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::MissingArgument {
            tool: tool.into(),
            argument: argument.into(),
        }
    }

    pub fn invalid_arguments(tool: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the failure came from talking to the remote API rather than
    /// from the caller's arguments
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout { .. } | Self::RemoteStatus { .. } | Self::Decode(_)
        )
    }
}

/// Result type alias for egov-laws-mcp operations
pub type Result<T> = std::result::Result<T, LawsError>;
