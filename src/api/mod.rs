//! Law API client layer
//!
//! This module provides:
//! - `LawApi` trait, the outbound HTTP seam used by the dispatcher
//! - `HttpLawApi`, the reqwest implementation
//! - `MockLawApi`, a recording stub for tests

pub mod client;
pub mod mock;

pub use client::{HttpLawApi, DEFAULT_BASE_URL};
pub use mock::MockLawApi;

use async_trait::async_trait;

use crate::error::{LawsError, Result};
use crate::tools::OutboundRequest;

/// Longest error body echoed back to callers
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Raw response from the law API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// A 200 response with a JSON body
    pub fn json(body: &serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: serde_json::to_vec(body).unwrap_or_default(),
        }
    }

    /// A 200 response with arbitrary bytes
    pub fn bytes(body: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            status: 200,
            content_type: content_type.map(String::from),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Pass a 2xx response through; anything else becomes `RemoteStatus`
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(LawsError::RemoteStatus {
                status: self.status,
                message: summarize_body(&self.body),
            })
        }
    }
}

/// Short, printable rendering of an error body
fn summarize_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

/// Stateless request/response client for the law API.
///
/// Implementations must report network failures, timeouts and non-2xx
/// statuses as errors.
#[async_trait]
pub trait LawApi: Send + Sync {
    async fn get(&self, request: &OutboundRequest) -> Result<ApiResponse>;
}
