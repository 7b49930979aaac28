//! Tool dispatch and response normalization
//!
//! The dispatcher is the only place where a `LawsError` becomes a payload.
//! Every call completes with a `ToolResult`; nothing propagates to the
//! protocol layer.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use serde_json::{Map, Value, json};

use crate::api::{ApiResponse, LawApi};
use crate::error::{LawsError, Result};

use super::catalog::ToolCatalog;
use super::definition::ToolDefinition;
use super::request::{self, OutboundRequest, ResponseKind};
use super::whitelist::ParameterWhitelist;

/// Content type assumed when the law API omits one
pub const DEFAULT_FILE_CONTENT_TYPE: &str = "application/json";

/// Outcome of one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Value),
    Failure(String),
}

impl ToolResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Caller-visible JSON: the success value itself, or `{"error": message}`
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Success(value) => value.clone(),
            Self::Failure(message) => json!({ "error": message }),
        }
    }

    /// Payload rendered as the single text block sent to the client
    pub fn to_text(&self) -> String {
        serde_json::to_string_pretty(&self.to_payload()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<Result<Value>> for ToolResult {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) => Self::Failure(e.to_string()),
        }
    }
}

/// Routes tool calls to the law API
pub struct Dispatcher {
    catalog: Arc<ToolCatalog>,
    whitelist: Arc<ParameterWhitelist>,
    api: Arc<dyn LawApi>,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher over the standard catalog and whitelist
    pub fn new(api: Arc<dyn LawApi>, timeout: Duration) -> Self {
        Self::with_tables(
            Arc::new(ToolCatalog::standard()),
            Arc::new(ParameterWhitelist::standard()),
            api,
            timeout,
        )
    }

    /// Create a dispatcher with explicit tables
    pub fn with_tables(
        catalog: Arc<ToolCatalog>,
        whitelist: Arc<ParameterWhitelist>,
        api: Arc<dyn LawApi>,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            whitelist,
            api,
            timeout,
        }
    }

    pub fn list_tools(&self) -> &[ToolDefinition] {
        self.catalog.list()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one tool call to completion
    pub async fn dispatch(&self, name: &str, args: &Map<String, Value>) -> ToolResult {
        let result = self.invoke(name, args).await;
        match &result {
            Ok(_) => log::info!("{} completed", name),
            Err(e) if e.is_transport_failure() => log::warn!("{} failed talking to law API: {}", name, e),
            Err(e) => log::info!("{} rejected: {}", name, e),
        }
        result.into()
    }

    async fn invoke(&self, name: &str, args: &Map<String, Value>) -> Result<Value> {
        let definition = self
            .catalog
            .get(name)
            .ok_or_else(|| LawsError::UnknownTool(name.to_string()))?;

        let request = request::build(definition.tool, args, &self.whitelist)?;
        let response = self.fetch(&request).await?;

        match &request.response {
            ResponseKind::Json => decode_json(&response),
            ResponseKind::File { filename } => Ok(file_payload(filename, &response)),
        }
    }

    async fn fetch(&self, request: &OutboundRequest) -> Result<ApiResponse> {
        let response = match tokio::time::timeout(self.timeout, self.api.get(request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(LawsError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                });
            }
        };
        // Not every LawApi checks the status itself
        response.into_result()
    }
}

fn decode_json(response: &ApiResponse) -> Result<Value> {
    serde_json::from_slice(&response.body).map_err(|e| LawsError::Decode(e.to_string()))
}

fn file_payload(filename: &str, response: &ApiResponse) -> Value {
    json!({
        "filename": filename,
        "content_type": response.content_type.as_deref().unwrap_or(DEFAULT_FILE_CONTENT_TYPE),
        "data_base64": Base64.encode(&response.body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockLawApi;
    use crate::api::mock::MockReply;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn dispatcher(api: Arc<MockLawApi>) -> Dispatcher {
        Dispatcher::new(api, Duration::from_secs(5))
    }

    #[test]
    fn test_tool_result_payloads() {
        let ok = ToolResult::Success(json!({"laws": []}));
        assert_eq!(ok.to_payload(), json!({"laws": []}));
        assert!(!ok.is_failure());

        let err = ToolResult::Failure("boom".to_string());
        assert_eq!(err.to_payload(), json!({"error": "boom"}));
        assert!(err.is_failure());
    }

    #[test]
    fn test_to_text_keeps_non_ascii() {
        let text = ToolResult::Success(json!({"law_title": "建築基準法"})).to_text();
        assert!(text.contains("建築基準法"));
        assert!(text.contains("\n  \"law_title\""));
    }

    #[test]
    fn test_from_result() {
        let result: ToolResult = Err::<Value, _>(LawsError::UnknownTool("x".into())).into();
        assert_eq!(result, ToolResult::Failure("Unknown tool name: x".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_soft_error() {
        let api = Arc::new(MockLawApi::new());
        let result = dispatcher(api.clone()).dispatch("get_law_versions", &Map::new()).await;

        let payload = result.to_payload();
        assert!(payload["error"].as_str().unwrap().contains("get_law_versions"));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_json_body_returned_unchanged() {
        let body = json!({"total_count": 1, "laws": [{"law_info": {"law_id": "L1"}}]});
        let api = Arc::new(MockLawApi::always(ApiResponse::json(&body)));
        let result = dispatcher(api.clone())
            .dispatch("get_law", &args(json!({"law_id": "L1"})))
            .await;

        assert_eq!(result, ToolResult::Success(body));
        assert_eq!(api.requests()[0].path(), "/law_data/L1");
    }

    #[tokio::test]
    async fn test_missing_keyword_sends_nothing() {
        let api = Arc::new(MockLawApi::always(ApiResponse::json(&json!({}))));
        let d = dispatcher(api.clone());

        for bag in [json!({}), json!({"keyword": ""})] {
            let result = d.dispatch("search_laws", &args(bag)).await;
            assert!(result.is_failure());
            assert!(result.to_payload()["error"].as_str().unwrap().contains("keyword"));
        }
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_identifier_sends_nothing() {
        let api = Arc::new(MockLawApi::always(ApiResponse::json(&json!({}))));
        let d = dispatcher(api.clone());

        for name in ["get_law", "get_law_file"] {
            let result = d.dispatch(name, &Map::new()).await;
            let message = result.to_payload()["error"].as_str().unwrap().to_string();
            assert!(message.contains("law_id"));
            assert!(message.contains("law_revision_id"));
        }
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_file_payload() {
        let api = Arc::new(MockLawApi::always(ApiResponse::bytes(
            vec![0x7B, 0x7D],
            Some("application/json"),
        )));
        let result = dispatcher(api.clone())
            .dispatch("get_law_file", &args(json!({"law_revision_id": "R1", "law_id": "L1"})))
            .await;

        let payload = result.to_payload();
        assert_eq!(payload["filename"], "R1.json");
        assert_eq!(payload["content_type"], "application/json");
        let decoded = Base64.decode(payload["data_base64"].as_str().unwrap()).unwrap();
        assert_eq!(decoded, vec![0x7B, 0x7D]);
        assert_eq!(api.requests()[0].path(), "/law_file/json/R1");
    }

    #[tokio::test]
    async fn test_file_payload_default_content_type() {
        let api = Arc::new(MockLawApi::always(ApiResponse::bytes(b"not json".to_vec(), None)));
        let result = dispatcher(api)
            .dispatch("get_law_file", &args(json!({"law_num": "N1"})))
            .await;

        let payload = result.to_payload();
        assert_eq!(payload["content_type"], DEFAULT_FILE_CONTENT_TYPE);
        assert_eq!(payload["filename"], "N1.json");
    }

    #[tokio::test]
    async fn test_remote_status_becomes_payload() {
        let api = Arc::new(MockLawApi::failing(404, "no such law"));
        let result = dispatcher(api)
            .dispatch("get_law_revisions", &args(json!({"law_id": "L1"})))
            .await;
        assert_eq!(
            result.to_payload(),
            json!({"error": "Remote API returned 404: no such law"})
        );
    }

    #[tokio::test]
    async fn test_non_success_response_becomes_payload() {
        let api = Arc::new(MockLawApi::always(ApiResponse {
            status: 503,
            content_type: None,
            body: b"busy".to_vec(),
        }));
        let result = dispatcher(api).dispatch("list_laws", &Map::new()).await;
        assert_eq!(result, ToolResult::Failure("Remote API returned 503: busy".to_string()));
    }

    #[tokio::test]
    async fn test_remote_key_order_is_kept() {
        let api = Arc::new(MockLawApi::always(ApiResponse::bytes(
            br#"{"zeta":1,"alpha":2,"mid":{"y":1,"b":2}}"#.to_vec(),
            Some("application/json"),
        )));
        let text = dispatcher(api).dispatch("list_laws", &Map::new()).await.to_text();

        let zeta = text.find("\"zeta\"").unwrap();
        let alpha = text.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
        assert!(text.find("\"y\"").unwrap() < text.find("\"b\"").unwrap());
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_failure() {
        let api = Arc::new(MockLawApi::always(ApiResponse::bytes(b"<html>".to_vec(), Some("text/html"))));
        let result = dispatcher(api).dispatch("list_laws", &Map::new()).await;
        assert!(
            result.to_payload()["error"]
                .as_str()
                .unwrap()
                .starts_with("Failed to decode response")
        );
    }

    #[tokio::test]
    async fn test_timeout_becomes_payload() {
        let api = Arc::new(MockLawApi::new());
        api.push(MockReply::Delay(Duration::from_secs(5), ApiResponse::json(&json!({}))));
        let d = Dispatcher::new(api.clone(), Duration::from_millis(50));

        let result = d.dispatch("list_laws", &Map::new()).await;
        assert_eq!(result, ToolResult::Failure("Request timed out after 50ms".to_string()));
        assert_eq!(api.call_count(), 1);
    }

    #[test]
    fn test_list_tools_exposes_catalog() {
        let d = dispatcher(Arc::new(MockLawApi::new()));
        assert_eq!(d.list_tools().len(), 5);
        assert_eq!(d.timeout(), Duration::from_secs(5));
    }
}
