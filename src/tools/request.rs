//! Outbound request construction
//!
//! Turns a tool name and its argument bag into a fully specified
//! `OutboundRequest`. Arguments are deserialized into a typed struct per tool;
//! query parameters pass through the whitelist first.

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{LawsError, Result};

use super::definition::ToolName;
use super::identifier::resolve;
use super::whitelist::ParameterWhitelist;

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// How the response body should be handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    /// Parse as JSON and return unchanged
    Json,
    /// Keep raw bytes and wrap them as a base64 file payload
    File { filename: String },
}

/// A single GET against the law API, relative to the configured base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: Method,
    segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub response: ResponseKind,
}

impl OutboundRequest {
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: Method::GET,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            response: ResponseKind::Json,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_response(mut self, response: ResponseKind) -> Self {
        self.response = response;
        self
    }

    /// Unencoded path segments, e.g. `["law_data", "322CO0000000016"]`
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Display path, e.g. `/law_data/322CO0000000016`
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ListLawsArgs {
    limit: Option<i64>,
    #[serde(rename = "queryParameters")]
    query_parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct SearchLawsArgs {
    keyword: Option<String>,
    limit: Option<i64>,
    #[serde(rename = "queryParameters")]
    query_parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct LawRevisionsArgs {
    law_id: Option<String>,
    #[serde(rename = "queryParameters")]
    query_parameters: Option<Map<String, Value>>,
}

/// Build the outbound request for `tool`.
///
/// Fails without side effects when a required argument or identifier is missing.
pub fn build(tool: ToolName, args: &Map<String, Value>, whitelist: &ParameterWhitelist) -> Result<OutboundRequest> {
    match tool {
        ToolName::ListLaws => {
            let args: ListLawsArgs = parse_args(tool, args)?;
            let request = OutboundRequest::get(["laws"])
                .with_query("limit", args.limit.unwrap_or(DEFAULT_LIST_LIMIT).to_string());
            Ok(append_filtered(request, tool, args.query_parameters.as_ref(), whitelist))
        }

        ToolName::SearchLaws => {
            let args: SearchLawsArgs = parse_args(tool, args)?;
            let keyword = args
                .keyword
                .filter(|k| !k.is_empty())
                .ok_or_else(|| LawsError::missing_argument(tool.as_str(), "keyword"))?;
            let request = OutboundRequest::get(["keyword"])
                .with_query("keyword", keyword)
                .with_query("limit", args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).to_string());
            Ok(append_filtered(request, tool, args.query_parameters.as_ref(), whitelist))
        }

        ToolName::GetLaw => {
            let id = resolve(args, true).ok_or_else(|| LawsError::missing_identifier(tool.as_str()))?;
            log::debug!("{} resolved {} from {}", tool, id.value, id.source.field());
            Ok(OutboundRequest::get(["law_data".to_string(), id.value]))
        }

        ToolName::GetLawRevisions => {
            let args: LawRevisionsArgs = parse_args(tool, args)?;
            let law_id = args
                .law_id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| LawsError::missing_argument(tool.as_str(), "law_id"))?;
            let request = OutboundRequest::get(["law_revisions".to_string(), law_id]);
            Ok(append_filtered(request, tool, args.query_parameters.as_ref(), whitelist))
        }

        ToolName::GetLawFile => {
            let id = resolve(args, true).ok_or_else(|| LawsError::missing_identifier(tool.as_str()))?;
            log::debug!("{} resolved {} from {}", tool, id.value, id.source.field());
            let filename = format!("{}.json", id.value);
            Ok(OutboundRequest::get(["law_file".to_string(), "json".to_string(), id.value])
                .with_response(ResponseKind::File { filename }))
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: ToolName, args: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(args.clone())).map_err(|e| LawsError::invalid_arguments(tool.as_str(), e))
}

fn append_filtered(
    mut request: OutboundRequest,
    tool: ToolName,
    raw: Option<&Map<String, Value>>,
    whitelist: &ParameterWhitelist,
) -> OutboundRequest {
    for (key, value) in whitelist.filter(tool.as_str(), raw) {
        request = request.with_query(key, query_text(&value));
    }
    request
}

fn query_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
