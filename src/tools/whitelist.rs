//! Per-tool query parameter whitelist
//!
//! The only defense against parameter injection: a key the tool does not list
//! here never reaches the law API. Unlisted keys and null values are dropped
//! silently.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::definition::ToolName;

const LIST_LAWS_PARAMS: &[&str] = &[
    "law_id",
    "law_num",
    "law_num_era",
    "law_num_type",
    "law_title",
    "law_title_kana",
    "amendment_date_from",
    "amendment_date_to",
    "amendment_law_id",
    "amendment_law_num",
    "amendment_law_title",
    "asof",
    "promulgation_date_from",
    "promulgation_date_to",
    "order",
];

const SEARCH_LAWS_PARAMS: &[&str] = &[
    "law_num",
    "law_num_era",
    "law_num_type",
    "law_title",
    "law_title_kana",
    "asof",
    "promulgation_date_from",
    "promulgation_date_to",
    "order",
];

const GET_LAW_REVISIONS_PARAMS: &[&str] = &[
    "law_title",
    "law_title_kana",
    "amendment_date_from",
    "amendment_date_to",
    "amendment_law_id",
    "amendment_law_num",
    "amendment_law_title",
    "amendment_promulgate_date_from",
    "amendment_promulgate_date_to",
    "remain_in_force",
    "repeal_date_from",
    "repeal_date_to",
];

/// Immutable tool name → allowed query keys table
#[derive(Debug, Clone)]
pub struct ParameterWhitelist {
    allowed: HashMap<String, Vec<String>>,
}

impl ParameterWhitelist {
    /// Create an empty whitelist (every key is dropped)
    pub fn new() -> Self {
        Self {
            allowed: HashMap::new(),
        }
    }

    /// The allow-sets accepted by the e-Gov law API v2
    pub fn standard() -> Self {
        Self::new()
            .with_tool(ToolName::ListLaws.as_str(), LIST_LAWS_PARAMS)
            .with_tool(ToolName::SearchLaws.as_str(), SEARCH_LAWS_PARAMS)
            .with_tool(ToolName::GetLawRevisions.as_str(), GET_LAW_REVISIONS_PARAMS)
    }

    /// Register the allowed keys for a tool, replacing any previous set
    pub fn with_tool(mut self, tool: &str, keys: &[&str]) -> Self {
        let mut ordered: Vec<String> = Vec::with_capacity(keys.len());
        for key in keys {
            if !ordered.iter().any(|k| k == key) {
                ordered.push((*key).to_string());
            }
        }
        self.allowed.insert(tool.to_string(), ordered);
        self
    }

    /// Allowed keys for a tool, in registration order. Unknown tools allow nothing.
    pub fn allowed(&self, tool: &str) -> &[String] {
        self.allowed.get(tool).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_allowed(&self, tool: &str, key: &str) -> bool {
        self.allowed(tool).iter().any(|k| k == key)
    }

    /// Keep only whitelisted, non-null scalar entries of `raw`
    pub fn filter(&self, tool: &str, raw: Option<&Map<String, Value>>) -> Map<String, Value> {
        let Some(raw) = raw else {
            return Map::new();
        };

        let mut kept = Map::new();
        for (key, value) in raw {
            if !self.is_allowed(tool, key) {
                log::debug!("Dropping query parameter '{}' not allowed for {}", key, tool);
                continue;
            }
            if is_forwardable(value) {
                kept.insert(key.clone(), value.clone());
            }
        }
        kept
    }
}

impl Default for ParameterWhitelist {
    fn default() -> Self {
        Self::standard()
    }
}

/// Only scalars can travel as query parameters
fn is_forwardable(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
