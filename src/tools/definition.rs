//! Tool definitions and input contracts
//!
//! A `ToolDefinition` pairs a routable `ToolName` with the JSON-Schema-shaped
//! contract advertised to clients in `tools/list`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// The tools this server knows how to route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListLaws,
    SearchLaws,
    GetLaw,
    GetLawRevisions,
    GetLawFile,
}

impl ToolName {
    /// Every routable tool, in catalog order
    pub const ALL: [ToolName; 5] = [
        Self::ListLaws,
        Self::SearchLaws,
        Self::GetLaw,
        Self::GetLawRevisions,
        Self::GetLawFile,
    ];

    /// Wire name used in `tools/call`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListLaws => "list_laws",
            Self::SearchLaws => "search_laws",
            Self::GetLaw => "get_law",
            Self::GetLawRevisions => "get_law_revisions",
            Self::GetLawFile => "get_law_file",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Integer,
    Boolean,
    Object,
}

/// Recursive description of an accepted argument shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    kind: SchemaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_properties"
    )]
    properties: Option<Vec<(String, SchemaNode)>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    required: Vec<String>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    additional_properties: Option<bool>,
}

/// Properties keep declaration order on the wire
fn serialize_properties<S>(
    properties: &Option<Vec<(String, SchemaNode)>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let properties = properties.as_deref().unwrap_or_default();
    let mut map = serializer.serialize_map(Some(properties.len()))?;
    for (name, node) in properties {
        map.serialize_entry(name, node)?;
    }
    map.end()
}

impl SchemaNode {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            format: None,
            enum_values: None,
            default: None,
            properties: None,
            required: Vec::new(),
            additional_properties: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String)
    }

    pub fn integer() -> Self {
        Self::of(SchemaKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    /// An object node with an empty property map
    pub fn object() -> Self {
        Self {
            properties: Some(Vec::new()),
            ..Self::of(SchemaKind::Object)
        }
    }

    /// A `date`-formatted string node
    pub fn date(description: impl Into<String>) -> Self {
        Self::string().with_format("date").with_description(description)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Add a nested property. Turns the node into an object node.
    pub fn with_property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.kind = SchemaKind::Object;
        self.properties.get_or_insert_with(Vec::new).push((name.into(), node));
        self
    }

    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Reject keys not listed in `properties`
    pub fn deny_unknown_keys(mut self) -> Self {
        self.additional_properties = Some(false);
        self
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn enum_values(&self) -> Option<&[String]> {
        self.enum_values.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn rejects_unknown_keys(&self) -> bool {
        self.additional_properties == Some(false)
    }

    /// Look up a direct child property
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .as_ref()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    /// Names of direct child properties, in declaration order
    pub fn property_names(&self) -> Vec<&str> {
        self.properties
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A tool as advertised to protocol clients
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(skip)]
    pub tool: ToolName,
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_contract: SchemaNode,
}

impl ToolDefinition {
    /// Create a definition with an empty object contract
    pub fn new(tool: ToolName, description: impl Into<String>) -> Self {
        Self {
            tool,
            name: tool.as_str().to_string(),
            description: description.into(),
            input_contract: SchemaNode::object(),
        }
    }

    /// Set input contract
    pub fn with_contract(mut self, contract: SchemaNode) -> Self {
        self.input_contract = contract;
        self
    }
}
