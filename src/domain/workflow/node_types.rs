//! Typed configuration for each workflow node type

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

fn default_http_timeout() -> u64 {
    10
}

fn default_model_timeout() -> u64 {
    60
}

fn default_top_k() -> usize {
    5
}

fn default_similarity_threshold() -> f32 {
    0.7
}

/// Entry node; echoes the run input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartNode {
    /// Input parameters that must be present and non-null
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_inputs: Vec<String>,
}

/// Exit node; collects every node output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndNode {}

/// HTTP methods accepted by the HTTP node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            other => Err(format!("unsupported HTTP method '{}'", other)),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Outbound HTTP call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpNode {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub method: HttpMethod,

    /// Header values; strings are resolved, other scalars are sent in display form
    #[serde(default)]
    pub headers: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(default = "default_http_timeout", alias = "timeout")]
    pub timeout_seconds: u64,
}

impl HttpNode {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: default_http_timeout(),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// Model inference through an agent's configured model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmNode {
    #[serde(default, alias = "agent_uuid")]
    pub agent_id: String,

    #[serde(default)]
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_model_timeout", alias = "timeout")]
    pub timeout_seconds: u64,
}

impl LlmNode {
    pub fn new(agent_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
            timeout_seconds: default_model_timeout(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// Similarity search over a knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    #[serde(default, alias = "kb_uuid")]
    pub knowledge_base_id: String,

    #[serde(default)]
    pub query: String,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Bounds the query embedding call
    #[serde(default = "default_model_timeout", alias = "timeout")]
    pub timeout_seconds: u64,
}

impl KnowledgeNode {
    pub fn new(knowledge_base_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            knowledge_base_id: knowledge_base_id.into(),
            query: query.into(),
            top_k: default_top_k(),
            similarity_threshold: default_similarity_threshold(),
            timeout_seconds: default_model_timeout(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// One candidate label for the intent node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentOption {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IntentOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Classifies a query into one of a fixed set of intents using an agent's model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentNode {
    #[serde(default, alias = "agent_uuid")]
    pub agent_id: String,

    #[serde(default)]
    pub query: String,

    #[serde(default)]
    pub intents: Vec<IntentOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_intent: Option<String>,

    #[serde(default = "default_model_timeout", alias = "timeout")]
    pub timeout_seconds: u64,
}

impl IntentNode {
    pub fn new(agent_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            query: query.into(),
            timeout_seconds: default_model_timeout(),
            ..Default::default()
        }
    }

    pub fn with_intent(mut self, intent: IntentOption) -> Self {
        self.intents.push(intent);
        self
    }

    pub fn with_default_intent(mut self, name: impl Into<String>) -> Self {
        self.default_intent = Some(name.into());
        self
    }
}

/// Arguments for the `format` string operation
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArgs {
    /// `{name}` placeholders
    Named(Map<String, Value>),
    /// `{}` and `{0}` placeholders
    Positional(Vec<Value>),
}

/// A string transformation with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum StringOperation {
    Concat { strings: Vec<String>, separator: String },
    Replace { old_text: String, new_text: String, count: i64 },
    Substring { start: i64, end: Option<i64> },
    Format { format_string: String, args: FormatArgs },
    Trim,
    Upper,
    Lower,
}

impl StringOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Concat { .. } => "concat",
            Self::Replace { .. } => "replace",
            Self::Substring { .. } => "substring",
            Self::Format { .. } => "format",
            Self::Trim => "trim",
            Self::Upper => "upper",
            Self::Lower => "lower",
        }
    }

    fn parse(operation: &str, params: &Map<String, Value>) -> Result<Self, String> {
        let op = match operation {
            "concat" => Self::Concat {
                strings: param(params, "strings")?.unwrap_or_default(),
                separator: param(params, "separator")?.unwrap_or_default(),
            },
            "replace" => Self::Replace {
                old_text: param(params, "old_text")?.unwrap_or_default(),
                new_text: param(params, "new_text")?.unwrap_or_default(),
                count: param(params, "count")?.unwrap_or(-1),
            },
            "substring" => Self::Substring {
                start: param(params, "start")?.unwrap_or(0),
                end: param(params, "end")?,
            },
            "format" => Self::Format {
                format_string: param(params, "format_string")?.unwrap_or_default(),
                args: match params.get("format_args") {
                    None | Some(Value::Null) => FormatArgs::Named(Map::new()),
                    Some(Value::Object(map)) => FormatArgs::Named(map.clone()),
                    Some(Value::Array(items)) => FormatArgs::Positional(items.clone()),
                    Some(_) => return Err("format_args must be an object or an array".to_string()),
                },
            },
            "trim" => Self::Trim,
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            "" => return Err("string node requires an operation".to_string()),
            other => return Err(format!("unsupported string operation '{}'", other)),
        };
        Ok(op)
    }
}

/// Read an optional operation parameter, treating null as absent
fn param<T: serde::de::DeserializeOwned>(
    params: &Map<String, Value>,
    key: &str,
) -> Result<Option<T>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| format!("invalid operation parameter '{}': {}", key, e)),
    }
}

#[derive(Deserialize)]
struct RawStringNode {
    #[serde(default)]
    operation: String,
    #[serde(default)]
    input_string: String,
    #[serde(default)]
    operation_params: Map<String, Value>,
}

/// String transformation applied to a resolved input string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawStringNode")]
pub struct StringNode {
    pub operation: StringOperation,
    pub input_string: String,
}

impl StringNode {
    pub fn new(operation: StringOperation, input_string: impl Into<String>) -> Self {
        Self {
            operation,
            input_string: input_string.into(),
        }
    }
}

impl TryFrom<RawStringNode> for StringNode {
    type Error = String;

    fn try_from(raw: RawStringNode) -> Result<Self, Self::Error> {
        Ok(Self {
            operation: StringOperation::parse(raw.operation.trim(), &raw.operation_params)?,
            input_string: raw.input_string,
        })
    }
}
