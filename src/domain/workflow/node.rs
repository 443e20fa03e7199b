//! Workflow graph nodes and edges

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::node_types::{EndNode, HttpNode, IntentNode, KnowledgeNode, LlmNode, StartNode, StringNode};

/// The node types the engine knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Start,
    Llm,
    Http,
    Knowledge,
    Intent,
    String,
    End,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        Self::Start,
        Self::Llm,
        Self::Http,
        Self::Knowledge,
        Self::Intent,
        Self::String,
        Self::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Llm => "llm",
            Self::Http => "http",
            Self::Knowledge => "knowledge",
            Self::Intent => "intent",
            Self::String => "string",
            Self::End => "end",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node's parsed configuration, one variant per recognized type
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Start(StartNode),
    Llm(LlmNode),
    Http(HttpNode),
    Knowledge(KnowledgeNode),
    Intent(IntentNode),
    String(StringNode),
    End(EndNode),
    /// Recognized type whose configuration failed to parse
    Misconfigured { node_type: NodeType, reason: String },
    /// Type the engine has no handler for
    Unrecognized(String),
}

impl NodeKind {
    /// Parse `data` according to `node_type`. Never fails: problems are
    /// captured in the returned variant and surface when the node runs.
    pub fn parse(node_type: &str, data: &Value) -> Self {
        let Some(parsed_type) = NodeType::parse(node_type) else {
            return Self::Unrecognized(node_type.to_string());
        };

        let data = if data.is_null() {
            Value::Object(Default::default())
        } else {
            data.clone()
        };

        let result = match parsed_type {
            NodeType::Start => serde_json::from_value(data).map(Self::Start),
            NodeType::Llm => serde_json::from_value(data).map(Self::Llm),
            NodeType::Http => serde_json::from_value(data).map(Self::Http),
            NodeType::Knowledge => serde_json::from_value(data).map(Self::Knowledge),
            NodeType::Intent => serde_json::from_value(data).map(Self::Intent),
            NodeType::String => serde_json::from_value(data).map(Self::String),
            NodeType::End => serde_json::from_value(data).map(Self::End),
        };

        result.unwrap_or_else(|e| Self::Misconfigured {
            node_type: parsed_type,
            reason: e.to_string(),
        })
    }

    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            Self::Start(_) => Some(NodeType::Start),
            Self::Llm(_) => Some(NodeType::Llm),
            Self::Http(_) => Some(NodeType::Http),
            Self::Knowledge(_) => Some(NodeType::Knowledge),
            Self::Intent(_) => Some(NodeType::Intent),
            Self::String(_) => Some(NodeType::String),
            Self::End(_) => Some(NodeType::End),
            Self::Misconfigured { node_type, .. } => Some(*node_type),
            Self::Unrecognized(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    data: Value,
}

/// A node in a workflow graph
///
/// The declared type and raw `data` are kept alongside the parsed
/// [`NodeKind`] so a node serializes back to the shape it was read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub struct WorkflowNode {
    id: String,
    node_type: String,
    data: Value,
    kind: NodeKind,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, data: Value) -> Self {
        let node_type = node_type.into();
        let kind = NodeKind::parse(&node_type, &data);
        Self {
            id: id.into(),
            node_type,
            data,
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The type exactly as declared
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_end(&self) -> bool {
        self.kind.node_type() == Some(NodeType::End)
    }
}

impl From<RawNode> for WorkflowNode {
    fn from(raw: RawNode) -> Self {
        Self::new(raw.id, raw.node_type, raw.data)
    }
}

impl From<WorkflowNode> for RawNode {
    fn from(node: WorkflowNode) -> Self {
        Self {
            id: node.id,
            node_type: node.node_type,
            data: node.data,
        }
    }
}

/// A directed dependency: `target` runs after `source`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub source: String,
    pub target: String,
}

impl WorkflowEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
