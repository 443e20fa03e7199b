//! Workflow error types

use thiserror::Error;

/// Errors that can occur while ordering or executing a workflow graph
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout in node '{node}' after {timeout_ms}ms")]
    Timeout { node: String, timeout_ms: u64 },

    #[error("Request error: {0}")]
    Request(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported node type '{node_type}' for node '{node}'")]
    UnknownNodeType { node: String, node_type: String },

    #[error("Workflow graph has nodes that can never run (cycle or cyclic ancestor): {}", .nodes.join(", "))]
    CyclicGraph { nodes: Vec<String> },
}

impl WorkflowError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn timeout(node: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            node: node.into(),
            timeout_ms,
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unknown_node_type(node: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self::UnknownNodeType {
            node: node.into(),
            node_type: node_type.into(),
        }
    }

    pub fn cyclic_graph(nodes: Vec<String>) -> Self {
        Self::CyclicGraph { nodes }
    }

    /// Errors that invalidate the whole graph and stop the run even when
    /// `continue_on_error` is set
    pub fn aborts_run(&self) -> bool {
        matches!(self, Self::UnknownNodeType { .. } | Self::CyclicGraph { .. })
    }
}
