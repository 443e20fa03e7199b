//! Workflow executor trait and result types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::WorkflowError;
use super::graph::{OrderingMode, WorkflowGraph};

/// Outcome of a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeExecutionStatus {
    Success,
    Failed,
}

/// When a node ran and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTiming {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub execution_time_ms: u64,
}

/// Record of one node's execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExecutionResult {
    pub node_id: String,

    pub node_type: String,

    pub status: NodeExecutionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(flatten)]
    pub timing: ExecutionTiming,
}

impl NodeExecutionResult {
    pub fn success(
        node_id: impl Into<String>,
        node_type: impl Into<String>,
        output: Value,
        timing: ExecutionTiming,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            node_type: node_type.into(),
            status: NodeExecutionStatus::Success,
            output: Some(output),
            error_message: None,
            timing,
        }
    }

    pub fn failure(
        node_id: impl Into<String>,
        node_type: impl Into<String>,
        error: impl Into<String>,
        timing: ExecutionTiming,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            node_type: node_type.into(),
            status: NodeExecutionStatus::Failed,
            output: None,
            error_message: Some(error.into()),
            timing,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == NodeExecutionStatus::Success
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every ordered node was attempted
    Completed,
    /// Stopped early after a node failure
    Aborted,
}

/// Result of executing a workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRunResult {
    pub status: RunStatus,

    /// The end node's output, or every node output when no end node ran
    pub output: Value,

    /// Node records in execution order
    pub node_executions: Vec<NodeExecutionResult>,

    /// Wall-clock time of the whole run
    pub execution_time_ms: u64,

    /// Why the run was aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkflowRunResult {
    pub fn completed(
        output: Value,
        node_executions: Vec<NodeExecutionResult>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            status: RunStatus::Completed,
            output,
            node_executions,
            execution_time_ms,
            error: None,
        }
    }

    pub fn aborted(
        error: impl Into<String>,
        output: Value,
        node_executions: Vec<NodeExecutionResult>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            status: RunStatus::Aborted,
            output,
            node_executions,
            execution_time_ms,
            error: Some(error.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// The record for a node, if it ran
    pub fn execution(&self, node_id: &str) -> Option<&NodeExecutionResult> {
        self.node_executions.iter().find(|r| r.node_id == node_id)
    }

    pub fn failed_nodes(&self) -> impl Iterator<Item = &NodeExecutionResult> {
        self.node_executions.iter().filter(|r| !r.is_success())
    }
}

/// Per-run options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Keep running later nodes after one fails
    #[serde(default)]
    pub continue_on_error: bool,

    #[serde(default)]
    pub ordering: OrderingMode,
}

impl RunConfig {
    pub fn continue_on_error(mut self, value: bool) -> Self {
        self.continue_on_error = value;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingMode) -> Self {
        self.ordering = ordering;
        self
    }
}

/// Runs workflow graphs
#[async_trait]
pub trait WorkflowExecutor: Send + Sync + std::fmt::Debug {
    /// Execute `graph` once against `input`.
    ///
    /// Node failures are reported inside the returned result; `Err` is only
    /// returned when the graph cannot be ordered under strict ordering.
    async fn execute(
        &self,
        graph: &WorkflowGraph,
        input: Value,
        config: RunConfig,
    ) -> Result<WorkflowRunResult, WorkflowError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timing(ms: u64) -> ExecutionTiming {
        let now = Utc::now();
        ExecutionTiming {
            started_at: now,
            completed_at: now,
            execution_time_ms: ms,
        }
    }

    #[test]
    fn test_node_result_success() {
        let result = NodeExecutionResult::success("fetch", "http", json!({"status_code": 200}), timing(12));

        assert!(result.is_success());
        assert_eq!(result.output, Some(json!({"status_code": 200})));
        assert!(result.error_message.is_none());
    }

    #[test]
    fn test_node_result_failure() {
        let result = NodeExecutionResult::failure("fetch", "http", "Request error: refused", timing(3));

        assert!(!result.is_success());
        assert!(result.output.is_none());
        assert_eq!(result.error_message.as_deref(), Some("Request error: refused"));
    }

    #[test]
    fn test_node_result_serializes_flat_timing() {
        let result = NodeExecutionResult::success("s", "start", json!({}), timing(5));
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["execution_time_ms"], 5);
        assert!(value.get("started_at").is_some());
        assert!(value.get("completed_at").is_some());
        assert!(value.get("error_message").is_none());
    }

    #[test]
    fn test_run_result_lookup() {
        let records = vec![
            NodeExecutionResult::success("a", "start", json!({}), timing(1)),
            NodeExecutionResult::failure("b", "http", "boom", timing(1)),
        ];
        let result = WorkflowRunResult::aborted("boom", json!({"a": {}}), records, 2);

        assert!(!result.is_completed());
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert!(result.execution("a").unwrap().is_success());
        assert!(result.execution("c").is_none());
        assert_eq!(result.failed_nodes().count(), 1);
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::default();
        assert!(!config.continue_on_error);
        assert_eq!(config.ordering, OrderingMode::Lenient);

        let config: RunConfig = serde_json::from_value(json!({"continue_on_error": true})).unwrap();
        assert!(config.continue_on_error);
    }
}
