//! Workflow executor implementation

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::handlers::{dispatch, NodeServices};
use crate::domain::workflow::{
    ExecutionContext, ExecutionTiming, NodeExecutionResult, RunConfig, WorkflowError,
    WorkflowExecutor, WorkflowGraph, WorkflowNode, WorkflowRunResult,
};

/// Runs workflow graphs one node at a time in topological order
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    services: NodeServices,
}

impl WorkflowEngine {
    pub fn new(services: NodeServices) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &NodeServices {
        &self.services
    }

    /// Run one node and build its record; the output is returned for the context
    async fn run_node(
        &self,
        node: &WorkflowNode,
        context: &ExecutionContext,
    ) -> (NodeExecutionResult, Result<Value, WorkflowError>) {
        let started_at = Utc::now();
        let start = Instant::now();

        let result = dispatch(node, context, &self.services).await;

        let timing = ExecutionTiming {
            started_at,
            completed_at: Utc::now(),
            execution_time_ms: start.elapsed().as_millis() as u64,
        };

        let record = match &result {
            Ok(output) => {
                NodeExecutionResult::success(node.id(), node.node_type(), output.clone(), timing)
            }
            Err(e) => NodeExecutionResult::failure(node.id(), node.node_type(), e.to_string(), timing),
        };

        (record, result)
    }
}

/// The first successfully executed end node's output, else every node output
fn collect_output(
    ordered: &[&WorkflowNode],
    records: &[NodeExecutionResult],
    context: &ExecutionContext,
) -> Value {
    ordered
        .iter()
        .filter(|node| node.is_end())
        .find_map(|node| {
            records
                .iter()
                .find(|r| r.node_id == node.id() && r.is_success())
                .and_then(|r| r.output.clone())
        })
        .unwrap_or_else(|| Value::Object(context.node_outputs()))
}

#[async_trait]
impl WorkflowExecutor for WorkflowEngine {
    async fn execute(
        &self,
        graph: &WorkflowGraph,
        input: Value,
        config: RunConfig,
    ) -> Result<WorkflowRunResult, WorkflowError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("workflow_run", %run_id);

        async move {
            let start = Instant::now();
            let mut context = ExecutionContext::new(input);

            let ordered = graph.order(config.ordering)?;
            info!(
                nodes = graph.nodes.len(),
                scheduled = ordered.len(),
                continue_on_error = config.continue_on_error,
                "Starting workflow run"
            );

            if ordered.is_empty() && !graph.is_empty() {
                warn!("No node is ready to run; completing with empty output");
            }

            let mut records = Vec::with_capacity(ordered.len());
            let mut abort: Option<String> = None;

            for node in &ordered {
                debug!(node_id = %node.id(), node_type = %node.node_type(), "Executing node");

                let (record, result) = self.run_node(node, &context).await;
                records.push(record);

                match result {
                    Ok(output) => {
                        debug!(node_id = %node.id(), "Node succeeded");
                        context.set_output(node.id(), output);
                    }
                    Err(e) if e.aborts_run() => {
                        error!(node_id = %node.id(), error = %e, "Aborting workflow run");
                        abort = Some(e.to_string());
                        break;
                    }
                    Err(e) if config.continue_on_error => {
                        error!(node_id = %node.id(), error = %e, "Node failed; continuing");
                    }
                    Err(e) => {
                        error!(node_id = %node.id(), error = %e, "Node failed; stopping run");
                        abort = Some(format!("node '{}' failed: {}", node.id(), e));
                        break;
                    }
                }
            }

            let output = collect_output(&ordered, &records, &context);
            let execution_time_ms = start.elapsed().as_millis() as u64;
            let result = match abort {
                Some(error) => WorkflowRunResult::aborted(error, output, records, execution_time_ms),
                None => WorkflowRunResult::completed(output, records, execution_time_ms),
            };

            info!(
                status = ?result.status,
                executed = result.node_executions.len(),
                failed = result.failed_nodes().count(),
                execution_time_ms,
                "Workflow run finished"
            );

            Ok::<_, WorkflowError>(result)
        }
        .instrument(span)
        .await
    }
}
