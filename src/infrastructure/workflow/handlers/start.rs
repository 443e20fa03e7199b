//! Start node: echoes the run input and checks required parameters

use async_trait::async_trait;
use serde_json::Value;

use super::{NodeHandler, NodeServices};
use crate::domain::workflow::{ExecutionContext, StartNode, WorkflowError};

#[async_trait]
impl NodeHandler for StartNode {
    async fn handle(
        &self,
        _node_id: &str,
        context: &ExecutionContext,
        _services: &NodeServices,
    ) -> Result<Value, WorkflowError> {
        let input = context.input();

        let missing: Vec<&str> = self
            .required_inputs
            .iter()
            .filter(|name| input.get(name.as_str()).is_none_or(Value::is_null))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(WorkflowError::invalid_input(format!(
                "missing required input parameters: {}",
                missing.join(", ")
            )));
        }

        Ok(input.clone())
    }
}
