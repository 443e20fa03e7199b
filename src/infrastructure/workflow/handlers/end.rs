//! End node: gathers every node output into the run result

use async_trait::async_trait;
use serde_json::Value;

use super::{NodeHandler, NodeServices};
use crate::domain::workflow::{EndNode, ExecutionContext, WorkflowError};

#[async_trait]
impl NodeHandler for EndNode {
    async fn handle(
        &self,
        _node_id: &str,
        context: &ExecutionContext,
        _services: &NodeServices,
    ) -> Result<Value, WorkflowError> {
        Ok(Value::Object(context.node_outputs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::workflow::handlers::test_support;
    use serde_json::json;

    #[tokio::test]
    async fn test_end_collects_node_outputs() {
        let mut ctx = ExecutionContext::new(json!({"secret": "x"}));
        ctx.set_output("start", json!({"secret": "x"}));
        ctx.set_output("http", json!({"status_code": 200}));

        let output = EndNode {}
            .handle("end", &ctx, &test_support::services())
            .await
            .unwrap();

        assert_eq!(
            output,
            json!({"start": {"secret": "x"}, "http": {"status_code": 200}})
        );
    }
}
