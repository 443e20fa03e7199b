//! LLM node: one chat call through the agent's model

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{collaborator_error, NodeHandler, NodeServices};
use crate::domain::agent::Agent;
use crate::domain::llm::{LlmRequest, LlmResponse};
use crate::domain::model::Model;
use crate::domain::workflow::{ExecutionContext, LlmNode, WorkflowError};

#[async_trait]
impl NodeHandler for LlmNode {
    async fn handle(
        &self,
        node_id: &str,
        context: &ExecutionContext,
        services: &NodeServices,
    ) -> Result<Value, WorkflowError> {
        let (agent, model) = agent_and_model(services, &self.agent_id).await?;

        let mut builder = LlmRequest::builder();
        if let Some(persona) = agent.system_prompt() {
            builder = builder.system(persona);
        }
        builder = builder.user(context.resolve(&self.prompt));

        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        let response =
            call_model(services, &model, builder.build(), node_id, self.timeout_seconds).await?;

        Ok(json!({
            "response_text": response.content(),
            "usage_stats": response.usage,
            "function_call": response.function_call,
        }))
    }
}

/// Look up an agent and the model record it runs on
pub(super) async fn agent_and_model(
    services: &NodeServices,
    agent_id: &str,
) -> Result<(Agent, Model), WorkflowError> {
    if agent_id.trim().is_empty() {
        return Err(WorkflowError::configuration("node requires an agent_id"));
    }

    let agent = services
        .agents
        .find_agent(agent_id)
        .await
        .map_err(collaborator_error)?
        .ok_or_else(|| WorkflowError::configuration(format!("agent '{}' not found", agent_id)))?;

    let model_id = agent.model_id().ok_or_else(|| {
        WorkflowError::configuration(format!("agent '{}' has no model configured", agent_id))
    })?;

    let model = services
        .agents
        .find_model(model_id)
        .await
        .map_err(collaborator_error)?
        .ok_or_else(|| {
            WorkflowError::configuration(format!(
                "model '{}' for agent '{}' not found",
                model_id, agent_id
            ))
        })?;

    Ok((agent, model))
}

/// Send one chat request under a wall-clock timeout
pub(super) async fn call_model(
    services: &NodeServices,
    model: &Model,
    request: LlmRequest,
    node_id: &str,
    timeout_seconds: u64,
) -> Result<LlmResponse, WorkflowError> {
    if timeout_seconds == 0 {
        return Err(WorkflowError::configuration("timeout_seconds must be positive"));
    }

    let provider = services
        .providers
        .resolve(model)
        .await
        .map_err(collaborator_error)?;

    debug!(
        node_id = %node_id,
        provider = provider.provider_name(),
        model = %model.model_name(),
        "Calling model"
    );

    let timeout = Duration::from_secs(timeout_seconds);
    match tokio::time::timeout(timeout, provider.chat(model.model_name(), request)).await {
        Err(_) => Err(WorkflowError::timeout(node_id, timeout.as_millis() as u64)),
        Ok(Err(e)) if e.is_timeout() => {
            Err(WorkflowError::timeout(node_id, timeout.as_millis() as u64))
        }
        Ok(Err(e)) => Err(WorkflowError::transport(e.to_string())),
        Ok(Ok(response)) => Ok(response),
    }
}
