//! Node handlers, one per node type

mod end;
mod http;
mod intent;
mod knowledge;
mod llm;
mod start;
mod string;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::agent::AgentRepository;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::knowledge_base::KnowledgeRepository;
use crate::domain::llm::ProviderResolver;
use crate::domain::workflow::{ExecutionContext, NodeKind, WorkflowError, WorkflowNode};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Read-only collaborators shared by every handler
#[derive(Debug, Clone)]
pub struct NodeServices {
    pub agents: Arc<dyn AgentRepository>,
    pub knowledge: Arc<dyn KnowledgeRepository>,
    pub embeddings: Arc<dyn EmbeddingProvider>,
    pub providers: Arc<dyn ProviderResolver>,
    pub http: Arc<dyn HttpClientTrait>,
}

/// Runs one node against the context and returns its output
#[async_trait]
pub trait NodeHandler: Send + Sync {
    async fn handle(
        &self,
        node_id: &str,
        context: &ExecutionContext,
        services: &NodeServices,
    ) -> Result<Value, WorkflowError>;
}

/// Route a node to the handler for its type
pub async fn dispatch(
    node: &WorkflowNode,
    context: &ExecutionContext,
    services: &NodeServices,
) -> Result<Value, WorkflowError> {
    let id = node.id();
    match node.kind() {
        NodeKind::Start(config) => config.handle(id, context, services).await,
        NodeKind::Llm(config) => config.handle(id, context, services).await,
        NodeKind::Http(config) => config.handle(id, context, services).await,
        NodeKind::Knowledge(config) => config.handle(id, context, services).await,
        NodeKind::Intent(config) => config.handle(id, context, services).await,
        NodeKind::String(config) => config.handle(id, context, services).await,
        NodeKind::End(config) => config.handle(id, context, services).await,
        NodeKind::Misconfigured { node_type, reason } => Err(WorkflowError::configuration(
            format!("invalid {} node configuration: {}", node_type, reason),
        )),
        NodeKind::Unrecognized(node_type) => Err(WorkflowError::unknown_node_type(id, node_type)),
    }
}

/// Map a collaborator failure into the workflow error taxonomy
pub(crate) fn collaborator_error(err: DomainError) -> WorkflowError {
    match err {
        DomainError::NotFound { message } => WorkflowError::NotFound(message),
        DomainError::Configuration { message } => WorkflowError::Configuration(message),
        DomainError::Validation { message } => WorkflowError::InvalidInput(message),
        other => WorkflowError::Transport(other.to_string()),
    }
}
