//! Agent and model lookup trait

use async_trait::async_trait;

use super::Agent;
use crate::domain::model::Model;
use crate::domain::DomainError;

/// Read-only lookups used by the LLM and intent nodes
#[async_trait]
pub trait AgentRepository: Send + Sync + std::fmt::Debug {
    /// Get an agent by ID
    async fn find_agent(&self, id: &str) -> Result<Option<Agent>, DomainError>;

    /// Get a model record by ID
    async fn find_model(&self, id: &str) -> Result<Option<Model>, DomainError>;
}
