//! Provider resolver trait for resolving model records to LLM providers

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use super::LlmProvider;
use crate::domain::model::Model;
use crate::domain::DomainError;

/// Trait for resolving a model record to an LLM provider instance.
///
/// Lets the LLM and intent nodes pick the client that matches the model
/// configured on an agent instead of relying on one hardcoded provider.
#[async_trait]
pub trait ProviderResolver: Send + Sync + Debug {
    /// Resolve a model record to the provider that can serve it.
    async fn resolve(&self, model: &Model) -> Result<Arc<dyn LlmProvider>, DomainError>;
}

/// A provider resolver that always returns the same provider.
#[derive(Debug)]
pub struct StaticProviderResolver {
    provider: Arc<dyn LlmProvider>,
}

impl StaticProviderResolver {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ProviderResolver for StaticProviderResolver {
    async fn resolve(&self, _model: &Model) -> Result<Arc<dyn LlmProvider>, DomainError> {
        Ok(self.provider.clone())
    }
}
