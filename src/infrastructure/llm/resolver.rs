//! Resolves model records to concrete chat providers

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::openai::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL};
use crate::domain::llm::{LlmProvider, ProviderResolver};
use crate::domain::model::Model;
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClient;

const SUPPORTED_PROVIDERS: [&str; 2] = ["openai", "openai_compatible"];

/// Builds an OpenAI-compatible provider per model record.
///
/// A model may override the endpoint with its own `base_url` and the key
/// with the environment variable named by `api_key_env`; otherwise the
/// resolver defaults apply.
#[derive(Debug, Clone)]
pub struct CatalogProviderResolver {
    client: HttpClient,
    default_base_url: String,
    default_api_key: String,
}

impl CatalogProviderResolver {
    pub fn new(client: HttpClient, default_api_key: impl Into<String>) -> Self {
        Self {
            client,
            default_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            default_api_key: default_api_key.into(),
        }
    }

    pub fn with_default_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.default_base_url = base_url.into();
        self
    }

    fn api_key_for(&self, model: &Model) -> Result<String, DomainError> {
        match model.api_key_env() {
            Some(var) => std::env::var(var).map_err(|_| {
                DomainError::configuration(format!(
                    "Model '{}' expects an API key in environment variable '{}'",
                    model.id(),
                    var
                ))
            }),
            None => Ok(self.default_api_key.clone()),
        }
    }
}

#[async_trait]
impl ProviderResolver for CatalogProviderResolver {
    async fn resolve(&self, model: &Model) -> Result<Arc<dyn LlmProvider>, DomainError> {
        if !SUPPORTED_PROVIDERS.contains(&model.provider()) {
            return Err(DomainError::configuration(format!(
                "Model '{}' uses unsupported provider '{}'",
                model.id(),
                model.provider()
            )));
        }

        let base_url = model.base_url().unwrap_or(&self.default_base_url);
        let api_key = self.api_key_for(model)?;

        debug!(model_id = %model.id(), base_url = %base_url, "Resolved chat provider");

        Ok(Arc::new(OpenAiProvider::with_base_url(
            self.client.clone(),
            api_key,
            base_url,
        )))
    }
}
