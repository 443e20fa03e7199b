//! Model record consumed by the LLM and intent nodes

use serde::{Deserialize, Serialize};

/// Default provider family for model records that do not name one
pub const DEFAULT_PROVIDER: &str = "openai";

/// A configured language model an agent can be bound to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Record identifier referenced by agents
    id: String,

    /// Identifier the provider expects (e.g. "gpt-4o-mini")
    model_name: String,

    /// Provider family (only OpenAI-compatible endpoints are built in)
    #[serde(default = "default_provider")]
    provider: String,

    /// Endpoint override for OpenAI-compatible deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,

    /// Name of the environment variable holding the API key for this model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key_env: Option<String>,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

impl Model {
    pub fn new(id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_name: model_name.into(),
            provider: default_provider(),
            base_url: None,
            api_key_env: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key_env(mut self, env: impl Into<String>) -> Self {
        self.api_key_env = Some(env.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn api_key_env(&self) -> Option<&str> {
        self.api_key_env.as_deref()
    }
}
