//! Agent entity

use serde::{Deserialize, Serialize};

/// An agent bundles a persona (system instruction) with the model it runs on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    id: String,

    name: String,

    /// Persona sent as the system message ahead of the user prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system_prompt: Option<String>,

    /// Model record the agent runs on; agents without one cannot serve LLM nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_id: Option<String>,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            system_prompt: None,
            model_id: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persona, ignoring blank strings
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }
}
