//! Knowledge base entity

use serde::{Deserialize, Serialize};

/// A named collection of documents whose chunks can be searched by similarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    id: String,

    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl KnowledgeBase {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
