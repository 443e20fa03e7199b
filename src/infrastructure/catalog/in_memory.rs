//! In-memory catalog implementation

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::agent::{Agent, AgentRepository};
use crate::domain::knowledge_base::{
    DocumentChunk, KnowledgeBase, KnowledgeBaseDocument, KnowledgeRepository,
};
use crate::domain::model::Model;
use crate::domain::DomainError;

/// Serialized catalog contents, as read from a catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(default)]
    pub knowledge_bases: Vec<KnowledgeBase>,
    #[serde(default)]
    pub documents: Vec<KnowledgeBaseDocument>,
    #[serde(default)]
    pub chunks: Vec<DocumentChunk>,
}

/// In-memory implementation of the agent and knowledge lookups
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    agents: RwLock<HashMap<String, Agent>>,
    models: RwLock<HashMap<String, Model>>,
    knowledge_bases: RwLock<HashMap<String, KnowledgeBase>>,
    documents: RwLock<HashMap<String, KnowledgeBaseDocument>>,
    chunks: RwLock<Vec<DocumentChunk>>,
}

impl InMemoryCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: CatalogData) -> Self {
        Self::new()
            .with_all(data.agents, Self::with_agent)
            .with_all(data.models, Self::with_model)
            .with_all(data.knowledge_bases, Self::with_knowledge_base)
            .with_all(data.documents, Self::with_document)
            .with_all(data.chunks, Self::with_chunk)
    }

    /// Parse a catalog from JSON text
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let data: CatalogData = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("Invalid catalog: {}", e)))?;
        Ok(Self::from_data(data))
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!(
                "Failed to read catalog '{}': {}",
                path.display(),
                e
            ))
        })?;

        let catalog = Self::from_json(&json)?;
        info!(path = %path.display(), "Loaded catalog");
        Ok(catalog)
    }

    fn with_all<T>(self, items: Vec<T>, add: fn(Self, T) -> Self) -> Self {
        items.into_iter().fold(self, add)
    }

    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.get_mut().insert(agent.id().to_string(), agent);
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.models.get_mut().insert(model.id().to_string(), model);
        self
    }

    pub fn with_knowledge_base(mut self, kb: KnowledgeBase) -> Self {
        self.knowledge_bases
            .get_mut()
            .insert(kb.id().to_string(), kb);
        self
    }

    pub fn with_document(mut self, document: KnowledgeBaseDocument) -> Self {
        self.documents
            .get_mut()
            .insert(document.id().to_string(), document);
        self
    }

    pub fn with_chunk(mut self, chunk: DocumentChunk) -> Self {
        self.chunks.get_mut().push(chunk);
        self
    }
}

#[async_trait]
impl AgentRepository for InMemoryCatalog {
    async fn find_agent(&self, id: &str) -> Result<Option<Agent>, DomainError> {
        Ok(self.agents.read().await.get(id).cloned())
    }

    async fn find_model(&self, id: &str) -> Result<Option<Model>, DomainError> {
        Ok(self.models.read().await.get(id).cloned())
    }
}

#[async_trait]
impl KnowledgeRepository for InMemoryCatalog {
    async fn find_knowledge_base(&self, id: &str) -> Result<Option<KnowledgeBase>, DomainError> {
        Ok(self.knowledge_bases.read().await.get(id).cloned())
    }

    async fn list_embedded_chunks(&self, kb_id: &str) -> Result<Vec<DocumentChunk>, DomainError> {
        Ok(self
            .chunks
            .read()
            .await
            .iter()
            .filter(|c| c.kb_id() == kb_id && c.is_embedded())
            .cloned()
            .collect())
    }

    async fn find_document(&self, id: &str) -> Result<Option<KnowledgeBaseDocument>, DomainError> {
        Ok(self.documents.read().await.get(id).cloned())
    }
}
