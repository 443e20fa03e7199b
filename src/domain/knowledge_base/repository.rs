//! Knowledge lookup trait

use async_trait::async_trait;

use super::{DocumentChunk, KnowledgeBase, KnowledgeBaseDocument};
use crate::domain::DomainError;

/// Read-only lookups used by the knowledge retrieval node
#[async_trait]
pub trait KnowledgeRepository: Send + Sync + std::fmt::Debug {
    /// Get a knowledge base by ID
    async fn find_knowledge_base(&self, id: &str) -> Result<Option<KnowledgeBase>, DomainError>;

    /// All chunks of a knowledge base that carry an embedding vector
    async fn list_embedded_chunks(&self, kb_id: &str) -> Result<Vec<DocumentChunk>, DomainError>;

    /// Get a document by ID
    async fn find_document(&self, id: &str) -> Result<Option<KnowledgeBaseDocument>, DomainError>;
}
