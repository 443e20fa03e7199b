//! Knowledge base document and chunk entities

use serde::{Deserialize, Serialize};

/// A document stored in a knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseDocument {
    id: String,
    kb_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl KnowledgeBaseDocument {
    pub fn new(id: impl Into<String>, kb_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kb_id: kb_id.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kb_id(&self) -> &str {
        &self.kb_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// A slice of a document's text, optionally carrying its embedding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    id: String,
    kb_id: String,
    document_id: String,
    content: String,
    /// Absent until the chunk has been embedded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    embedding: Option<Vec<f32>>,
}

impl DocumentChunk {
    pub fn new(
        id: impl Into<String>,
        kb_id: impl Into<String>,
        document_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kb_id: kb_id.into(),
            document_id: document_id.into(),
            content: content.into(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kb_id(&self) -> &str {
        &self.kb_id
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    /// Chunks with an empty vector count as not embedded
    pub fn is_embedded(&self) -> bool {
        self.embedding.as_ref().is_some_and(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = KnowledgeBaseDocument::new("doc-1", "kb-1").with_title("Photosynthesis");

        assert_eq!(doc.id(), "doc-1");
        assert_eq!(doc.kb_id(), "kb-1");
        assert_eq!(doc.title(), Some("Photosynthesis"));
    }

    #[test]
    fn test_chunk_embedding_state() {
        let chunk = DocumentChunk::new("c1", "kb-1", "doc-1", "Plants convert light");
        assert!(!chunk.is_embedded());

        let chunk = chunk.with_embedding(vec![]);
        assert!(!chunk.is_embedded());

        let chunk = chunk.with_embedding(vec![0.1, 0.2]);
        assert!(chunk.is_embedded());
        assert_eq!(chunk.embedding(), Some(&[0.1, 0.2][..]));
    }
}
