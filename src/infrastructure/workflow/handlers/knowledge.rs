//! Knowledge node: similarity search over a knowledge base

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{collaborator_error, NodeHandler, NodeServices};
use crate::domain::embedding::similarity;
use crate::domain::workflow::{ExecutionContext, KnowledgeNode, WorkflowError};

#[async_trait]
impl NodeHandler for KnowledgeNode {
    async fn handle(
        &self,
        node_id: &str,
        context: &ExecutionContext,
        services: &NodeServices,
    ) -> Result<Value, WorkflowError> {
        let kb_id = self.knowledge_base_id.trim();
        if kb_id.is_empty() {
            return Err(WorkflowError::configuration(
                "knowledge node requires a knowledge_base_id",
            ));
        }

        let query = context.resolve(&self.query);
        if query.trim().is_empty() {
            return Err(WorkflowError::configuration("knowledge node requires a query"));
        }

        if self.timeout_seconds == 0 {
            return Err(WorkflowError::configuration("timeout_seconds must be positive"));
        }

        services
            .knowledge
            .find_knowledge_base(kb_id)
            .await
            .map_err(collaborator_error)?
            .ok_or_else(|| {
                WorkflowError::not_found(format!("knowledge base '{}' not found", kb_id))
            })?;

        let timeout = Duration::from_secs(self.timeout_seconds);
        let query_vector = match tokio::time::timeout(timeout, services.embeddings.embed(&query)).await
        {
            Err(_) => return Err(WorkflowError::timeout(node_id, timeout.as_millis() as u64)),
            Ok(Err(e)) if e.is_timeout() => {
                return Err(WorkflowError::timeout(node_id, timeout.as_millis() as u64));
            }
            Ok(Err(e)) => return Err(WorkflowError::transport(e.to_string())),
            Ok(Ok(vector)) => vector,
        };

        let chunks = services
            .knowledge
            .list_embedded_chunks(kb_id)
            .await
            .map_err(collaborator_error)?;
        let candidates = chunks.len();

        let mut scored: Vec<_> = chunks
            .into_iter()
            .filter_map(|chunk| {
                let score = similarity(&query_vector, chunk.embedding()?);
                (score >= self.similarity_threshold).then_some((score, chunk))
            })
            .collect();

        // Stable sort keeps catalog order between equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(self.top_k);

        let mut titles: HashMap<String, Option<String>> = HashMap::new();
        let mut results = Vec::with_capacity(scored.len());

        for (score, chunk) in scored {
            if !titles.contains_key(chunk.document_id()) {
                let title = services
                    .knowledge
                    .find_document(chunk.document_id())
                    .await
                    .map_err(collaborator_error)?
                    .and_then(|doc| doc.title().map(str::to_string));
                titles.insert(chunk.document_id().to_string(), title);
            }

            results.push(json!({
                "chunk_id": chunk.id(),
                "content": chunk.content(),
                "similarity": score,
                "document_id": chunk.document_id(),
                "document_title": titles.get(chunk.document_id()).cloned().flatten(),
            }));
        }

        debug!(
            node_id = %node_id,
            kb_id = %kb_id,
            candidates,
            returned = results.len(),
            "Knowledge search finished"
        );

        let total = results.len();
        Ok(json!({ "results": results, "total": total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::knowledge_base::{DocumentChunk, KnowledgeBase, KnowledgeBaseDocument};
    use crate::infrastructure::catalog::InMemoryCatalog;
    use crate::infrastructure::workflow::handlers::test_support;
    use std::sync::Arc;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_knowledge_base(KnowledgeBase::new("kb-1", "Biology"))
            .with_knowledge_base(KnowledgeBase::new("kb-empty", "Empty"))
            .with_document(KnowledgeBaseDocument::new("doc-1", "kb-1").with_title("Photosynthesis"))
            .with_document(KnowledgeBaseDocument::new("doc-2", "kb-1"))
            .with_chunk(
                DocumentChunk::new("c-exact", "kb-1", "doc-1", "Plants turn light into sugar")
                    .with_embedding(vec![1.0, 0.0]),
            )
            .with_chunk(
                DocumentChunk::new("c-close", "kb-1", "doc-2", "Chlorophyll absorbs light")
                    .with_embedding(vec![0.9, 0.1]),
            )
            .with_chunk(
                DocumentChunk::new("c-far", "kb-1", "doc-1", "Roots absorb water")
                    .with_embedding(vec![0.0, 1.0]),
            )
            .with_chunk(
                DocumentChunk::new("c-opposite", "kb-1", "doc-1", "Nothing related")
                    .with_embedding(vec![-1.0, 0.0]),
            )
    }

    fn services(embeddings: MockEmbeddingProvider) -> NodeServices {
        NodeServices {
            embeddings: Arc::new(embeddings),
            ..test_support::with_catalog(test_support::services(), catalog())
        }
    }

    fn embedder() -> MockEmbeddingProvider {
        MockEmbeddingProvider::new().with_vector("how do plants use light", vec![1.0, 0.0])
    }

    #[tokio::test]
    async fn test_returns_ranked_chunks_above_threshold() {
        let ctx = ExecutionContext::new(json!({"question": "how do plants use light"}));
        let node = KnowledgeNode::new("kb-1", "{input.question}");

        let output = node.handle("kb", &ctx, &services(embedder())).await.unwrap();

        assert_eq!(output["total"], 2);
        let results = output["results"].as_array().unwrap();
        assert_eq!(results[0]["chunk_id"], "c-exact");
        assert_eq!(results[0]["document_title"], "Photosynthesis");
        assert_eq!(results[1]["chunk_id"], "c-close");
        assert!(results[1]["document_title"].is_null());
        assert!(results[0]["similarity"].as_f64().unwrap() >= results[1]["similarity"].as_f64().unwrap());
    }

    #[tokio::test]
    async fn test_top_k_and_threshold() {
        let ctx = ExecutionContext::new(json!({}));
        let node = KnowledgeNode::new("kb-1", "how do plants use light")
            .with_top_k(3)
            .with_similarity_threshold(0.0);

        let output = node.handle("kb", &ctx, &services(embedder())).await.unwrap();

        // The opposed chunk scores 0 after clamping and still passes a zero threshold
        assert_eq!(output["total"], 3);
        let ids: Vec<&str> = output["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["chunk_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["c-exact", "c-close", "c-far"]);
    }

    #[tokio::test]
    async fn test_empty_knowledge_base_yields_no_results() {
        let ctx = ExecutionContext::new(json!({}));
        let node = KnowledgeNode::new("kb-empty", "how do plants use light");

        let output = node.handle("kb", &ctx, &services(embedder())).await.unwrap();

        assert_eq!(output, json!({"results": [], "total": 0}));
    }

    #[tokio::test]
    async fn test_unknown_knowledge_base_is_not_found() {
        let ctx = ExecutionContext::new(json!({}));
        let node = KnowledgeNode::new("kb-ghost", "anything");

        let err = node.handle("kb", &ctx, &services(embedder())).await.unwrap_err();

        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_id_or_query_is_configuration_error() {
        let ctx = ExecutionContext::new(json!({}));

        let err = KnowledgeNode::new("", "q")
            .handle("kb", &ctx, &services(embedder()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Configuration(_)));

        let err = KnowledgeNode::new("kb-1", "  ")
            .handle("kb", &ctx, &services(embedder()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_transport_error() {
        let ctx = ExecutionContext::new(json!({}));
        let node = KnowledgeNode::new("kb-1", "how do plants use light");

        let err = node
            .handle("kb", &ctx, &services(MockEmbeddingProvider::new().with_error("quota")))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Transport(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_embedding_times_out() {
        let ctx = ExecutionContext::new(json!({}));
        let embedder = embedder().with_delay(Duration::from_secs(24 * 60 * 60));
        let node = KnowledgeNode::new("kb-1", "how do plants use light").with_timeout(2);

        let started = tokio::time::Instant::now();
        let err = node.handle("kb", &ctx, &services(embedder)).await.unwrap_err();

        assert_eq!(err, WorkflowError::timeout("kb", 2000));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_zero_timeout_is_configuration_error() {
        let ctx = ExecutionContext::new(json!({}));
        let node = KnowledgeNode::new("kb-1", "how do plants use light").with_timeout(0);

        let err = node.handle("kb", &ctx, &services(embedder())).await.unwrap_err();

        assert!(matches!(err, WorkflowError::Configuration(_)));
    }
}
