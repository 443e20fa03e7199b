//! Knowledge Base domain - documents, embedded chunks and lookups

mod document;
mod entity;
mod repository;

pub use document::{DocumentChunk, KnowledgeBaseDocument};
pub use entity::KnowledgeBase;
pub use repository::KnowledgeRepository;
