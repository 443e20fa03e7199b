//! Domain layer - Core entities, collaborator traits and the workflow model

pub mod agent;
pub mod embedding;
pub mod error;
pub mod knowledge_base;
pub mod llm;
pub mod model;
pub mod workflow;

pub use error::DomainError;
