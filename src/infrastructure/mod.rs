//! Infrastructure layer - External service implementations

pub mod catalog;
pub mod embedding;
pub mod http_client;
pub mod llm;
pub mod logging;
pub mod workflow;
