//! Workflow Engine
//!
//! Executes declarative workflows: graphs of typed nodes joined by directed
//! edges. Supports:
//! - Deterministic topological ordering with lenient or strict cycle handling
//! - `{input.param}` and `{node.field}` references between node outputs
//! - LLM, intent, knowledge search, HTTP and string nodes

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
