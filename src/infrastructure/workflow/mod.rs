//! Workflow infrastructure implementations

mod executor_impl;
pub mod handlers;

pub use executor_impl::WorkflowEngine;
pub use handlers::{NodeHandler, NodeServices};
