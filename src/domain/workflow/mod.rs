//! Workflow domain - graphs of typed nodes, ordering, variable resolution
//! and run results

mod context;
mod error;
mod executor;
mod graph;
mod node;
mod node_types;
mod variables;

pub use context::{ExecutionContext, INPUT_KEY};
pub use error::WorkflowError;
pub use executor::{
    ExecutionTiming, NodeExecutionResult, NodeExecutionStatus, RunConfig, RunStatus,
    WorkflowExecutor, WorkflowRunResult,
};
pub use graph::{execution_order, OrderingMode, WorkflowGraph};
pub use node::{NodeKind, NodeType, WorkflowEdge, WorkflowNode};
pub use node_types::{
    EndNode, FormatArgs, HttpMethod, HttpNode, IntentNode, IntentOption, KnowledgeNode, LlmNode,
    StartNode, StringNode, StringOperation,
};
pub use variables::{resolve, resolve_value};
