//! Order command - prints the execution order of a workflow

use std::path::PathBuf;

use clap::Args;

use crate::config::AppConfig;
use crate::domain::workflow::{OrderingMode, WorkflowGraph};

/// Arguments for the order command
#[derive(Args, Clone, Debug)]
pub struct OrderArgs {
    /// Workflow definition file (JSON with `nodes` and `edges`)
    #[arg(long, short)]
    pub workflow: PathBuf,

    /// Fail instead of dropping nodes caught in a cycle
    #[arg(long)]
    pub strict: bool,
}

/// Print one `id<TAB>type` line per node in run order
pub async fn run(args: OrderArgs, config: &AppConfig) -> anyhow::Result<()> {
    let graph = super::load_workflow(&args.workflow)?;
    let mode = if args.strict {
        OrderingMode::Strict
    } else {
        config.engine.ordering
    };

    for line in order_lines(&graph, mode)? {
        println!("{}", line);
    }

    Ok(())
}

fn order_lines(graph: &WorkflowGraph, mode: OrderingMode) -> anyhow::Result<Vec<String>> {
    let ordered = graph.order(mode)?;

    if ordered.len() < graph.nodes.len() {
        tracing::warn!(
            declared = graph.nodes.len(),
            ordered = ordered.len(),
            "Some nodes will not run"
        );
    }

    Ok(ordered
        .into_iter()
        .map(|node| format!("{}\t{}", node.id(), node.node_type()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn graph(value: serde_json::Value) -> WorkflowGraph {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_order_lines() {
        let graph = graph(json!({
            "nodes": [
                {"id": "end", "type": "end"},
                {"id": "start", "type": "start"},
                {"id": "shout", "type": "string", "data": {"operation": "upper", "input_string": "hi"}}
            ],
            "edges": [
                {"source": "start", "target": "shout"},
                {"source": "shout", "target": "end"}
            ]
        }));

        let lines = order_lines(&graph, OrderingMode::Lenient).unwrap();

        assert_eq!(lines, vec!["start\tstart", "shout\tstring", "end\tend"]);
    }

    #[test]
    fn test_strict_cycle_is_an_error() {
        let graph = graph(json!({
            "nodes": [{"id": "a", "type": "end"}, {"id": "b", "type": "end"}],
            "edges": [{"source": "a", "target": "b"}, {"source": "b", "target": "a"}]
        }));

        assert!(order_lines(&graph, OrderingMode::Lenient).unwrap().is_empty());

        let err = order_lines(&graph, OrderingMode::Strict).unwrap_err();
        assert!(err.to_string().contains("a, b"));
    }
}
