//! CLI module for the workflow engine
//!
//! Provides subcommands for working with workflow definition files:
//! - `run`: execute a workflow and print the run result
//! - `order`: print the order nodes would run in

pub mod order;
pub mod run;

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::domain::workflow::WorkflowGraph;

/// Workflow engine - runs declarative node graphs
#[derive(Parser)]
#[command(name = "workflow-engine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute a workflow definition and print the run result as JSON
    Run(run::RunArgs),

    /// Print the execution order of a workflow definition
    Order(order::OrderArgs),
}

/// Read a `{nodes, edges}` workflow definition from disk
pub fn load_workflow(path: &Path) -> anyhow::Result<WorkflowGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read workflow file {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid workflow definition in {}", path.display()))
}
