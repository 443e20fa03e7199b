//! Run command - executes a workflow definition once

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::workflow::{OrderingMode, RunConfig, WorkflowExecutor, WorkflowRunResult};
use crate::infrastructure::catalog::InMemoryCatalog;
use crate::infrastructure::embedding::OpenAiEmbeddingProvider;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::llm::CatalogProviderResolver;
use crate::infrastructure::workflow::{NodeServices, WorkflowEngine};

/// Arguments for the run command
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Workflow definition file (JSON with `nodes` and `edges`)
    #[arg(long, short)]
    pub workflow: PathBuf,

    /// Input object as inline JSON, or `@path` to read it from a file
    #[arg(long, short)]
    pub input: Option<String>,

    /// Catalog file with agents, models and knowledge bases
    #[arg(long, short)]
    pub catalog: Option<PathBuf>,

    /// Keep running later nodes after a node fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Fail instead of dropping nodes caught in a cycle
    #[arg(long)]
    pub strict: bool,
}

impl RunArgs {
    /// Flags only ever tighten or extend the configured defaults
    fn run_config(&self, config: &AppConfig) -> RunConfig {
        let mut run = config.engine.run_config();
        if self.continue_on_error {
            run = run.continue_on_error(true);
        }
        if self.strict {
            run = run.with_ordering(OrderingMode::Strict);
        }
        run
    }
}

/// Execute the workflow and print the run result as pretty JSON.
///
/// An aborted run still prints its result before returning an error.
pub async fn run(args: RunArgs, config: &AppConfig) -> anyhow::Result<()> {
    let result = execute(&args, config).await?;

    let rendered =
        serde_json::to_string_pretty(&result).context("Failed to serialize run result")?;
    println!("{}", rendered);

    if !result.is_completed() {
        anyhow::bail!(
            "Workflow run aborted: {}",
            result.error.unwrap_or_default()
        );
    }

    Ok(())
}

async fn execute(args: &RunArgs, config: &AppConfig) -> anyhow::Result<WorkflowRunResult> {
    let graph = super::load_workflow(&args.workflow)?;
    let input = parse_input(args.input.as_deref())?;
    let services = build_services(config, args.catalog.as_deref())?;

    info!(
        workflow = %args.workflow.display(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "Running workflow"
    );

    let engine = WorkflowEngine::new(services);
    let result = engine
        .execute(&graph, input, args.run_config(config))
        .await
        .context("Workflow could not be run")?;

    Ok(result)
}

/// `None` means an empty input object
fn parse_input(raw: Option<&str>) -> anyhow::Result<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Object(Default::default()));
    };

    let text = match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path))?,
        None => raw.to_string(),
    };

    let value: Value = serde_json::from_str(&text).context("Input is not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("Input must be a JSON object");
    }

    Ok(value)
}

/// Wire the catalog, providers and HTTP client the handlers need
fn build_services(config: &AppConfig, catalog: Option<&Path>) -> anyhow::Result<NodeServices> {
    let catalog = match catalog {
        Some(path) => InMemoryCatalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => InMemoryCatalog::new(),
    };
    let catalog = Arc::new(catalog);

    let http = HttpClient::with_user_agent(&config.http.user_agent)
        .context("Failed to build HTTP client")?;

    let embeddings = OpenAiEmbeddingProvider::with_base_url(
        http.clone(),
        config.embedding.api_key.as_str(),
        config.embedding.base_url.as_str(),
    )
    .with_model(config.embedding.model.as_str());

    let providers = CatalogProviderResolver::new(http.clone(), config.llm.api_key.as_str())
        .with_default_base_url(config.llm.base_url.as_str());

    Ok(NodeServices {
        agents: catalog.clone(),
        knowledge: catalog,
        embeddings: Arc::new(embeddings),
        providers: Arc::new(providers),
        http: Arc::new(http),
    })
}
