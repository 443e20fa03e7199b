use anyhow::Context;
use clap::Parser;
use workflow_engine::cli::{self, Cli, Command};
use workflow_engine::infrastructure::logging;
use workflow_engine::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    match cli.command {
        Command::Run(args) => cli::run::run(args, &config).await,
        Command::Order(args) => cli::order::run(args, &config).await,
    }
}
