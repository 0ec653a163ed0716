use anyhow::Result;
use clap::Parser;
use kendra_loader::query_cli::{run, QueryCli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    kendra_loader::init_tracing();
    tracing::info!("Query tool startup: tracing initialised, environment loaded");

    let cli = QueryCli::parse();
    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Query tool exited with error");
    }
    result
}
