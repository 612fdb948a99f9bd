use crate::cli::CheckArgs;
use crate::llm::{validate_connection, CallExecutor, OpenAiClient};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

pub async fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let config = super::run::load_or_default(&args.config)?;

    let api_key = config.api_key()?;
    let client = Arc::new(OpenAiClient::new(&config.llm, api_key)?);
    let executor = CallExecutor::new(client, config.retry.clone());

    info!(
        "Checking connection to {} (model {})",
        config.llm.endpoint, config.llm.model
    );
    validate_connection(&executor)
        .await
        .context("connection check failed")?;

    println!(
        "OK: endpoint and model '{}' are reachable",
        config.llm.model
    );
    Ok(())
}
