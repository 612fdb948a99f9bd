use crate::cli::RunArgs;
use crate::config::Config;
use crate::llm::{validate_connection, CallExecutor, OpenAiClient};
use crate::loader::load_records;
use crate::output::write_result_table;
use crate::processor::RecordProcessor;
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let mut config = load_or_default(&args.config)?;

    // Apply CLI overrides
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(output) = args.output {
        config.output = Some(output);
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(model) = args.model {
        config.llm.model = model;
    }

    let api_key = config.api_key()?;
    let client = Arc::new(OpenAiClient::new(&config.llm, api_key)?);
    let executor = CallExecutor::new(client, config.retry.clone());

    // A bad credential or model name fails everything; find out before
    // burning through the inventory.
    info!(
        "Checking connection to {} (model {})",
        config.llm.endpoint, config.llm.model
    );
    validate_connection(&executor)
        .await
        .context("startup connection check failed")?;

    let records = load_records(&config.input)?;
    if records.is_empty() {
        warn!("Input contains no control records; writing an empty result table");
    }

    let start = std::time::Instant::now();
    let processor = RecordProcessor::new(executor, config.concurrency);
    let table = processor.process_all(records).await;

    let output = config.output_path();
    write_result_table(&output, &table)?;

    info!(
        "Analyzed {} controls in {:.1}s; results at {}",
        table.len(),
        start.elapsed().as_secs_f64(),
        output.display()
    );
    Ok(())
}

pub(super) fn load_or_default(path: &std::path::Path) -> anyhow::Result<Config> {
    if path.exists() {
        info!("Loading config from {:?}", path);
        Ok(Config::load(path)?)
    } else {
        info!("No config file at {:?}, using defaults", path);
        Ok(Config::default())
    }
}
