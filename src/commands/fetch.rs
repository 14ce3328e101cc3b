//! The `fetch` command: one-shot aggregation from the terminal

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::models::Platform;
use crate::pipeline::TrendAggregator;
use crate::storage::{MemoryTrendSink, PostgresTrendStore, TrendSink};

/// Run one aggregation and print the report as JSON
pub async fn fetch(platform: Platform, query: String, no_store: bool) -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    let sink: Arc<dyn TrendSink> = if no_store {
        Arc::new(MemoryTrendSink::new())
    } else {
        Arc::new(
            PostgresTrendStore::connect(&config.database)
                .await
                .context("failed to connect to the trend store")?,
        )
    };

    let aggregator = TrendAggregator::new(&config, sink)?;
    let report = aggregator.fetch_and_analyze(platform, &query).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
