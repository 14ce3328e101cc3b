//! The trend aggregation pipeline
//!
//! One call = one fetch from the platform's data source, one pure
//! analysis pass over the raw data, and one best-effort write to the
//! persistence sink. No retries, no caching, no state between calls.

use std::sync::Arc;
use std::time::Instant;

use crate::analysis;
use crate::config::Config;
use crate::error::{Error, Result, TrendErrorTrait};
use crate::metrics;
use crate::models::{Platform, TrendRecord, TrendReport};
use crate::sources::{GoogleTrendsClient, RedditSearchClient};
use crate::storage::TrendSink;

/// Aggregates trend data from the supported platforms.
///
/// Clients and the sink are constructed once at process start and
/// injected; the aggregator itself holds no mutable state.
pub struct TrendAggregator {
    google: GoogleTrendsClient,
    reddit: RedditSearchClient,
    sink: Arc<dyn TrendSink>,
}

impl TrendAggregator {
    /// Build the aggregator from config, wiring both source clients
    pub fn new(config: &Config, sink: Arc<dyn TrendSink>) -> Result<Self> {
        let timeout = config.request_timeout();
        let rate = config.sources.rate_limit;

        let google = match &config.sources.google_base_url {
            Some(base) => GoogleTrendsClient::with_base_url(base, rate, timeout),
            None => GoogleTrendsClient::new(rate, timeout),
        }
        .map_err(|e| Error::source(Platform::Google, e))?;

        let reddit = match &config.sources.reddit_base_url {
            Some(base) => {
                RedditSearchClient::with_base_url(base, rate, timeout, &config.sources.user_agent)
            }
            None => RedditSearchClient::new(rate, timeout, &config.sources.user_agent),
        }
        .map_err(|e| Error::source(Platform::Reddit, e))?;

        Ok(Self {
            google,
            reddit,
            sink,
        })
    }

    /// Fetch raw data for the query, derive its analysis, and best-effort
    /// persist the combined record.
    pub async fn fetch_and_analyze(&self, platform: Platform, query: &str) -> Result<TrendReport> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::other("query must not be empty"));
        }

        tracing::info!(platform = %platform, query = %query, "starting aggregation");

        let start = Instant::now();
        let result = match platform {
            Platform::Google => self.aggregate_google(query).await,
            Platform::Reddit => self.aggregate_reddit(query).await,
        };
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok((_, _)) => metrics::record_fetch(platform, "success", elapsed),
            Err(e) => metrics::record_fetch(platform, e.category().as_str(), elapsed),
        }

        let (report, persist) = result?;

        if persist {
            self.persist(query, &report).await;
        }

        tracing::info!(
            platform = %platform,
            query = %query,
            elapsed_secs = %format!("{elapsed:.3}"),
            "aggregation complete"
        );

        Ok(report)
    }

    /// Google: interest series, related queries, regions; rising-keyword
    /// analysis. An empty series is a valid outcome with empty rankings.
    async fn aggregate_google(&self, query: &str) -> Result<(TrendReport, bool)> {
        let raw = self
            .google
            .fetch(query)
            .await
            .map_err(|e| Error::source(Platform::Google, e))?;

        let analysis =
            analysis::google::analyze(&raw).map_err(|e| Error::analysis(Platform::Google, e))?;

        let report = TrendReport {
            platform: Platform::Google,
            raw: serde_json::to_value(&raw)?,
            analysis: serde_json::to_value(&analysis)?,
        };

        Ok((report, true))
    }

    /// Reddit: hot search posts; top-post and keyword-frequency analysis.
    /// Zero posts is a valid outcome and skips the persistence write.
    async fn aggregate_reddit(&self, query: &str) -> Result<(TrendReport, bool)> {
        let posts = self
            .reddit
            .search(query)
            .await
            .map_err(|e| Error::source(Platform::Reddit, e))?;

        let analysis = analysis::reddit::analyze(&posts);
        let persist = !posts.is_empty();

        let report = TrendReport {
            platform: Platform::Reddit,
            raw: serde_json::to_value(&posts)?,
            analysis: serde_json::to_value(&analysis)?,
        };

        Ok((report, persist))
    }

    /// Best-effort write: an unreachable sink must not fail the request
    async fn persist(&self, query: &str, report: &TrendReport) {
        let record = TrendRecord::from_report(query, report);

        if let Err(e) = self.sink.insert(&record).await {
            metrics::record_persist_failure();
            tracing::warn!(
                platform = %record.platform,
                query = %record.query,
                error = %e,
                "failed to persist trend record"
            );
        }
    }
}
