//! Data-source clients for the supported platforms
//!
//! Each platform gets a dedicated client that performs a single fetch with
//! a fixed timeout and decodes the response into an explicit typed shape.
//! No retries and no caching: the aggregation pipeline is a pure function
//! of whatever the source returned at call time.

pub mod google;
pub mod reddit;

pub use google::{
    GoogleRaw, GoogleTrendsClient, InterestPoint, InterestSeries, RegionInterest, RelatedQueries,
    RelatedQuery,
};
pub use reddit::{RedditPost, RedditSearchClient};

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that can occur while fetching or decoding source data
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("request timeout")]
    Timeout,

    /// Non-success status code from the source
    #[error("server returned status {0}")]
    Status(u16),

    /// Response did not match the expected shape
    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl SourceError {
    /// Check if a later identical call may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Status(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }

    /// Classify for the unified error taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::Timeout | Self::Status(_) => ErrorCategory::Transport,
            Self::Decode(_) | Self::InvalidUrl(_) => ErrorCategory::Processing,
        }
    }
}

/// Map a reqwest error, surfacing timeouts as their own variant
pub(crate) fn map_send_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Http(err)
    }
}

/// Build the shared HTTP client used by the source clients
pub(crate) fn build_client(timeout: Duration, cookies: bool) -> Result<Client, SourceError> {
    Ok(Client::builder()
        .timeout(timeout)
        .gzip(true)
        .cookie_store(cookies)
        .build()?)
}
