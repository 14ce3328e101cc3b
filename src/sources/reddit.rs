//! Reddit search client using the public listing JSON endpoint
//!
//! Reddit exposes search results as JSON at `/search.json` without
//! authentication, as long as requests carry a descriptive User-Agent.
//! The client performs one search per call: hot-sorted, capped at 20
//! posts, fixed timeout, no retries.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{build_client, map_send_error, SourceError};

const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
const SEARCH_PATH: &str = "/search.json";

/// Number of posts requested per search
const SEARCH_LIMIT: u32 = 20;

/// A Reddit post as returned by the listing endpoint.
///
/// Only the fields the pipeline consumes are modeled. `title`, `score`,
/// `num_comments` and `created_utc` are required: a listing without them
/// is malformed and fails the decode. The rest default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPost {
    pub title: String,

    #[serde(default)]
    pub selftext: String,

    pub score: i64,

    pub num_comments: i64,

    /// Unix timestamp (seconds, fractional) of post creation
    pub created_utc: f64,

    #[serde(default)]
    pub subreddit: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub permalink: String,

    #[serde(default)]
    pub url: String,
}

// Listing envelope: { data: { children: [ { data: post } ] } }

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: RedditPost,
}

/// Reddit public search client
pub struct RedditSearchClient {
    client: Client,

    /// Rate limiter to stay inside Reddit's unauthenticated quota
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    base_url: String,

    user_agent: String,
}

impl RedditSearchClient {
    /// Create a new client with default settings
    pub fn new(
        requests_per_second: u32,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, SourceError> {
        let client = build_client(timeout, false)?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::new(1).unwrap());
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    /// Create a client pointing at a custom base URL (mock servers in tests)
    pub fn with_base_url(
        base_url: &str,
        requests_per_second: u32,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, SourceError> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut client = Self::new(requests_per_second, timeout, user_agent)?;
        client.base_url = parsed.as_str().trim_end_matches('/').to_string();
        Ok(client)
    }

    /// Search hot posts matching the query, up to 20 results
    pub async fn search(&self, query: &str) -> Result<Vec<RedditPost>, SourceError> {
        self.rate_limiter.until_ready().await;

        let limit = SEARCH_LIMIT.to_string();
        let url = format!("{}{}", self.base_url, SEARCH_PATH);

        let response = self
            .client
            .get(&url)
            .headers(self.build_headers())
            .query(&[("q", query), ("sort", "hot"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .collect())
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        headers
    }
}
