//! Google Trends client using the unofficial widget API
//!
//! Google Trends has no official API. The web UI drives a two-step widget
//! protocol: an `explore` call returns per-widget tokens, and each widget
//! endpoint (`multiline`, `relatedsearches`, `comparedgeo`) returns the
//! actual data when called with its token and request blob. Responses are
//! prefixed with an anti-JSON-hijacking garbage sequence (`)]}',`) that
//! must be stripped before parsing.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{build_client, map_send_error, SourceError};

const DEFAULT_BASE_URL: &str = "https://trends.google.com";
const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";
const RELATED_PATH: &str = "/trends/api/widgetdata/relatedsearches";
const GEO_PATH: &str = "/trends/api/widgetdata/comparedgeo";

/// Interest window requested from the source
const TIMEFRAME: &str = "today 5-y";

/// Pool of realistic User-Agent strings for rotation.
///
/// The widget API serves browser traffic; obvious non-browser agents get
/// rate limited much earlier.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

// ============================================================================
// Raw result types
// ============================================================================

/// Raw Google Trends data for a single query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleRaw {
    pub interest_over_time: InterestSeries,
    pub related_queries: RelatedQueries,
    pub interest_by_region: Vec<RegionInterest>,
}

/// Interest-over-time series: one value column per keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestSeries {
    /// Column labels, one per requested keyword
    pub keywords: Vec<String>,

    /// Chronological data points
    pub points: Vec<InterestPoint>,
}

impl InterestSeries {
    /// Series with no data points (valid "no interest recorded" outcome)
    pub fn empty(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One sample of the interest series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestPoint {
    /// Unix timestamp (seconds) of the sample
    pub time: i64,

    /// Human-readable time label from the source
    pub formatted_time: String,

    /// One value per keyword column, aligned with `InterestSeries::keywords`
    pub values: Vec<f64>,

    /// Whether the sample covers a period still in progress
    pub is_partial: bool,
}

/// Related query suggestions, split the way the source ranks them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedQueries {
    pub top: Vec<RelatedQuery>,
    pub rising: Vec<RelatedQuery>,
}

/// A single related query with its relative interest value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedQuery {
    pub query: String,
    pub value: f64,
}

/// Interest broken down by region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInterest {
    pub region: String,
    pub value: f64,
}

// ============================================================================
// Wire-format envelopes (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    token: Option<String>,
    request: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MultilineEnvelope {
    default: MultilineData,
}

#[derive(Debug, Deserialize)]
struct MultilineData {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    time: String,
    #[serde(rename = "formattedTime")]
    formatted_time: String,
    #[serde(default)]
    value: Vec<f64>,
    #[serde(rename = "isPartial", default)]
    is_partial: bool,
}

#[derive(Debug, Deserialize)]
struct RelatedEnvelope {
    default: RelatedData,
}

#[derive(Debug, Deserialize)]
struct RelatedData {
    #[serde(rename = "rankedList", default)]
    ranked_list: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
struct RankedList {
    #[serde(rename = "rankedKeyword", default)]
    ranked_keyword: Vec<RankedKeyword>,
}

#[derive(Debug, Deserialize)]
struct RankedKeyword {
    query: String,
    #[serde(default)]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct GeoEnvelope {
    default: GeoData,
}

#[derive(Debug, Deserialize)]
struct GeoData {
    #[serde(rename = "geoMapData", default)]
    geo_map_data: Vec<GeoMapEntry>,
}

#[derive(Debug, Deserialize)]
struct GeoMapEntry {
    #[serde(rename = "geoName")]
    geo_name: String,
    #[serde(default)]
    value: Vec<f64>,
}

// ============================================================================
// Client
// ============================================================================

/// Google Trends widget-API client
///
/// Performs a single explore call followed by the three widget-data calls
/// for one keyword. One attempt per call, fixed timeout, no retries.
pub struct GoogleTrendsClient {
    client: Client,

    /// Rate limiter to control request frequency against the widget API
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    base_url: String,

    /// Interface language parameter (`hl`)
    hl: String,

    /// Timezone offset in minutes (`tz`)
    tz: i32,
}

impl GoogleTrendsClient {
    /// Create a new client with default settings
    pub fn new(requests_per_second: u32, timeout: Duration) -> Result<Self, SourceError> {
        // Cookie continuity matters here: the explore call sets a NID
        // cookie the widget endpoints expect.
        let client = build_client(timeout, true)?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::new(1).unwrap());
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            base_url: DEFAULT_BASE_URL.to_string(),
            hl: "en-US".to_string(),
            tz: 360,
        })
    }

    /// Create a client pointing at a custom base URL (mock servers in tests)
    pub fn with_base_url(
        base_url: &str,
        requests_per_second: u32,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut client = Self::new(requests_per_second, timeout)?;
        client.base_url = parsed.as_str().trim_end_matches('/').to_string();
        Ok(client)
    }

    /// Fetch the full raw payload for a single keyword
    pub async fn fetch(&self, query: &str) -> Result<GoogleRaw, SourceError> {
        let widgets = self.explore(query).await?;

        let timeseries = self.find_widget(&widgets, "TIMESERIES")?;
        let related = self.find_widget(&widgets, "RELATED_QUERIES")?;
        let geo = self.find_widget(&widgets, "GEO_MAP")?;

        let (interest, related_queries, regions) = futures::try_join!(
            self.fetch_interest_over_time(query, timeseries),
            self.fetch_related_queries(related),
            self.fetch_interest_by_region(geo),
        )?;

        Ok(GoogleRaw {
            interest_over_time: interest,
            related_queries,
            interest_by_region: regions,
        })
    }

    /// Explore call: resolve widget tokens for the keyword
    async fn explore(&self, query: &str) -> Result<Vec<Widget>, SourceError> {
        let req = serde_json::json!({
            "comparisonItem": [{
                "keyword": query,
                "geo": "",
                "time": TIMEFRAME,
            }],
            "category": 0,
            "property": "",
        });

        let body = self
            .get(EXPLORE_PATH, &[("req", req.to_string().as_str())])
            .await?;

        let parsed: ExploreResponse = parse_prefixed_json(&body)?;
        Ok(parsed.widgets)
    }

    fn find_widget<'a>(&self, widgets: &'a [Widget], id: &str) -> Result<&'a Widget, SourceError> {
        widgets
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| SourceError::Decode(format!("missing {id} widget in explore response")))
    }

    async fn fetch_interest_over_time(
        &self,
        query: &str,
        widget: &Widget,
    ) -> Result<InterestSeries, SourceError> {
        let body = self.fetch_widget(MULTILINE_PATH, widget).await?;
        let parsed: MultilineEnvelope = parse_prefixed_json(&body)?;

        let keywords = vec![query.to_string()];
        let mut points = Vec::with_capacity(parsed.default.timeline_data.len());

        for entry in parsed.default.timeline_data {
            let time = entry.time.parse::<i64>().map_err(|_| {
                SourceError::Decode(format!("non-numeric timeline timestamp: {}", entry.time))
            })?;

            if entry.value.len() != keywords.len() {
                return Err(SourceError::Decode(format!(
                    "timeline value count {} does not match keyword count {}",
                    entry.value.len(),
                    keywords.len()
                )));
            }

            points.push(InterestPoint {
                time,
                formatted_time: entry.formatted_time,
                values: entry.value,
                is_partial: entry.is_partial,
            });
        }

        Ok(InterestSeries { keywords, points })
    }

    async fn fetch_related_queries(&self, widget: &Widget) -> Result<RelatedQueries, SourceError> {
        let body = self.fetch_widget(RELATED_PATH, widget).await?;
        let parsed: RelatedEnvelope = parse_prefixed_json(&body)?;

        let mut lists = parsed.default.ranked_list.into_iter();
        let top = lists.next().map(convert_ranked).unwrap_or_default();
        let rising = lists.next().map(convert_ranked).unwrap_or_default();

        Ok(RelatedQueries { top, rising })
    }

    async fn fetch_interest_by_region(
        &self,
        widget: &Widget,
    ) -> Result<Vec<RegionInterest>, SourceError> {
        let body = self.fetch_widget(GEO_PATH, widget).await?;
        let parsed: GeoEnvelope = parse_prefixed_json(&body)?;

        Ok(parsed
            .default
            .geo_map_data
            .into_iter()
            .map(|entry| RegionInterest {
                region: entry.geo_name,
                value: entry.value.first().copied().unwrap_or(0.0),
            })
            .collect())
    }

    /// Widget-data call with the widget's token and request blob
    async fn fetch_widget(&self, path: &str, widget: &Widget) -> Result<String, SourceError> {
        let token = widget.token.as_deref().ok_or_else(|| {
            SourceError::Decode(format!("widget {} carries no token", widget.id))
        })?;
        let request = widget.request.as_ref().ok_or_else(|| {
            SourceError::Decode(format!("widget {} carries no request", widget.id))
        })?;

        self.get(
            path,
            &[("req", request.to_string().as_str()), ("token", token)],
        )
        .await
    }

    /// Single GET against the widget API with common parameters
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<String, SourceError> {
        self.rate_limiter.until_ready().await;

        let tz = self.tz.to_string();
        let mut query: Vec<(&str, &str)> = vec![("hl", self.hl.as_str()), ("tz", tz.as_str())];
        query.extend_from_slice(params);

        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .headers(self.build_headers())
            .query(&query)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        response.text().await.map_err(map_send_error)
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .unwrap_or(&USER_AGENTS[0]);

        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, value);
        }
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        headers
    }
}

/// Convert a ranked keyword list, keeping the source order
fn convert_ranked(list: RankedList) -> Vec<RelatedQuery> {
    list.ranked_keyword
        .into_iter()
        .map(|k| RelatedQuery {
            query: k.query,
            value: k.value,
        })
        .collect()
}

/// Strip the `)]}',` anti-hijacking prefix and parse the remainder
fn parse_prefixed_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    let start = body
        .find(['{', '['])
        .ok_or_else(|| SourceError::Decode("no JSON payload in response".to_string()))?;

    serde_json::from_str(&body[start..]).map_err(|e| SourceError::Decode(e.to_string()))
}
