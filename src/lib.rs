//! trendlens - Trend Aggregation Backend
//!
//! A backend service that forwards search queries to external trend data
//! sources (Google Trends, Reddit search), computes derived statistics,
//! persists the results, and returns a JSON summary.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//! - [`sources`] - Data-source clients per platform
//! - [`analysis`] - Derived statistics (pure functions of raw data)
//! - [`pipeline`] - The fetch → analyze → persist aggregation pipeline
//! - [`storage`] - Persistence sink (PostgreSQL)
//! - [`server`] - HTTP API (axum)
//! - [`metrics`] - Prometheus metrics
//!
//! # Example
//!
//! ```no_run
//! use trendlens::config::Config;
//! use trendlens::server::{ServerConfig, TrendServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = TrendServer::connect(config, ServerConfig::default()).await?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod commands;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod sources;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result, TrendErrorTrait};
    pub use crate::models::{Platform, TrendRecord, TrendReport};
    pub use crate::pipeline::TrendAggregator;
    pub use crate::server::{ServerConfig, TrendServer};
    pub use crate::storage::TrendSink;
}

// Direct re-exports for convenience
pub use models::{Platform, TrendRecord, TrendReport};
