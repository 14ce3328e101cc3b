//! HTTP server for the trendlens API
//!
//! Serves the trend aggregation endpoints behind query-parameter API
//! key authentication, plus liveness, health, metrics, and an optional
//! redacted config debug route.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Trendlens Server             │
//! │                                         │
//! │  GET /                     liveness     │
//! │  GET /api/health           health       │
//! │  GET /api/google-trends    aggregation  │
//! │  GET /api/reddit-trends    aggregation  │
//! │  GET /api/debug/env        (optional)   │
//! │  GET /metrics              prometheus   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use trendlens::config::Config;
//! use trendlens::server::{ServerConfig, TrendServer};
//!
//! let config = Config::from_env()?;
//! let server = TrendServer::connect(config, ServerConfig::default()).await?;
//! server.start().await?;
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod server;

// Re-export main types
pub use api::create_router;
pub use auth::{verify_api_key, AuthRejection};
pub use config::ServerConfig;
pub use server::{AppState, TrendServer};
