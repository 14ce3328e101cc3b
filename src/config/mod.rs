//! Configuration management for the trendlens service
//!
//! This module handles loading and validating configuration from environment
//! variables and files. The API key and database URL are required secrets:
//! the process refuses to start without them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Authentication configuration
    pub auth: AuthConfig,

    /// Data-source configuration
    pub sources: SourcesConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret compared against the `api_key` query parameter
    pub api_key: String,
}

/// Data-source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Outbound request timeout in seconds
    pub request_timeout_secs: u64,

    /// Rate limit (requests per second) applied per source client
    pub rate_limit: u32,

    /// User agent string sent to the data sources
    pub user_agent: String,

    /// Google Trends endpoint override (tests point this at a mock server)
    pub google_base_url: Option<String>,

    /// Reddit endpoint override (tests point this at a mock server)
    pub reddit_base_url: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub postgres_url: String,

    /// Maximum pool size
    pub pool_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Fails when `TRENDLENS_API_KEY` or the database URL is absent; a
    /// service started without its secrets would reject every request.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("TRENDLENS_API_KEY")
            .context("TRENDLENS_API_KEY not set in environment")?;

        let postgres_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("POSTGRES_URL"))
            .context("DATABASE_URL (or POSTGRES_URL) not set in environment")?;

        let request_timeout_secs = std::env::var("TRENDLENS_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let rate_limit = std::env::var("TRENDLENS_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(2);

        let user_agent = std::env::var("TRENDLENS_USER_AGENT")
            .unwrap_or_else(|_| format!("trendlens/{}", env!("CARGO_PKG_VERSION")));

        let google_base_url = std::env::var("TRENDLENS_GOOGLE_BASE_URL").ok();
        let reddit_base_url = std::env::var("TRENDLENS_REDDIT_BASE_URL").ok();

        let pool_size = std::env::var("TRENDLENS_DB_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let log_level =
            std::env::var("TRENDLENS_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("TRENDLENS_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        let config = Self {
            auth: AuthConfig { api_key },
            sources: SourcesConfig {
                request_timeout_secs,
                rate_limit,
                user_agent,
                google_base_url,
                reddit_base_url,
            },
            database: DatabaseConfig {
                postgres_url,
                pool_size,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.auth.api_key.is_empty() {
            anyhow::bail!("api_key must not be empty");
        }

        if self.sources.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.sources.rate_limit == 0 {
            anyhow::bail!("rate_limit must be greater than 0");
        }

        if self.database.pool_size == 0 {
            anyhow::bail!("pool_size must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: AuthConfig {
                api_key: String::from("dev-key"),
            },
            sources: SourcesConfig {
                request_timeout_secs: 10,
                rate_limit: 2,
                user_agent: format!("trendlens/{}", env!("CARGO_PKG_VERSION")),
                google_base_url: None,
                reddit_base_url: None,
            },
            database: DatabaseConfig {
                postgres_url: String::from("postgresql://localhost/trendlens"),
                pool_size: 10,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = Config::default();
        config.auth.api_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.sources.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }
}
