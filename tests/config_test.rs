//! Tests for environment-driven configuration loading
//!
//! Env vars are process-global, so these tests run serially.

use serial_test::serial;
use trendlens::config::Config;

fn clear_env() {
    for key in [
        "TRENDLENS_API_KEY",
        "DATABASE_URL",
        "POSTGRES_URL",
        "TRENDLENS_REQUEST_TIMEOUT",
        "TRENDLENS_RATE_LIMIT",
        "TRENDLENS_USER_AGENT",
        "TRENDLENS_GOOGLE_BASE_URL",
        "TRENDLENS_REDDIT_BASE_URL",
        "TRENDLENS_DB_POOL_SIZE",
        "TRENDLENS_LOG_LEVEL",
        "TRENDLENS_LOG_FORMAT",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn from_env_requires_api_key() {
    clear_env();
    std::env::set_var("DATABASE_URL", "postgresql://localhost/trendlens");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("TRENDLENS_API_KEY"));
}

#[test]
#[serial]
fn from_env_requires_database_url() {
    clear_env();
    std::env::set_var("TRENDLENS_API_KEY", "secret");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("DATABASE_URL"));
}

#[test]
#[serial]
fn from_env_loads_required_values() {
    clear_env();
    std::env::set_var("TRENDLENS_API_KEY", "secret");
    std::env::set_var("DATABASE_URL", "postgresql://localhost/trendlens");

    let config = Config::from_env().unwrap();
    assert_eq!(config.auth.api_key, "secret");
    assert_eq!(config.database.postgres_url, "postgresql://localhost/trendlens");

    // Defaults
    assert_eq!(config.sources.request_timeout_secs, 10);
    assert_eq!(config.sources.rate_limit, 2);
    assert_eq!(config.database.pool_size, 10);
    assert_eq!(config.logging.level, "info");
}

#[test]
#[serial]
fn from_env_accepts_postgres_url_alias() {
    clear_env();
    std::env::set_var("TRENDLENS_API_KEY", "secret");
    std::env::set_var("POSTGRES_URL", "postgresql://db.internal/trends");

    let config = Config::from_env().unwrap();
    assert_eq!(config.database.postgres_url, "postgresql://db.internal/trends");
}

#[test]
#[serial]
fn from_env_honors_overrides() {
    clear_env();
    std::env::set_var("TRENDLENS_API_KEY", "secret");
    std::env::set_var("DATABASE_URL", "postgresql://localhost/trendlens");
    std::env::set_var("TRENDLENS_REQUEST_TIMEOUT", "5");
    std::env::set_var("TRENDLENS_RATE_LIMIT", "7");
    std::env::set_var("TRENDLENS_USER_AGENT", "custom-agent/2.0");
    std::env::set_var("TRENDLENS_REDDIT_BASE_URL", "http://localhost:9999");

    let config = Config::from_env().unwrap();
    assert_eq!(config.sources.request_timeout_secs, 5);
    assert_eq!(config.sources.rate_limit, 7);
    assert_eq!(config.sources.user_agent, "custom-agent/2.0");
    assert_eq!(
        config.sources.reddit_base_url.as_deref(),
        Some("http://localhost:9999")
    );

    clear_env();
}

#[test]
#[serial]
fn config_file_roundtrip() {
    clear_env();

    let toml = r#"
[auth]
api_key = "file-secret"

[sources]
request_timeout_secs = 8
rate_limit = 3
user_agent = "trendlens-file/1.0"

[database]
postgres_url = "postgresql://localhost/trendlens"
pool_size = 4

[logging]
level = "debug"
format = "json"
"#;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trendlens.toml");
    std::fs::write(&path, toml).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.auth.api_key, "file-secret");
    assert_eq!(config.sources.request_timeout_secs, 8);
    assert_eq!(config.database.pool_size, 4);
    assert_eq!(config.logging.format, "json");
}
