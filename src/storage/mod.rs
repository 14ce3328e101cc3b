//! Persistence sink for trend records
//!
//! The pipeline writes each successful aggregation into a logical
//! `trends` collection, append-only. The sink is abstracted behind the
//! [`TrendSink`] trait so tests can swap in an in-memory implementation
//! and assert on what was written.

use async_trait::async_trait;
use deadpool_postgres::{Config as PoolConfig, ManagerConfig, Pool, RecyclingMethod, Runtime};
use thiserror::Error;
use tokio_postgres::NoTls;

use crate::config::DatabaseConfig;
use crate::models::TrendRecord;

/// Errors that can occur while talking to the persistence sink
#[derive(Error, Debug)]
pub enum StorageError {
    /// Connection pool could not be created
    #[error("failed to create connection pool: {0}")]
    CreatePool(String),

    /// No connection available from the pool
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Query execution failed
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

impl StorageError {
    /// Check if a later identical call may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::CreatePool(_) => false,
            Self::Pool(_) | Self::Postgres(_) => true,
        }
    }
}

/// Append-only sink for trend records
#[async_trait]
pub trait TrendSink: Send + Sync {
    /// Insert a record into the `trends` collection
    async fn insert(&self, record: &TrendRecord) -> Result<(), StorageError>;

    /// Check whether the sink is reachable right now
    async fn is_connected(&self) -> bool;
}

/// PostgreSQL-backed trend store
pub struct PostgresTrendStore {
    pool: Pool,
}

impl PostgresTrendStore {
    /// Create the connection pool and ensure the schema exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let mut cfg = PoolConfig::new();
        cfg.url = Some(config.postgres_url.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(config.pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StorageError::CreatePool(e.to_string()))?;

        let store = Self { pool };
        store.init_schema().await?;

        tracing::info!("PostgreSQL trend store initialized");
        Ok(store)
    }

    /// Create the `trends` table and indexes
    async fn init_schema(&self) -> Result<(), StorageError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StorageError::Pool(e.to_string()))?;

        client
            .batch_execute(
                r#"
                CREATE TABLE IF NOT EXISTS trends (
                    id UUID PRIMARY KEY,
                    platform TEXT NOT NULL,
                    query TEXT NOT NULL,
                    raw JSONB NOT NULL,
                    analysis JSONB NOT NULL,
                    recorded_at TIMESTAMPTZ NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_trends_platform ON trends(platform);
                CREATE INDEX IF NOT EXISTS idx_trends_recorded_at ON trends(recorded_at);
                "#,
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl TrendSink for PostgresTrendStore {
    async fn insert(&self, record: &TrendRecord) -> Result<(), StorageError> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StorageError::Pool(e.to_string()))?;

        let platform = record.platform.as_str();
        client
            .execute(
                "INSERT INTO trends (id, platform, query, raw, analysis, recorded_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &record.id,
                    &platform,
                    &record.query,
                    &record.raw,
                    &record.analysis,
                    &record.recorded_at,
                ],
            )
            .await?;

        Ok(())
    }

    async fn is_connected(&self) -> bool {
        match self.pool.get().await {
            Ok(client) => client.simple_query("SELECT 1").await.is_ok(),
            Err(_) => false,
        }
    }
}

/// In-memory sink used by tests and the no-store CLI path
#[derive(Default)]
pub struct MemoryTrendSink {
    records: std::sync::Mutex<Vec<TrendRecord>>,
}

impl MemoryTrendSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything inserted so far
    pub fn records(&self) -> Vec<TrendRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrendSink for MemoryTrendSink {
    async fn insert(&self, record: &TrendRecord) -> Result<(), StorageError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        true
    }
}

/// Sink that refuses every write, for exercising the best-effort path
pub struct FailingTrendSink;

#[async_trait]
impl TrendSink for FailingTrendSink {
    async fn insert(&self, _record: &TrendRecord) -> Result<(), StorageError> {
        Err(StorageError::Pool("sink unavailable".to_string()))
    }

    async fn is_connected(&self) -> bool {
        false
    }
}
