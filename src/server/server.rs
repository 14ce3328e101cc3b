//! Trendlens server implementation
//!
//! Wires the aggregation pipeline, the persistence sink, and the HTTP
//! router into one process with graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::pipeline::TrendAggregator;
use crate::storage::{PostgresTrendStore, TrendSink};

use super::api::create_router;
use super::config::ServerConfig;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
///
/// All dependencies are constructed once at process start and injected;
/// handlers never reach for ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// Aggregation pipeline
    pub aggregator: Arc<TrendAggregator>,

    /// Persistence sink (health checks probe it directly)
    pub sink: Arc<dyn TrendSink>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Server configuration
    pub server: ServerConfig,
}

impl AppState {
    /// Build state from config with an explicit sink
    pub fn new(
        config: Config,
        server: ServerConfig,
        sink: Arc<dyn TrendSink>,
    ) -> Result<Self, ServerError> {
        let aggregator = TrendAggregator::new(&config, sink.clone())
            .map_err(|e| ServerError::InitError(e.to_string()))?;

        Ok(Self {
            aggregator: Arc::new(aggregator),
            sink,
            config: Arc::new(config),
            server,
        })
    }
}

// ============================================================================
// Trend Server
// ============================================================================

/// Main trendlens server
pub struct TrendServer {
    state: AppState,
}

impl TrendServer {
    /// Create a server backed by a PostgreSQL trend store
    pub async fn connect(config: Config, server: ServerConfig) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let store = PostgresTrendStore::connect(&config.database)
            .await
            .map_err(|e| ServerError::StorageError(e.to_string()))?;

        let state = AppState::new(config, server, Arc::new(store))?;
        Ok(Self { state })
    }

    /// Create a server around existing state (tests inject mock sinks here)
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.state.server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.state.server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.state.server.bind_address;

        tracing::info!("Starting trendlens server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        Ok(())
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.state.server.bind_address;

        tracing::info!(
            "Starting trendlens server on {} (with graceful shutdown)",
            addr
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("Trendlens server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.state.server.bind_address,
            cors_enabled: self.state.server.enable_cors,
            request_logging_enabled: self.state.server.enable_request_logging,
            debug_routes_enabled: self.state.server.enable_debug_routes,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
    pub debug_routes_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Trendlens Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             CORS: {}\n\
             Request Logging: {}\n\
             Debug Routes: {}",
            "",
            self.bind_address,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" },
            if self.debug_routes_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Initialization error
    InitError(String),

    /// Persistence sink could not be prepared
    StorageError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InitError(msg) => write!(f, "Initialization error: {}", msg),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTrendSink;

    fn test_state() -> AppState {
        AppState::new(
            Config::default(),
            ServerConfig::default(),
            Arc::new(MemoryTrendSink::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_server_from_state() {
        let server = TrendServer::from_state(test_state());
        let info = server.info();

        assert!(info.cors_enabled);
        assert!(!info.debug_routes_enabled);
    }

    #[test]
    fn test_server_info_with_custom_config() {
        let state = AppState::new(
            Config::default(),
            ServerConfig::builder()
                .enable_cors(false)
                .enable_debug_routes(true)
                .build()
                .unwrap(),
            Arc::new(MemoryTrendSink::new()),
        )
        .unwrap();

        let info = TrendServer::from_state(state).info();
        assert!(!info.cors_enabled);
        assert!(info.debug_routes_enabled);
    }

    #[tokio::test]
    async fn test_state_sink_is_shared() {
        let state = test_state();
        assert!(state.sink.is_connected().await);
    }
}
