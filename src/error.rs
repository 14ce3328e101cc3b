//! Unified error handling for the trendlens crate
//!
//! This module provides a unified error type that consolidates all
//! domain-specific errors into a single `Error` enum, while maintaining
//! the ability to use domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`TrendErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use std::io;
use thiserror::Error;

use crate::models::Platform;

// Re-export domain-specific errors for convenience
pub use crate::analysis::AnalysisError;
pub use crate::sources::SourceError;
pub use crate::storage::StorageError;

/// Common trait for all trendlens error types
pub trait TrendErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later identical call may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Outbound call to a data source failed (timeout, network, non-2xx)
    Transport,
    /// Response shape unexpected or an analysis step failed
    Processing,
    /// Persistence sink errors
    Storage,
    /// API key missing or mismatched
    Auth,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get string representation (used in logs and metrics labels)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Processing => "processing",
            Self::Storage => "storage",
            Self::Auth => "auth",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the trendlens crate
///
/// This enum wraps all domain-specific errors, providing a single error
/// type that can be used across module boundaries while preserving the
/// detailed error information.
#[derive(Error, Debug)]
pub enum Error {
    /// Data-source fetch or decode errors, tagged with the platform
    #[error("{platform} source error: {source}")]
    Source {
        platform: Platform,
        #[source]
        source: SourceError,
    },

    /// Analysis errors, tagged with the platform
    #[error("{platform} analysis error: {source}")]
    Analysis {
        platform: Platform,
        #[source]
        source: AnalysisError,
    },

    /// Persistence sink errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TrendErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Source { source, .. } => source.is_recoverable(),
            Self::Analysis { .. } => false,
            Self::Storage(e) => e.is_recoverable(),
            Self::Json(_) => false,
            Self::Io(_) => true,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Source { source, .. } => source.category(),
            Self::Analysis { .. } => ErrorCategory::Processing,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Processing,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Wrap a source error with its platform
    pub fn source(platform: Platform, source: SourceError) -> Self {
        Self::Source { platform, source }
    }

    /// Wrap an analysis error with its platform
    pub fn analysis(platform: Platform, source: AnalysisError) -> Self {
        Self::Analysis { platform, source }
    }

    /// User-facing message for the HTTP error envelope.
    ///
    /// Transport failures read "fetch failed", everything else on the
    /// aggregation path reads "processing failed", both carrying the
    /// platform name and the underlying message.
    pub fn detail(&self) -> String {
        match self {
            Self::Source { platform, source } if source.category() == ErrorCategory::Transport => {
                format!("{platform} trends fetch failed: {source}")
            }
            Self::Source { platform, source } => {
                format!("{platform} trends processing failed: {source}")
            }
            Self::Analysis { platform, source } => {
                format!("{platform} trends processing failed: {source}")
            }
            other => other.to_string(),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
