//! Query-parameter API key verification
//!
//! Callers authenticate with an `api_key` query parameter compared by
//! exact string match against the configured secret. Verification runs
//! before any outbound call: a rejected request never touches a data
//! source.

/// Why a request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MissingKey,
    InvalidKey,
}

impl AuthRejection {
    /// User-facing message for the error envelope
    pub fn detail(&self) -> &'static str {
        match self {
            Self::MissingKey => "Missing API key",
            Self::InvalidKey => "Invalid API key",
        }
    }
}

/// Verify the provided key against the configured secret
pub fn verify_api_key(expected: &str, provided: Option<&str>) -> Result<(), AuthRejection> {
    match provided {
        None => Err(AuthRejection::MissingKey),
        Some(key) if key == expected => Ok(()),
        Some(_) => Err(AuthRejection::InvalidKey),
    }
}
