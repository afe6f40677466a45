//! Provider trait definitions for vendor integrations
//!
//! The plan provider sits behind [`PlanProvider`] so the session, batching and
//! catalog layers can be exercised without a live vendor.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Provider error types
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    /// Whether the vendor rejected the bearer token on a data call
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ProviderError::ApiError { status: 401, .. })
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

// ============================================================================
// Provider Trait
// ============================================================================

/// eSIM plan provider
#[async_trait]
pub trait PlanProvider: Send + Sync {
    /// Provider code (e.g., "airhub")
    fn code(&self) -> &'static str;

    /// Exchange account credentials for a bearer token
    async fn login(&self, username: &str, password: &str) -> ProviderResult<String>;

    /// Query plans for the given country codes
    ///
    /// Returns the vendor's response body unchanged. An empty `country_codes`
    /// slice is rejected rather than sent, since the vendor may read it as
    /// "every country" and truncate the answer.
    async fn fetch_plans(
        &self,
        token: &str,
        partner_code: &str,
        country_codes: &[String],
    ) -> ProviderResult<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        let unauthorized = ProviderError::ApiError {
            status: 401,
            message: String::new(),
        };
        let server_error = ProviderError::ApiError {
            status: 500,
            message: String::new(),
        };

        assert!(unauthorized.is_unauthorized());
        assert!(!server_error.is_unauthorized());
        assert!(!ProviderError::AuthFailed("bad password".to_string()).is_unauthorized());
    }
}
