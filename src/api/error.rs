//! Handler error type
//!
//! Every failure leaves the service as `{"error": string, "details"?: any}`.
//! Vendor failures keep the vendor's status where it is a real error status.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::config::MissingSettings;
use crate::providers::ProviderError;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Config(String),

    #[error("{message}")]
    Auth { message: String, details: Option<Value> },

    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Internal { message: String, details: Option<Value> },
}

/// Vendor body excerpts are JSON when they parse, text otherwise
fn details_from(body: &str) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            details: None,
        }
    }

    /// Same message and details, reported as a plain 500
    pub fn into_internal(self) -> Self {
        match self {
            internal @ ApiError::Internal { .. } => internal,
            ApiError::Auth { message, details }
            | ApiError::Upstream { message, details, .. } => ApiError::Internal { message, details },
            other => ApiError::internal(other.to_string()),
        }
    }

    /// Replace the message of a vendor failure, keeping status and details
    pub fn context(self, context: &str) -> Self {
        match self {
            ApiError::Auth { details, .. } => ApiError::Auth {
                message: context.to_string(),
                details,
            },
            ApiError::Upstream { status, details, .. } => ApiError::Upstream {
                status,
                message: context.to_string(),
                details,
            },
            other => other,
        }
    }

    fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Auth { details, .. }
            | ApiError::Upstream { details, .. }
            | ApiError::Internal { details, .. } => details.as_ref(),
            ApiError::Config(_) | ApiError::Validation(_) => None,
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NotConfigured(message) => ApiError::Config(message),
            ProviderError::AuthFailed(body) => ApiError::Auth {
                message: "plan provider login failed".to_string(),
                details: details_from(&body),
            },
            ProviderError::ApiError { status, message } => ApiError::Upstream {
                status,
                message: "upstream request failed".to_string(),
                details: details_from(&message),
            },
            ProviderError::RateLimited { retry_after_secs } => ApiError::Upstream {
                status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                message: "upstream rate limit exceeded".to_string(),
                details: Some(serde_json::json!({ "retry_after_secs": retry_after_secs })),
            },
            ProviderError::InvalidRequest(message) => ApiError::Validation(message),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<MissingSettings> for ApiError {
    fn from(missing: MissingSettings) -> Self {
        ApiError::Config(missing.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Config(_) | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
            details: self.details().cloned(),
        })
    }
}
