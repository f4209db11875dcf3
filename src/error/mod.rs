//! Error handling module
//!
//! Two layers of errors live here:
//! - [`RemoteError`] describes a single failed lookup against the search API.
//!   It is cheap to clone so the batch layer can attach it to every token
//!   position that shared the failed lookup.
//! - [`AppError`] is the application-wide error with HTTP status mapping and
//!   an RFC 7807 problem body for the JSON API.

pub mod types;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Standard error response format following RFC 7807 Problem Details
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    pub detail: String,

    /// A URI reference that identifies the specific occurrence
    pub instance: String,

    /// Request ID for tracing
    pub request_id: Option<String>,

    /// Additional error-specific properties
    #[serde(flatten)]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

/// A failed call to the explanation search API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response (connect failure, TLS, reset).
    #[error("search request failed: {message}")]
    Transport { message: String },

    /// No response within the configured connect or request timeout.
    #[error("search request timed out: {message}")]
    Timeout { message: String },

    /// The API answered with a non-success status.
    #[error("search API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered 2xx but the body was not JSON.
    #[error("search response could not be decoded: {message}")]
    Decode { message: String },
}

impl RemoteError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// HTTP status reported by the API, if the failure carried one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration validation failed: {message}")]
    ConfigValidation {
        message: String,
        field: Option<String>,
    },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String, line: Option<usize> },

    #[error("Unknown model preset '{name}' (available: {available})")]
    UnknownPreset { name: String, available: String },

    // Request errors
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // Remote API errors
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("HTTP client build error: {message}")]
    HttpClientBuild { message: String },

    // System errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO operation failed: {operation} - {message}")]
    Io { operation: String, message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a new configuration validation error
    pub fn config_validation(message: impl Into<String>, field: Option<impl Into<String>>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            field: field.map(Into::into),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a new internal error with context
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::InvalidRequest { .. } | Self::Serialization { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            Self::ConfigNotFound { .. } | Self::UnknownPreset { .. } => StatusCode::NOT_FOUND,

            // 502 / 504 from the search API
            Self::Remote(RemoteError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Remote(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::ConfigValidation { .. }
            | Self::ConfigParse { .. }
            | Self::HttpClientBuild { .. }
            | Self::Io { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type URI for RFC 7807 compliance
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ConfigValidation { .. } | Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => {
                "https://neuron-lens.dev/errors/configuration"
            }
            Self::UnknownPreset { .. } => "https://neuron-lens.dev/errors/unknown-preset",
            Self::InvalidRequest { .. } | Self::Serialization { .. } => {
                "https://neuron-lens.dev/errors/validation"
            }
            Self::Remote(_) | Self::HttpClientBuild { .. } => "https://neuron-lens.dev/errors/remote",
            _ => "https://neuron-lens.dev/errors/internal",
        }
    }

    /// Get a human-readable title for the error
    pub fn title(&self) -> &'static str {
        match self {
            Self::ConfigValidation { .. } | Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => {
                "Configuration Error"
            }
            Self::UnknownPreset { .. } => "Unknown Model Preset",
            Self::InvalidRequest { .. } | Self::Serialization { .. } => "Validation Error",
            Self::Remote(_) | Self::HttpClientBuild { .. } => "Explanation Search Error",
            _ => "Internal Server Error",
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self, request_id: Option<&str>) {
        let request_id = request_id.unwrap_or("unknown");

        if self.status_code().is_server_error() {
            error!(
                error = %self,
                request_id = request_id,
                error_type = self.error_type(),
                "Application error occurred"
            );
        } else {
            warn!(
                error = %self,
                request_id = request_id,
                error_type = self.error_type(),
                "Client error occurred"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();

        self.log(Some(&request_id));

        let status = self.status_code();
        let mut extensions = serde_json::Map::new();
        if let Self::Remote(remote) = &self {
            if let Some(upstream) = remote.upstream_status() {
                extensions.insert("upstream_status".to_string(), upstream.into());
            }
        }

        let error_response = ErrorResponse {
            error_type: self.error_type().to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail: self.to_string(),
            instance: format!("/errors/{request_id}"),
            request_id: Some(request_id),
            extensions,
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;
