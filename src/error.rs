// src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Voice platform returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl AnalyticsError {
    /// True when the same request may succeed if issued again later.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalyticsError::Network(_) => true,
            AnalyticsError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            AnalyticsError::Config(_) => "config_error",
            AnalyticsError::Network(_) => "upstream_unreachable",
            AnalyticsError::Api { .. } => "upstream_error",
            AnalyticsError::Decode(_) => "decode_error",
            AnalyticsError::MalformedRecord(_) => "malformed_record",
            AnalyticsError::Cancelled => "cancelled",
            AnalyticsError::InvalidRequest(_) => "invalid_request",
            AnalyticsError::NotFound(_) => "not_found",
        }
    }
}

impl ResponseError for AnalyticsError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        HttpResponse::build(status_code).json(json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "retryable": self.is_transient(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AnalyticsError::Network(_) | AnalyticsError::Api { .. } | AnalyticsError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            AnalyticsError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AnalyticsError::NotFound(_) => StatusCode::NOT_FOUND,
            AnalyticsError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::Decode(err.to_string())
    }
}
