//! Rejections produced by the ingress adapters, rendered as `{"error": ..}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Severities the webhook accepts, compared case-insensitively.
pub const VALID_SEVERITIES: [&str; 5] = ["critical", "high", "medium", "low", "info"];

/// Reasons an ingress request is rejected before reaching the service.
#[derive(Error, Debug, PartialEq)]
pub enum IngressError {
    #[error("No JSON payload provided")]
    EmptyPayload,

    #[error("Invalid JSON payload: {0}")]
    MalformedPayload(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Field '{0}' must be a string")]
    NotAString(&'static str),

    #[error("Invalid severity. Must be one of: {}", VALID_SEVERITIES.join(", "))]
    InvalidSeverity,

    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),

    #[error("Invalid Slack request: {0}")]
    Unauthorized(&'static str),
}

impl IngressError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngressError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
