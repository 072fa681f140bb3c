use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Message returned to callers when `/proxy` is hit without `endpoint`.
pub const MISSING_ENDPOINT_MESSAGE: &str = "Endpoint query parameter is required";

/// Message returned to callers when no upstream API key is configured.
pub const MISSING_API_KEY_MESSAGE: &str = "API key is not configured on the server.";

const GENERIC_ERROR_MESSAGE: &str = "Internal Server Error";

/// Unified application error.
///
/// Every variant is terminal for the request that raised it. None of them
/// is retried and none of them touches the response cache.
#[derive(Debug, Error)]
pub enum AppError {
    /// The caller omitted or malformed a required input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required server-side setting (the API key) is missing.
    #[error("Config error: {0}")]
    Config(String),

    /// Upstream answered with a non-2xx status.
    #[error("Upstream returned HTTP {status}")]
    Upstream { status: u16, body: Value },

    /// Upstream could not be reached at all.
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream claimed success but the body was not the JSON we expected.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Network(_) | AppError::Parse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// JSON body sent back to the caller. Network and parse details stay in
    /// the server log.
    pub fn body(&self) -> Value {
        match self {
            AppError::Validation(msg) | AppError::Config(msg) | AppError::NotFound(msg) => {
                json!({ "error": msg })
            }
            AppError::Upstream { body, .. } => json!({ "error": body }),
            AppError::Network(_) | AppError::Parse(_) => json!({ "error": GENERIC_ERROR_MESSAGE }),
        }
    }

    /// Build an `Upstream` error from a raw response body. Empty bodies fall
    /// back to the generic message; non-JSON bodies are passed as a string.
    pub fn upstream(status: u16, raw_body: &[u8]) -> Self {
        let body = if raw_body.iter().all(u8::is_ascii_whitespace) {
            Value::String(GENERIC_ERROR_MESSAGE.to_string())
        } else {
            serde_json::from_slice(raw_body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(raw_body).into_owned())
            })
        };
        AppError::Upstream { status, body }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Network(msg) | AppError::Parse(msg) => {
                tracing::error!("{}", self);
                tracing::debug!("Suppressed error detail: {}", msg);
            }
            AppError::Upstream { status, .. } => {
                tracing::warn!("Upstream error passed through to caller (HTTP {})", status);
            }
            _ => {}
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}
