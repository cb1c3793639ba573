//! Common error type and result alias.
//!
//! The `IntoResponse` impl renders every error as the JSON object the
//! browser-facing API promises: `{"error": <message>, "details": <details>}`.
//! Validation problems map to 400, upstream ComfyUI failures to 502, an
//! exhausted polling budget to 504, and everything else to 500.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Duration;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transport-level failure talking to ComfyUI.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// ComfyUI answered with a non-success status.
    #[error("ComfyUI returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// ComfyUI answered 2xx but the body did not carry what it should have.
    #[error("unexpected ComfyUI response: {0}")]
    UpstreamShape(String),

    /// Polling budget exhausted without an output artifact.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// Workflow template could not be filled into valid JSON.
    #[error("workflow template error: {0}")]
    Template(#[from] serde_json::Error),

    /// Bad or missing request fields.
    #[error("{0}")]
    Validation(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::HttpClient(_) | AppError::Upstream { .. } | AppError::UpstreamShape(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Invalid request",
            AppError::HttpClient(_) | AppError::Upstream { .. } | AppError::UpstreamShape(_) => {
                "ComfyUI request failed"
            }
            AppError::Timeout(_) => "Generation timed out",
            AppError::Template(_) => "Failed to prepare workflow",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        let body = json!({
            "error": self.message(),
            "details": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
