//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_core::RelayError;
use serde_json::json;
use thiserror::Error;

/// Error returned by route handlers. Rendered as `{"detail": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A lookup in the directory or message log missed.
    #[error(transparent)]
    Relay(#[from] RelayError),
    /// The request was well-formed HTTP but semantically invalid.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Relay(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message.
    pub fn detail(&self) -> String {
        match self {
            Self::Relay(e) => e.detail().to_owned(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}
