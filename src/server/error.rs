use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::generator::LlmError;
use crate::parser::ParserError;

/// Errors surfaced by the HTTP handlers, rendered as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body is malformed or violates a field constraint. HTTP 422.
    #[error("{0}")]
    Validation(String),

    /// No (path, method) pair in the supplied document. HTTP 404.
    #[error("Endpoint {method} {path} not found")]
    EndpointNotFound { method: String, path: String },

    /// The OpenAPI text could not be parsed or one of its `$ref`s resolved. HTTP 500.
    #[error("{context}: {source}")]
    Document {
        context: &'static str,
        #[source]
        source: ParserError,
    },

    /// The completion call failed. HTTP 500.
    #[error("{context}: {source}")]
    Generation {
        context: &'static str,
        #[source]
        source: LlmError,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::EndpointNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Document { .. } | ApiError::Generation { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Malformed bodies, missing fields and mistyped values all count as
/// validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
