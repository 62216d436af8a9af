//! Page-level errors with HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::actions::ActionError;
use crate::api::pages;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Backend unavailable: {0}")]
    Backend(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "Not found", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "Invalid request", detail.clone())
            }
            ApiError::Backend(detail) => {
                tracing::error!(detail, "Backend request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Service unavailable",
                    "The records service could not complete the request. Please try again."
                        .to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                    "An internal error occurred".to_string(),
                )
            }
        };
        (status, Html(pages::error_page(title, &message))).into_response()
    }
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            ActionError::Service(_) | ActionError::OrphanedUpload { .. } => {
                ApiError::Backend(err.to_string())
            }
            ActionError::Malformed { .. } => ApiError::Internal(err.to_string()),
        }
    }
}
