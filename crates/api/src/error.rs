use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use prana_core::error::CoreError;
use prana_events::NotifyError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for malformed events and [`NotifyError`] for failures
/// while handling one. Implements [`IntoResponse`] to produce consistent JSON
/// error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A collaborator failed mid-notification. Surfaces as a 500 so the
    /// delivering infrastructure retries the event.
    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::InvalidDocumentPath(path) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_DOCUMENT_PATH",
                    format!("Not an alert document path: {path}"),
                ),
            },

            AppError::Notify(err) => {
                tracing::error!(error = %err, "Alert notification failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NOTIFICATION_FAILED",
                    "Alert notification failed".to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
