use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Gateway error taxonomy. Every variant maps to exactly one status code
/// and serializes as `{ "error": "..." }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Failed to publish message to the realtime channel: {0}")]
    Fanout(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Surface the rule's own message when it carries one.
        let message = errors
            .errors()
            .values()
            .filter_map(|kind| match kind {
                validator::ValidationErrorsKind::Field(errs) => errs
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .next(),
                validator::ValidationErrorsKind::Struct(nested) => {
                    Some(AppError::from(*nested.clone()).to_string())
                }
                validator::ValidationErrorsKind::List(_) => None,
            })
            .next()
            .unwrap_or_else(|| "Invalid request payload".to_string());
        AppError::Validation(message)
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Fanout(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Fanout(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
