//! HTTP error mapping for API handlers.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use ttlpaste_core::{AppError, ValidationError};

/// Message returned for every unavailable paste, whatever the cause.
pub const NOT_FOUND_MESSAGE: &str = "Paste not found";
const STORAGE_UNAVAILABLE_MESSAGE: &str = "Storage unavailable";

/// Error response carrying a status and a short client-safe message.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Status code this error will be rendered with.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message placed in the `error` field of the response body.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(message) => Self::new(StatusCode::BAD_REQUEST, message),
            AppError::NotFound => Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            err @ (AppError::Database(_)
            | AppError::StorageUnavailable(_)
            | AppError::Serialization(_)) => {
                tracing::error!("Storage error: {}", err);
                Self::new(StatusCode::SERVICE_UNAVAILABLE, STORAGE_UNAVAILABLE_MESSAGE)
            }
        }
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        AppError::from(err).into()
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, rejection.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
