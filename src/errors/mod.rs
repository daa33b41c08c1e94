//! Error handling module for the content admin backend.
//!
//! Provides the error taxonomy shared by the mediator and the remote store client, with
//! mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const REMOTE_UNAVAILABLE: &str = "REMOTE_UNAVAILABLE";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const MALFORMED_CONTENT: &str = "MALFORMED_CONTENT";
    pub const CONFLICT: &str = "CONFLICT";
    pub const ITEM_NOT_FOUND: &str = "ITEM_NOT_FOUND";
    pub const NO_ACTIVE_EDIT: &str = "NO_ACTIVE_EDIT";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Admin API key missing or wrong
    Unauthorized(String),
    /// Remote store unreachable, or the collection file is missing
    RemoteUnavailable(String),
    /// GitHub credential missing, invalid, or lacking write access
    PermissionDenied(String),
    /// Stored collection could not be decoded
    MalformedContent(String),
    /// Compare-and-swap write rejected because the prior hash is stale
    Conflict { message: String, prior_hash: String },
    /// Edit target is not in the collection
    ItemNotFound(String),
    /// Delete requested while the session is creating a new item
    NoActiveEdit,
    /// Required form field missing
    Validation(String),
    /// Bad request
    BadRequest(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::MalformedContent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoActiveEdit => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::RemoteUnavailable(_) => codes::REMOTE_UNAVAILABLE,
            AppError::PermissionDenied(_) => codes::PERMISSION_DENIED,
            AppError::MalformedContent(_) => codes::MALFORMED_CONTENT,
            AppError::Conflict { .. } => codes::CONFLICT,
            AppError::ItemNotFound(_) => codes::ITEM_NOT_FOUND,
            AppError::NoActiveEdit => codes::NO_ACTIVE_EDIT,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::RemoteUnavailable(msg) => msg.clone(),
            AppError::PermissionDenied(msg) => msg.clone(),
            AppError::MalformedContent(msg) => msg.clone(),
            AppError::Conflict { message, .. } => message.clone(),
            AppError::ItemNotFound(msg) => msg.clone(),
            AppError::NoActiveEdit => "No item is being edited".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Remote store transport error: {:?}", err);
        AppError::RemoteUnavailable(format!("Remote store unreachable: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::MalformedContent(format!("JSON error: {}", err))
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(err: base64::DecodeError) -> Self {
        tracing::error!("Base64 error: {:?}", err);
        AppError::MalformedContent(format!("Base64 error: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for AppError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        AppError::MalformedContent(format!("Content is not UTF-8: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {:?}", err);
        AppError::Internal(format!("I/O error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let details = match error {
            AppError::Conflict { prior_hash, .. } => {
                Some(serde_json::json!({ "priorHash": prior_hash }))
            }
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_envelope_carries_prior_hash() {
        let err = AppError::Conflict {
            message: "stale".to_string(),
            prior_hash: "p1".to_string(),
        };
        let body = ErrorResponse::new(&err);
        assert_eq!(body.error.code, codes::CONFLICT);
        assert_eq!(body.error.details.unwrap()["priorHash"], "p1");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::ItemNotFound("news-1".to_string());
        assert_eq!(err.to_string(), "ITEM_NOT_FOUND: news-1");
        assert_eq!(AppError::NoActiveEdit.status_code(), StatusCode::BAD_REQUEST);
    }
}
