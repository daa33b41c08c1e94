//! REST API module.
//!
//! Each admin action is one route; handlers translate requests into mediator operations.

mod collections;
mod connection;

pub use collections::*;
pub use connection::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::ContentHash;

/// Success response envelope. `hash` is the content hash the data corresponds to, when the
/// data comes from a collection file.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<ContentHash>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, hash: Option<ContentHash>) -> Self {
        Self {
            success: true,
            data,
            hash,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, hash: Option<ContentHash>) -> ApiResult<T> {
    Ok(ApiResponse::new(data, hash))
}
