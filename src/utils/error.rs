//! Unified application error type
//!
//! Every handler returns [`AppResult`]. The response envelopes are
//! intentionally not uniform: each variant renders the exact wire shape the
//! storefront frontend expects for that failure class (`{"errors": ...}` for
//! auth, `{"success": false, "errors": ...}` for validation and gateway
//! failures, plain text for webhook rejections).

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::db::repository::RepoError;

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication (401) ==========
    #[error("Please Authenticate Using Valid Token")]
    Unauthorized,

    // ========== Business logic (4xx) ==========
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Webhook error: {0}")]
    Webhook(String),

    // ========== System (5xx) ==========
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "errors": "Please Authenticate Using Valid Token" })),
            )
                .into_response(),

            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "errors": msg })),
            )
                .into_response(),

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "errors": msg })),
            )
                .into_response(),

            AppError::Upload(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": 0, "errors": msg })),
            )
                .into_response(),

            // The gateway delivers callbacks with a plain-text error contract
            AppError::Webhook(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Webhook Error: {msg}"),
            )
                .into_response(),

            AppError::Gateway(msg) => {
                error!(target: "payment", error = %msg, "Payment gateway error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "errors": msg })),
                )
                    .into_response()
            }

            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "errors": "Database error" })),
                )
                    .into_response()
            }

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "errors": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Validation(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Upload(format!("Multipart error: {e}"))
    }
}

/// Result type for handler functions
pub type AppResult<T> = Result<T, AppError>;
