//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Credential verification failed or the caller does not own the resource
    #[error("{0}")]
    InvalidCredentials(String),

    /// Unique-constraint collision
    #[error("{0}")]
    Conflict(String),

    /// Quota exceeded, invalid transition, or malformed input
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Unmapped store failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Infrastructure-level database error
    #[error(transparent)]
    Infrastructure(#[from] common::error::DatabaseError),
}

/// Message for unique-constraint collisions without a more specific one
pub const ALREADY_EXISTS_MSG: &str = "Already exists!";

/// True when the error is a Postgres unique-constraint violation (23505)
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().and_then(|e| e.code()).as_deref(),
        Some("23505")
    )
}

/// True when the error is a Postgres check-constraint violation (23514)
pub fn is_check_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().and_then(|e| e.code()).as_deref(),
        Some("23514")
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InvalidCredentials(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(err) => {
                // The generic responder still inspects store error codes so
                // constraint violations that repositories did not map keep
                // their contract status.
                if is_unique_violation(&err) {
                    (StatusCode::CONFLICT, ALREADY_EXISTS_MSG.to_string())
                } else if is_check_violation(&err) {
                    (StatusCode::BAD_REQUEST, "Invalid rating".to_string())
                } else {
                    tracing::error!("Unmapped database error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            }
            ApiError::Infrastructure(err) => {
                tracing::error!("Infrastructure error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "msg": msg,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
