//! Error types for the circulation server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::policy::Rejection;

/// Stable machine-readable error codes returned alongside the HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchMember = 4,
    NoSuchCopy = 5,
    NoSuchData = 6,
    CopyNotAvailable = 7,
    Duplicate = 8,
    BadValue = 9,
    MemberBlocked = 10,
    NoActiveLoan = 11,
    HoldsPending = 12,
    CopyAvailable = 13,
    UnknownTier = 14,
    Timeout = 15,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl Rejection {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            Rejection::MemberNotFound => (StatusCode::NOT_FOUND, ErrorCode::NoSuchMember),
            Rejection::CopyNotFound => (StatusCode::NOT_FOUND, ErrorCode::NoSuchCopy),
            Rejection::MemberBlocked => (StatusCode::FORBIDDEN, ErrorCode::MemberBlocked),
            Rejection::CopyUnavailable => (StatusCode::CONFLICT, ErrorCode::CopyNotAvailable),
            Rejection::NoActiveLoan => (StatusCode::NOT_FOUND, ErrorCode::NoActiveLoan),
            Rejection::HoldsPending => (StatusCode::FORBIDDEN, ErrorCode::HoldsPending),
            Rejection::UnknownTier => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::UnknownTier),
            Rejection::CopyAvailable => (StatusCode::BAD_REQUEST, ErrorCode::CopyAvailable),
            Rejection::DuplicateHold => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            Rejection::DueDateOutOfRange => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        self.classify().0
    }

    fn classify(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone()),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DbFailure,
                "Database error".to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone()),
            AppError::Rejected(rejection) => {
                let (status, code) = rejection.status_and_code();
                (status, code, rejection.to_string())
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::Failure,
                "Internal server error".to_string(),
            ),
            AppError::Timeout(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::Timeout,
                self.to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();

        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Timeout(secs) => tracing::error!(timeout_secs = secs, "Request deadline elapsed"),
            _ => {}
        }

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
