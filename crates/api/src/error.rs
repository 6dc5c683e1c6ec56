//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server errors to Sentry
//! before responding to the client. All route handlers should return
//! `Result<T, ApiError>`. Responses are JSON envelopes of the form
//! `{"success": false, "message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::otp::OtpError;
use crate::services::progress::ProgressError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// OTP issuance/verification failed.
    #[error("OTP error: {0}")]
    Otp(#[from] OtpError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Progress ledger operation failed.
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Otp(err) => matches!(err, OtpError::Delivery(_) | OtpError::Repository(_)),
            Self::Auth(err) => matches!(
                err,
                AuthError::TokenCreation(_) | AuthError::Repository(_)
            ),
            Self::Progress(err) => matches!(err, ProgressError::Repository(_)),
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Otp(err) => match err {
                OtpError::NotFound
                | OtpError::Expired
                | OtpError::Mismatch
                | OtpError::TooManyAttempts => StatusCode::BAD_REQUEST,
                OtpError::Delivery(_) | OtpError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidToken | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::TokenCreation(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Progress(err) => match err {
                ProgressError::InvalidQuest | ProgressError::AlreadyCompleted => {
                    StatusCode::BAD_REQUEST
                }
                ProgressError::UserNotFound => StatusCode::NOT_FOUND,
                ProgressError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Server error".to_string()
        } else {
            match &self {
                Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
                Self::Otp(err) => err.to_string(),
                Self::Auth(AuthError::InvalidToken) => "Invalid token".to_string(),
                Self::Auth(AuthError::TokenExpired) => "Token expired".to_string(),
                Self::Auth(AuthError::UserNotFound) => "User not found".to_string(),
                Self::Progress(err) => err.to_string(),
                Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => {
                    msg.clone()
                }
                _ => self.to_string(),
            }
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("Quest not found".to_string());
        assert_eq!(err.to_string(), "Not found: Quest not found");

        let err = ApiError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            get_status(ApiError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ApiError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ApiError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_otp_failures_are_bad_requests() {
        assert_eq!(get_status(ApiError::Otp(OtpError::NotFound)), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(ApiError::Otp(OtpError::Expired)), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(ApiError::Otp(OtpError::Mismatch)), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(ApiError::Otp(OtpError::TooManyAttempts)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_token_failures_are_unauthorized() {
        assert_eq!(
            get_status(ApiError::Auth(AuthError::InvalidToken)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ApiError::Auth(AuthError::TokenExpired)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_idempotence_guard_is_bad_request() {
        assert_eq!(
            get_status(ApiError::Progress(ProgressError::AlreadyCompleted)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Progress(ProgressError::InvalidQuest)),
            StatusCode::BAD_REQUEST
        );
    }
}
