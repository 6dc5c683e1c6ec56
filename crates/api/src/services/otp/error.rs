//! OTP service error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::sms::SmsError;

/// Errors that can occur during OTP issuance and verification.
#[derive(Debug, Error)]
pub enum OtpError {
    /// No unconsumed record exists for the phone.
    #[error("OTP not found or expired")]
    NotFound,

    /// The record exists but its expiry has passed.
    #[error("OTP expired")]
    Expired,

    /// The submitted code does not match the stored one.
    #[error("Invalid OTP")]
    Mismatch,

    /// The record's failure budget is exhausted.
    #[error("Too many failed attempts")]
    TooManyAttempts,

    /// The delivery collaborator failed; the code was not sent.
    #[error("failed to deliver OTP: {0}")]
    Delivery(#[from] SmsError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
