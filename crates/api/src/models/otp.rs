//! One-time-code record.

use chrono::{DateTime, Utc};

use farmstellar_core::{OtpCode, Phone};

/// A persisted one-time-code record.
///
/// At most one record exists per phone: issuance upserts, so only the newest
/// code is ever stored. Expiry is logical (`expires_at` checked on
/// verification); records are never physically deleted.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub phone: Phone,
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
    /// Once true, this record can never again verify.
    pub consumed: bool,
    /// Failed-verification counter.
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Whether the record has passed its expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
