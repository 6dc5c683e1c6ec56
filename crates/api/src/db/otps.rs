//! One-time-code repository.
//!
//! The `otps` table holds at most one record per phone (primary key), so
//! issuance is a single atomic upsert: concurrent issuance for one phone is
//! last-writer-wins and a phone never has two simultaneously-valid codes.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use farmstellar_core::{OtpCode, Phone};

use super::RepositoryError;
use crate::models::OtpRecord;

#[derive(sqlx::FromRow)]
struct OtpRow {
    phone: String,
    code: String,
    expires_at: DateTime<Utc>,
    consumed: bool,
    attempts: i32,
    created_at: DateTime<Utc>,
}

impl OtpRow {
    fn into_record(self) -> Result<OtpRecord, RepositoryError> {
        let phone = Phone::parse(&self.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;
        let code = OtpCode::parse(&self.code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid OTP code in database: {e}"))
        })?;

        Ok(OtpRecord {
            phone,
            code,
            expires_at: self.expires_at,
            consumed: self.consumed,
            attempts: self.attempts,
            created_at: self.created_at,
        })
    }
}

/// Repository for one-time-code records.
pub struct OtpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OtpRepository<'a> {
    /// Create a new OTP repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create or replace the record for a phone.
    ///
    /// A single upsert statement: any prior record for the phone is
    /// overwritten with the new code, a fresh expiry, `consumed = false`,
    /// and `attempts = 0`. Only the newest code is ever valid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert(
        &self,
        phone: &Phone,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO otps (phone, code, expires_at, consumed, attempts, created_at)
            VALUES ($1, $2, $3, FALSE, 0, now())
            ON CONFLICT (phone) DO UPDATE
            SET code = EXCLUDED.code,
                expires_at = EXCLUDED.expires_at,
                consumed = FALSE,
                attempts = 0,
                created_at = now()
            ",
        )
        .bind(phone.as_str())
        .bind(code.as_str())
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the unconsumed record for a phone, if any.
    ///
    /// Expiry is not filtered here; the verifier distinguishes an expired
    /// record from a missing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn find_live(&self, phone: &Phone) -> Result<Option<OtpRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, OtpRow>(
            r"
            SELECT phone, code, expires_at, consumed, attempts, created_at
            FROM otps
            WHERE phone = $1 AND consumed = FALSE
            ",
        )
        .bind(phone.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(OtpRow::into_record).transpose()
    }

    /// Record a failed verification attempt.
    ///
    /// Atomic increment; returns the new attempt count, or `None` if no
    /// unconsumed record exists (it was consumed or replaced concurrently).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn register_failure(&self, phone: &Phone) -> Result<Option<i32>, RepositoryError> {
        let attempts: Option<(i32,)> = sqlx::query_as(
            r"
            UPDATE otps
            SET attempts = attempts + 1
            WHERE phone = $1 AND consumed = FALSE
            RETURNING attempts
            ",
        )
        .bind(phone.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(attempts.map(|(a,)| a))
    }

    /// Consume the record for a phone.
    ///
    /// Guarded update: succeeds only while the stored code still matches and
    /// the record is unconsumed, so a record can produce at most one
    /// successful verification even under concurrent requests.
    ///
    /// Returns `true` if this call performed the consumption.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn consume(&self, phone: &Phone, code: &OtpCode) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE otps
            SET consumed = TRUE
            WHERE phone = $1 AND code = $2 AND consumed = FALSE
            ",
        )
        .bind(phone.as_str())
        .bind(code.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
