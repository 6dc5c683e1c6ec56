//! One-time-code issuance and verification.
//!
//! Issuance persists an upserted record (one live code per phone) and then
//! delegates delivery to the SMS collaborator - persist-then-deliver, so a
//! delivered code is always verifiable, and a delivery failure surfaces as
//! an error rather than silent success.
//!
//! Verification walks a fixed decision order over the stored record:
//! missing, expired, attempt budget exhausted, code mismatch, match. All
//! mutations (attempt increments, consumption) are guarded single-statement
//! updates, so a record verifies successfully at most once.

mod error;

pub use error::OtpError;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use sqlx::PgPool;

use farmstellar_core::{OtpCode, Phone};

use crate::db::otps::OtpRepository;
use crate::models::OtpRecord;
use crate::services::sms::SmsGateway;

/// Verification failures allowed before a record is exhausted.
const MAX_ATTEMPTS: i32 = 3;

/// Fixed code used in development for reproducible flows.
const DEV_CODE: &str = "123456";

/// Result of issuing a code.
#[derive(Debug)]
pub struct OtpIssued {
    /// The issued code, echoed back only in development mode.
    pub sample_code: Option<OtpCode>,
}

/// Outcome of evaluating a submitted code against a stored record.
///
/// Pure decision logic, separated from the persistence side effects so the
/// ordering rules are testable on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Expired,
    Exhausted,
    Mismatch,
    Match,
}

fn decide(record: &OtpRecord, code: &OtpCode, now: DateTime<Utc>) -> Decision {
    if record.is_expired(now) {
        return Decision::Expired;
    }
    // An exhausted record never verifies, even with the right code.
    if record.attempts >= MAX_ATTEMPTS {
        return Decision::Exhausted;
    }
    if record.code == *code {
        Decision::Match
    } else {
        Decision::Mismatch
    }
}

/// One-time-code service.
pub struct OtpService<'a> {
    otps: OtpRepository<'a>,
    sms: &'a SmsGateway,
    ttl: ChronoDuration,
    dev_mode: bool,
}

impl<'a> OtpService<'a> {
    /// Create a new OTP service.
    ///
    /// `ttl` is the code lifetime; `dev_mode` switches to the fixed
    /// diagnostic code and echoes it in responses.
    #[must_use]
    pub fn new(
        pool: &'a PgPool,
        sms: &'a SmsGateway,
        ttl: std::time::Duration,
        dev_mode: bool,
    ) -> Self {
        Self {
            otps: OtpRepository::new(pool),
            sms,
            ttl: ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::minutes(5)),
            dev_mode,
        }
    }

    /// Issue a code for a phone, replacing any prior record.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::Repository` if persisting fails and
    /// `OtpError::Delivery` if the gateway refuses the message. The record
    /// is persisted before delivery is attempted; a re-issue replaces it, so
    /// a phone never holds two valid codes.
    pub async fn issue(&self, phone: &Phone) -> Result<OtpIssued, OtpError> {
        let code = if self.dev_mode {
            // Fixed, shape-valid literal.
            OtpCode::parse(DEV_CODE)
                .unwrap_or_else(|_| unreachable!("dev code literal is valid"))
        } else {
            generate_code()
        };

        let expires_at = Utc::now() + self.ttl;
        self.otps.upsert(phone, &code, expires_at).await?;

        tracing::info!(phone = %phone, "OTP issued");

        self.sms.send_code(phone, &code).await?;

        Ok(OtpIssued {
            sample_code: self.dev_mode.then_some(code),
        })
    }

    /// Verify a submitted code.
    ///
    /// Decision order: no record, expired, attempt budget exhausted,
    /// mismatch (which burns an attempt), match (which consumes the record).
    ///
    /// # Errors
    ///
    /// Returns the corresponding `OtpError` for every non-success outcome.
    pub async fn verify(&self, phone: &Phone, code: &OtpCode) -> Result<(), OtpError> {
        let record = self.otps.find_live(phone).await?.ok_or(OtpError::NotFound)?;

        match decide(&record, code, Utc::now()) {
            Decision::Expired => Err(OtpError::Expired),
            Decision::Exhausted => Err(OtpError::TooManyAttempts),
            Decision::Mismatch => {
                let attempts = self.otps.register_failure(phone).await?;
                match attempts {
                    Some(n) if n >= MAX_ATTEMPTS => Err(OtpError::TooManyAttempts),
                    Some(_) => Err(OtpError::Mismatch),
                    // Record consumed or replaced since the lookup.
                    None => Err(OtpError::NotFound),
                }
            }
            Decision::Match => {
                if self.otps.consume(phone, code).await? {
                    tracing::info!(phone = %phone, "OTP verified");
                    Ok(())
                } else {
                    // A concurrent request consumed or replaced the record
                    // between lookup and consumption.
                    Err(OtpError::NotFound)
                }
            }
        }
    }
}

/// Draw a uniformly random 6-digit code.
fn generate_code() -> OtpCode {
    let n = rand::rng().random_range(100_000..=999_999);
    OtpCode::from_number(n).unwrap_or_else(|_| unreachable!("range is always six digits"))
}
