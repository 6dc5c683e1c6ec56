//! Database operations for the Farmstellar `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts keyed by phone, with XP/level and onboarding state
//! - `farms` - Optional farm per user, created during onboarding
//! - `otps` - One live one-time-code record per phone (upsert-by-phone)
//! - `quests` - Quest catalog (seeded via the CLI)
//! - `quest_progress` - Per-user progress, keyed `(user_id, quest_id)`
//! - `submissions` - Proof-of-work records
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p farmstellar-cli -- migrate
//! ```
//!
//! All racy read-modify-write sequences are expressed as single SQL
//! statements with guard predicates (upserts, conditional updates), so
//! concurrent requests cannot double-award XP or leave two valid codes for
//! one phone.

pub mod otps;
pub mod quests;
pub mod submissions;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use otps::OtpRepository;
pub use quests::QuestRepository;
pub use submissions::SubmissionRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique phone).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
