//! User repository for database operations.
//!
//! Covers accounts, farms, quest progress, XP awards, and the leaderboard
//! projection. Progress mutations are single upserts keyed
//! `(user_id, quest_id)`; the XP award path runs the completion guard and
//! the XP update inside one transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use farmstellar_core::{FarmId, Phone, QuestId, QuestStatus, UserId, level_for_xp};

use super::RepositoryError;
use crate::models::user::{Farm, LeaderboardEntry, QuestProgress, User};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    phone: String,
    name: String,
    email: Option<String>,
    location: String,
    city: String,
    experience_level: String,
    xp: i32,
    xp_level: i32,
    onboarded: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let phone = Phone::parse(&self.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            phone,
            name: self.name,
            email: self.email,
            location: self.location,
            city: self.city,
            experience_level: self.experience_level,
            xp: self.xp,
            xp_level: self.xp_level,
            onboarded: self.onboarded,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, phone, name, email, location, city, experience_level, \
                            xp, xp_level, onboarded, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProgressRow {
    quest_id: String,
    stage_index: i32,
    status: QuestStatus,
}

impl ProgressRow {
    fn into_progress(self) -> Result<QuestProgress, RepositoryError> {
        let quest_id = QuestId::parse(&self.quest_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid quest id in database: {e}"))
        })?;

        Ok(QuestProgress {
            quest_id,
            stage_index: self.stage_index,
            status: self.status,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FarmRow {
    id: i32,
    user_id: i32,
    name: String,
    address: String,
    size_acres: f64,
    primary_crop: String,
    soil_type: String,
    water_source: String,
}

impl FarmRow {
    fn into_farm(self) -> Farm {
        Farm {
            id: FarmId::new(self.id),
            user_id: UserId::new(self.user_id),
            name: self.name,
            address: self.address,
            size_acres: self.size_acres,
            primary_crop: self.primary_crop,
            soil_type: self.soil_type,
            water_source: self.water_source,
        }
    }
}

/// Profile fields applied during onboarding.
///
/// `None` fields leave the existing value untouched on update and fall back
/// to column defaults on insert.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub experience_level: Option<String>,
}

/// Farm fields captured during onboarding.
#[derive(Debug, Clone, Default)]
pub struct FarmDetails {
    pub name: String,
    pub address: String,
    pub size_acres: f64,
    pub primary_crop: String,
    pub soil_type: String,
    pub water_source: String,
}

/// Result of an XP award.
///
/// `previous_level` is the persisted level from before the mutation, so
/// level-up detection compares new state against prior state rather than
/// against itself.
#[derive(Debug, Clone, Copy)]
pub struct XpAward {
    pub xp: i32,
    pub xp_level: i32,
    pub previous_level: i32,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn get_by_phone(&self, phone: &Phone) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
        ))
        .bind(phone.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user for a verified phone.
    ///
    /// New users start at `xp = 0`, level 1, not onboarded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        phone: &Phone,
        profile: &ProfilePatch,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (phone, name, email, location, city, experience_level)
            VALUES ($1, COALESCE($2, ''), $3, COALESCE($4, ''), COALESCE($5, ''),
                    COALESCE($6, 'beginner'))
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(phone.as_str())
        .bind(profile.name.as_deref())
        .bind(profile.email.as_deref())
        .bind(profile.location.as_deref())
        .bind(profile.city.as_deref())
        .bind(profile.experience_level.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("phone already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_user()
    }

    /// Update profile fields, leaving `None` fields untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        profile: &ProfilePatch,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                location = COALESCE($4, location),
                city = COALESCE($5, city),
                experience_level = COALESCE($6, experience_level),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(profile.name.as_deref())
        .bind(profile.email.as_deref())
        .bind(profile.location.as_deref())
        .bind(profile.city.as_deref())
        .bind(profile.experience_level.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }

    /// Mark a user as onboarded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_onboarded(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET onboarded = TRUE, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Create the user's farm if they don't already have one.
    ///
    /// Returns the farm either way; a farm is created at most once per user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn ensure_farm(
        &self,
        user_id: UserId,
        details: &FarmDetails,
    ) -> Result<Farm, RepositoryError> {
        let inserted = sqlx::query_as::<_, FarmRow>(
            r"
            INSERT INTO farms (user_id, name, address, size_acres, primary_crop, soil_type, water_source)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, user_id, name, address, size_acres, primary_crop, soil_type, water_source
            ",
        )
        .bind(user_id.as_i32())
        .bind(&details.name)
        .bind(&details.address)
        .bind(details.size_acres)
        .bind(&details.primary_crop)
        .bind(&details.soil_type)
        .bind(&details.water_source)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row.into_farm());
        }

        // Lost the insert race or the farm already existed; fetch it.
        self.get_farm(user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get the user's farm, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_farm(&self, user_id: UserId) -> Result<Option<Farm>, RepositoryError> {
        let row = sqlx::query_as::<_, FarmRow>(
            r"
            SELECT id, user_id, name, address, size_acres, primary_crop, soil_type, water_source
            FROM farms
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(FarmRow::into_farm))
    }

    /// List a user's quest progress entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn progress_for(&self, user_id: UserId) -> Result<Vec<QuestProgress>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProgressRow>(
            r"
            SELECT quest_id, stage_index, status
            FROM quest_progress
            WHERE user_id = $1
            ORDER BY updated_at ASC, quest_id ASC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProgressRow::into_progress).collect()
    }

    /// Upsert the progress entry for one quest.
    ///
    /// Overwrites `stage_index`/`status` when the entry exists, inserts it
    /// otherwise. The composite key guarantees at most one entry per quest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert_progress(
        &self,
        user_id: UserId,
        quest_id: &QuestId,
        stage_index: i32,
        status: QuestStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO quest_progress (user_id, quest_id, stage_index, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, quest_id) DO UPDATE
            SET stage_index = EXCLUDED.stage_index,
                status = EXCLUDED.status,
                updated_at = now()
            ",
        )
        .bind(user_id.as_i32())
        .bind(quest_id.as_str())
        .bind(stage_index)
        .bind(status)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Complete a quest and award XP in one transaction.
    ///
    /// The completion upsert carries a guard predicate
    /// (`WHERE quest_progress.status <> 'completed'`): if the entry is
    /// already completed the statement touches no rows and the call returns
    /// `Ok(None)` without moving XP. Both statements run in one transaction,
    /// so two concurrent calls cannot both pass the guard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn complete_and_award(
        &self,
        user_id: UserId,
        quest_id: &QuestId,
        xp_reward: i32,
    ) -> Result<Option<XpAward>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let completed: Option<(i32,)> = sqlx::query_as(
            r"
            INSERT INTO quest_progress (user_id, quest_id, stage_index, status)
            VALUES ($1, $2, 0, 'completed')
            ON CONFLICT (user_id, quest_id) DO UPDATE
            SET status = 'completed', updated_at = now()
            WHERE quest_progress.status <> 'completed'
            RETURNING stage_index
            ",
        )
        .bind(user_id.as_i32())
        .bind(quest_id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        if completed.is_none() {
            // Already completed; nothing to award.
            tx.rollback().await?;
            return Ok(None);
        }

        let updated: Option<(i32, i32)> = sqlx::query_as(
            r"
            UPDATE users
            SET xp = xp + $2,
                xp_level = (xp + $2) / 100 + 1,
                updated_at = now()
            WHERE id = $1
            RETURNING xp, xp_level
            ",
        )
        .bind(user_id.as_i32())
        .bind(xp_reward)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((xp, xp_level)) = updated else {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        };

        tx.commit().await?;

        // RETURNING sees post-update values; recover the prior level from
        // the pre-award XP.
        Ok(Some(XpAward {
            xp,
            xp_level,
            previous_level: level_for_xp(xp - xp_reward),
        }))
    }

    /// Top users ordered by level, then XP.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_by_xp(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, RepositoryError> {
        let rows: Vec<(String, i32, i32)> = sqlx::query_as(
            r"
            SELECT name, xp, xp_level
            FROM users
            ORDER BY xp_level DESC, xp DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, (name, xp, xp_level))| LeaderboardEntry {
                rank: index + 1,
                name,
                xp,
                xp_level,
                badges: 0,
            })
            .collect())
    }
}
