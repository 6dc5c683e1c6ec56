//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use farmstellar_core::{FarmId, Phone, QuestId, QuestStatus, UserId};

/// A Farmstellar user.
///
/// Created on profile completion for a previously-unseen phone; profile
/// attributes stay empty until onboarding finishes. `xp_level` is always
/// `xp / 100 + 1` - it is recomputed on every XP mutation, never set
/// directly.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Phone number the account was verified with.
    pub phone: Phone,
    /// Display name.
    pub name: String,
    /// Email address, optional until onboarding.
    pub email: Option<String>,
    /// Free-form location string.
    pub location: String,
    /// City.
    pub city: String,
    /// Self-reported farming experience (e.g. "beginner").
    pub experience_level: String,
    /// Accumulated experience points.
    pub xp: i32,
    /// Level derived from `xp`.
    pub xp_level: i32,
    /// Whether profile/farm onboarding has completed.
    pub onboarded: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user's progress entry for one quest.
///
/// At most one entry exists per `(user, quest)` pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgress {
    pub quest_id: QuestId,
    pub stage_index: i32,
    pub status: QuestStatus,
}

/// A farm owned by a user, created at most once during onboarding.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: FarmId,
    pub user_id: UserId,
    pub name: String,
    pub address: String,
    pub size_acres: f64,
    pub primary_crop: String,
    pub soil_type: String,
    pub water_source: String,
}

/// One ranked leaderboard row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub name: String,
    pub xp: i32,
    pub xp_level: i32,
    /// Badge count; fixed at 0 until a badge system exists.
    pub badges: u32,
}
