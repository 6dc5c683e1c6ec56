//! Quest progress ledger and XP awards.
//!
//! Progress entries are upserted by `(user, quest)`; completion with an XP
//! award runs as a guarded conditional update so two concurrent completions
//! of the same quest can never both award.

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use farmstellar_core::{QuestId, QuestStatus, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::QuestProgress;

/// XP rewards for auto-completable quests.
///
/// Legacy ids (`crops`, `soil`, `compost`) are kept for clients that
/// predate the catalog rename. Unknown ids have no reward and cannot be
/// auto-completed.
fn xp_reward(quest_id: &str) -> Option<i32> {
    match quest_id {
        "soil_scout" | "soil" => Some(10),
        "crop_quest" | "crops" => Some(75),
        "compost_kickoff" | "compost" => Some(40),
        "zero_waste" => Some(85),
        "mini_garden" => Some(100),
        "mulch_master" => Some(60),
        "boll_keeper" => Some(150),
        "coconut_basin" => Some(140),
        "coconut_bioenzyme" => Some(180),
        "rust_shield" => Some(160),
        "biodiversity_strip" => Some(190),
        "rainwater_hero" => Some(185),
        "biochar_maker" => Some(200),
        "jeevamrutham" => Some(150),
        _ => None,
    }
}

/// Errors that can occur in the progress ledger.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// The quest id has no XP reward and cannot be auto-completed.
    #[error("Invalid quest ID or quest has no XP reward")]
    InvalidQuest,

    /// The quest is already completed for this user; nothing was awarded.
    #[error("Quest already completed")]
    AlreadyCompleted,

    /// The authenticated user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of an auto-completion.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionReward {
    #[serde(rename = "xpAwarded")]
    pub xp_awarded: i32,
    #[serde(rename = "updatedXP")]
    pub updated_xp: i32,
    #[serde(rename = "updatedLevel")]
    pub updated_level: i32,
    #[serde(rename = "leveledUp")]
    pub leveled_up: bool,
}

/// Quest progress service.
pub struct ProgressService<'a> {
    users: UserRepository<'a>,
}

impl<'a> ProgressService<'a> {
    /// Create a new progress service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Record a client-driven progress update for one quest.
    ///
    /// Upserts the entry and returns the user's full progress list.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Repository` on database failure.
    pub async fn record_progress(
        &self,
        user_id: UserId,
        quest_id: &QuestId,
        stage_index: i32,
        status: QuestStatus,
    ) -> Result<Vec<QuestProgress>, ProgressError> {
        self.users
            .upsert_progress(user_id, quest_id, stage_index, status)
            .await?;

        Ok(self.users.progress_for(user_id).await?)
    }

    /// Mark a quest submitted (used when a submission is filed).
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Repository` on database failure.
    pub async fn mark_submitted(
        &self,
        user_id: UserId,
        quest_id: &QuestId,
        stage_index: i32,
    ) -> Result<(), ProgressError> {
        self.users
            .upsert_progress(user_id, quest_id, stage_index, QuestStatus::Submitted)
            .await?;
        Ok(())
    }

    /// Complete a quest and award its XP.
    ///
    /// Fails with `InvalidQuest` for ids outside the reward table and
    /// `AlreadyCompleted` when the entry is already terminal; the award and
    /// the completion guard run in one transaction. `leveled_up` compares
    /// the new level against the level persisted before the mutation.
    ///
    /// # Errors
    ///
    /// Returns the corresponding `ProgressError` for every non-success
    /// outcome.
    pub async fn auto_complete(
        &self,
        user_id: UserId,
        quest_id: &QuestId,
    ) -> Result<CompletionReward, ProgressError> {
        let reward = xp_reward(quest_id.as_str()).ok_or(ProgressError::InvalidQuest)?;

        let award = self
            .users
            .complete_and_award(user_id, quest_id, reward)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ProgressError::UserNotFound,
                other => ProgressError::Repository(other),
            })?
            .ok_or(ProgressError::AlreadyCompleted)?;

        tracing::info!(
            user_id = %user_id,
            quest_id = %quest_id,
            xp_awarded = reward,
            "quest auto-completed"
        );

        Ok(CompletionReward {
            xp_awarded: reward,
            updated_xp: award.xp,
            updated_level: award.xp_level,
            leveled_up: award.xp_level > award.previous_level,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::users::XpAward;

    #[test]
    fn test_reward_table_known_ids() {
        assert_eq!(xp_reward("soil_scout"), Some(10));
        assert_eq!(xp_reward("crop_quest"), Some(75));
        assert_eq!(xp_reward("biochar_maker"), Some(200));
    }

    #[test]
    fn test_reward_table_legacy_ids() {
        assert_eq!(xp_reward("crops"), Some(75));
        assert_eq!(xp_reward("soil"), Some(10));
        assert_eq!(xp_reward("compost"), Some(40));
    }

    #[test]
    fn test_reward_table_unknown_id() {
        assert_eq!(xp_reward("unknown_quest"), None);
        assert_eq!(xp_reward(""), None);
    }

    #[test]
    fn test_leveled_up_from_award_snapshot() {
        // xp 95 + 10 -> 105: level 1 -> 2
        let award = XpAward {
            xp: 105,
            xp_level: 2,
            previous_level: 1,
        };
        assert!(award.xp_level > award.previous_level);

        // xp 10 + 40 -> 50: stays level 1
        let award = XpAward {
            xp: 50,
            xp_level: 1,
            previous_level: 1,
        };
        assert!(award.xp_level <= award.previous_level);
    }
}
