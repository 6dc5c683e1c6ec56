//! Quest catalog repository.

use sqlx::PgPool;
use sqlx::types::Json;

use farmstellar_core::QuestId;

use super::RepositoryError;
use crate::models::quest::{Quest, QuestStage};

#[derive(sqlx::FromRow)]
struct QuestRow {
    id: String,
    title: String,
    description: String,
    category: String,
    xp_reward: i32,
    stages: Json<Vec<QuestStage>>,
    active: bool,
}

impl QuestRow {
    fn into_quest(self) -> Result<Quest, RepositoryError> {
        let id = QuestId::parse(&self.id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid quest id in database: {e}"))
        })?;

        Ok(Quest {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            xp_reward: self.xp_reward,
            stages: self.stages.0,
            active: self.active,
        })
    }
}

/// Repository for the quest catalog.
pub struct QuestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> QuestRepository<'a> {
    /// Create a new quest repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active quests.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn list_active(&self) -> Result<Vec<Quest>, RepositoryError> {
        let rows = sqlx::query_as::<_, QuestRow>(
            r"
            SELECT id, title, description, category, xp_reward, stages, active
            FROM quests
            WHERE active = TRUE
            ORDER BY xp_reward ASC, id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(QuestRow::into_quest).collect()
    }

    /// Get a quest by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn get(&self, id: &QuestId) -> Result<Option<Quest>, RepositoryError> {
        let row = sqlx::query_as::<_, QuestRow>(
            r"
            SELECT id, title, description, category, xp_reward, stages, active
            FROM quests
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(QuestRow::into_quest).transpose()
    }

    /// Insert or update a catalog entry (used by the seed command).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert(&self, quest: &Quest) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO quests (id, title, description, category, xp_reward, stages, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                description = EXCLUDED.description,
                category = EXCLUDED.category,
                xp_reward = EXCLUDED.xp_reward,
                stages = EXCLUDED.stages,
                active = EXCLUDED.active
            ",
        )
        .bind(quest.id.as_str())
        .bind(&quest.title)
        .bind(&quest.description)
        .bind(&quest.category)
        .bind(quest.xp_reward)
        .bind(Json(&quest.stages))
        .bind(quest.active)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
