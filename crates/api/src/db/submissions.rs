//! Submission repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use farmstellar_core::{QuestId, SubmissionId, UserId};

use super::RepositoryError;
use crate::models::Submission;

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: i32,
    user_id: i32,
    quest_id: String,
    stage_index: i32,
    notes: String,
    checklist: Json<Vec<String>>,
    proof_type: String,
    proof_url: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_submission(self) -> Result<Submission, RepositoryError> {
        let quest_id = QuestId::parse(&self.quest_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid quest id in database: {e}"))
        })?;

        Ok(Submission {
            id: SubmissionId::new(self.id),
            user_id: UserId::new(self.user_id),
            quest_id,
            stage_index: self.stage_index,
            notes: self.notes,
            checklist: self.checklist.0,
            proof_type: self.proof_type,
            proof_url: self.proof_url,
            status: self.status,
            created_at: self.created_at,
        })
    }
}

const SUBMISSION_COLUMNS: &str =
    "id, user_id, quest_id, stage_index, notes, checklist, proof_type, proof_url, status, created_at";

/// Fields captured when filing a submission.
#[derive(Debug, Clone, Default)]
pub struct NewSubmission {
    pub stage_index: i32,
    pub notes: String,
    pub checklist: Vec<String>,
    pub proof_type: String,
    pub proof_url: String,
}

/// Repository for submission records.
pub struct SubmissionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubmissionRepository<'a> {
    /// Create a new submission repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// File a new pending submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn create(
        &self,
        user_id: UserId,
        quest_id: &QuestId,
        fields: &NewSubmission,
    ) -> Result<Submission, RepositoryError> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r"
            INSERT INTO submissions
                (user_id, quest_id, stage_index, notes, checklist, proof_type, proof_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING {SUBMISSION_COLUMNS}
            "
        ))
        .bind(user_id.as_i32())
        .bind(quest_id.as_str())
        .bind(fields.stage_index)
        .bind(&fields.notes)
        .bind(Json(&fields.checklist))
        .bind(&fields.proof_type)
        .bind(&fields.proof_url)
        .fetch_one(self.pool)
        .await?;

        row.into_submission()
    }

    /// List a user's submissions for one quest, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn list_for_quest(
        &self,
        user_id: UserId,
        quest_id: &QuestId,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            r"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE user_id = $1 AND quest_id = $2
            ORDER BY created_at DESC
            "
        ))
        .bind(user_id.as_i32())
        .bind(quest_id.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SubmissionRow::into_submission).collect()
    }

    /// Get one of the user's submissions by id.
    ///
    /// Scoped to the owning user: another user's submission reads as absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn get(
        &self,
        user_id: UserId,
        id: SubmissionId,
    ) -> Result<Option<Submission>, RepositoryError> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE id = $1 AND user_id = $2
            "
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(SubmissionRow::into_submission).transpose()
    }
}
