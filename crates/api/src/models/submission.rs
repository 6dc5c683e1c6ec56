//! Submission domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use farmstellar_core::{QuestId, SubmissionId, UserId};

/// A proof-of-work record a user files against a quest stage.
///
/// Submissions start `pending` and move to `approved`/`rejected` through a
/// review flow outside this service. Filing one marks the user's quest
/// progress as `submitted`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub user_id: UserId,
    pub quest_id: QuestId,
    pub stage_index: i32,
    pub notes: String,
    pub checklist: Vec<String>,
    pub proof_type: String,
    pub proof_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
