//! Submission route handlers.
//!
//! Filing a submission marks the quest `submitted`; auto-complete jumps a
//! quest straight to `completed` and awards its XP exactly once.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use farmstellar_core::{QuestId, SubmissionId};

use crate::db::SubmissionRepository;
use crate::db::submissions::NewSubmission;
use crate::error::{ApiError, Result};
use crate::middleware::RequireUser;
use crate::models::Submission;
use crate::services::progress::{CompletionReward, ProgressService};
use crate::state::AppState;

fn parse_quest_id(raw: &str) -> Result<QuestId> {
    QuestId::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ============================================================================
// Filing and reading submissions
// ============================================================================

/// Request body for filing a submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    pub stage_index: Option<i32>,
    pub notes: Option<String>,
    /// Older clients send the notes under `description`.
    pub description: Option<String>,
    pub checklist: Option<Vec<String>>,
    pub proof_type: Option<String>,
    pub proof_url: Option<String>,
}

/// File a submission for a quest.
///
/// POST /api/quests/{id}/submissions
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>)> {
    let quest_id = parse_quest_id(&id)?;

    let stage_index = body.stage_index.unwrap_or(0);
    let fields = NewSubmission {
        stage_index,
        notes: body.notes.or(body.description).unwrap_or_default(),
        checklist: body.checklist.unwrap_or_default(),
        proof_type: body.proof_type.unwrap_or_else(|| "text".to_owned()),
        proof_url: body.proof_url.unwrap_or_default(),
    };

    let submission = SubmissionRepository::new(state.pool())
        .create(user_id, &quest_id, &fields)
        .await?;

    ProgressService::new(state.pool())
        .mark_submitted(user_id, &quest_id, stage_index)
        .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// List the caller's submissions for a quest.
///
/// GET /api/quests/{id}/submissions
#[instrument(skip(state))]
pub async fn list_for_quest(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Submission>>> {
    let quest_id = parse_quest_id(&id)?;

    let submissions = SubmissionRepository::new(state.pool())
        .list_for_quest(user_id, &quest_id)
        .await?;

    Ok(Json(submissions))
}

/// Get one of the caller's submissions.
///
/// GET /api/submissions/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<Submission>> {
    let submission = SubmissionRepository::new(state.pool())
        .get(user_id, SubmissionId::new(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_owned()))?;

    Ok(Json(submission))
}

// ============================================================================
// Auto-completion
// ============================================================================

/// Request body for auto-complete.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCompleteRequest {
    pub quest_id: String,
}

/// Response for auto-complete.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCompleteResponse {
    pub message: String,
    pub quest_id: QuestId,
    #[serde(flatten)]
    pub reward: CompletionReward,
}

/// Complete a quest and award its XP.
///
/// Idempotent per quest: a second call for the same quest fails with
/// "already completed" and leaves XP unchanged.
///
/// POST /api/submissions/auto-complete
#[instrument(skip(state, body))]
pub async fn auto_complete(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(body): Json<AutoCompleteRequest>,
) -> Result<Json<AutoCompleteResponse>> {
    let quest_id = parse_quest_id(&body.quest_id)?;

    let reward = ProgressService::new(state.pool())
        .auto_complete(user_id, &quest_id)
        .await?;

    Ok(Json(AutoCompleteResponse {
        message: "Quest completed successfully".to_owned(),
        quest_id,
        reward,
    }))
}
