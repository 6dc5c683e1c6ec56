//! Quest catalog and progress route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use farmstellar_core::{QuestId, QuestStatus};

use crate::db::QuestRepository;
use crate::error::{ApiError, Result};
use crate::middleware::RequireUser;
use crate::models::Quest;
use crate::models::user::QuestProgress;
use crate::services::progress::ProgressService;
use crate::state::AppState;

fn parse_quest_id(raw: &str) -> Result<QuestId> {
    QuestId::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// List active quests.
///
/// GET /api/quests
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Quest>>> {
    let quests = QuestRepository::new(state.pool()).list_active().await?;
    Ok(Json(quests))
}

/// Get a quest by id.
///
/// GET /api/quests/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Quest>> {
    let quest_id = parse_quest_id(&id)?;

    let quest = QuestRepository::new(state.pool())
        .get(&quest_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Quest not found".to_owned()))?;

    Ok(Json(quest))
}

/// Request body for a progress update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub stage_index: i32,
    pub status: QuestStatus,
}

/// Upsert the caller's progress entry for a quest.
///
/// Returns the full progress list, with at most one entry per quest.
///
/// POST /api/quests/{id}/progress
#[instrument(skip(state, body))]
pub async fn update_progress(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateProgressRequest>,
) -> Result<Json<Vec<QuestProgress>>> {
    let quest_id = parse_quest_id(&id)?;

    let progress = ProgressService::new(state.pool())
        .record_progress(user_id, &quest_id, body.stage_index, body.status)
        .await?;

    Ok(Json(progress))
}
