//! Leaderboard route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::Result;
use crate::models::user::LeaderboardEntry;
use crate::state::AppState;

/// Default number of rows returned.
const DEFAULT_LIMIT: i64 = 10;
/// Upper bound on requested rows.
const MAX_LIMIT: i64 = 100;

/// Query parameters for the leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// Top users ranked by level, then XP.
///
/// GET /api/leaderboard?limit=N
#[instrument(skip(state))]
pub async fn top(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let entries = UserRepository::new(state.pool()).top_by_xp(limit).await?;

    Ok(Json(entries))
}
