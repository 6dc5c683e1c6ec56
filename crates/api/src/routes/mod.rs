//! HTTP route handlers for the Farmstellar API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (verifies DB)
//!
//! # Auth
//! POST /api/auth/login                  - Request an OTP for a phone
//! POST /api/auth/send-otp               - Same as login (legacy alias)
//! POST /api/auth/verify-otp             - Verify OTP, issue token for known phones
//! POST /api/auth/complete-profile       - Onboard a verified phone, issue token
//! GET  /api/auth/me                     - Current user (bearer)
//! POST /api/auth/logout                 - Logout acknowledgement (bearer optional)
//!
//! # Quests
//! GET  /api/quests                      - Active quest catalog
//! GET  /api/quests/{id}                 - Quest detail
//! POST /api/quests/{id}/progress        - Upsert progress entry (bearer)
//! POST /api/quests/{id}/submissions     - File a submission (bearer)
//! GET  /api/quests/{id}/submissions     - List own submissions for quest (bearer)
//!
//! # Submissions
//! GET  /api/submissions/{id}            - Submission detail (bearer, own only)
//! POST /api/submissions/auto-complete   - Complete a quest and award XP (bearer)
//!
//! # Leaderboard
//! GET  /api/leaderboard?limit=N         - Top users by level, then XP
//! ```

pub mod auth;
pub mod leaderboard;
pub mod quests;
pub mod submissions;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/send-otp", post(auth::send_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/complete-profile", post(auth::complete_profile))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
}

/// Create the quest routes router.
fn quest_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(quests::list))
        .route("/{id}", get(quests::show))
        .route("/{id}/progress", post(quests::update_progress))
        .route(
            "/{id}/submissions",
            post(submissions::create).get(submissions::list_for_quest),
        )
}

/// Create the submission routes router.
fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/auto-complete", post(submissions::auto_complete))
        .route("/{id}", get(submissions::show))
}

/// Create the full application router (minus health endpoints).
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/quests", quest_routes())
        .nest("/api/submissions", submission_routes())
        .route("/api/leaderboard", get(leaderboard::top))
}
