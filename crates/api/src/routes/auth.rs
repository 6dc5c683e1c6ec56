//! Authentication route handlers.
//!
//! Phone+OTP login flow: the client requests a code, verifies it, and - for
//! unseen phones - completes onboarding before a session token exists.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use farmstellar_core::{OtpCode, Phone, UserId};

use crate::db::users::{FarmDetails, ProfilePatch};
use crate::error::{ApiError, Result};
use crate::middleware::{OptionalUser, RequireUser};
use crate::models::user::{Farm, User};
use crate::services::auth::{AuthService, LoginOutcome, Onboarding};
use crate::services::otp::OtpService;
use crate::state::AppState;

fn otp_service(state: &AppState) -> OtpService<'_> {
    OtpService::new(
        state.pool(),
        state.sms(),
        state.config().otp_ttl,
        state.config().app_env.is_development(),
    )
}

fn parse_phone(raw: &str) -> Result<Phone> {
    Phone::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ============================================================================
// Login / OTP issuance
// ============================================================================

/// Request body for login and send-otp.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
}

/// Response for login and send-otp.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// The issued code, echoed back only in development mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_otp: Option<OtpCode>,
}

/// Request an OTP for a phone number.
///
/// POST /api/auth/login
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let phone = parse_phone(&body.phone)?;

    let issued = otp_service(&state).issue(&phone).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "OTP generated".to_owned(),
        sample_otp: issued.sample_code,
    }))
}

/// Request an OTP for a phone number (legacy alias of login).
///
/// POST /api/auth/send-otp
#[instrument(skip(state, body))]
pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let phone = parse_phone(&body.phone)?;

    let issued = otp_service(&state).issue(&phone).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "OTP sent".to_owned(),
        sample_otp: issued.sample_code,
    }))
}

// ============================================================================
// OTP verification
// ============================================================================

/// Request body for verify-otp.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub otp: String,
}

/// Response for verify-otp.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub is_new_user: bool,
    pub message: String,
}

/// Verify a submitted OTP.
///
/// Consumes the stored record on success. Existing phones get a session
/// token; unseen phones are told to complete their profile first.
///
/// POST /api/auth/verify-otp
#[instrument(skip(state, body))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>> {
    let phone = parse_phone(&body.phone)?;
    let code = OtpCode::parse(&body.otp).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    otp_service(&state).verify(&phone, &code).await?;

    let auth = AuthService::new(state.pool(), state.tokens());
    match auth.resolve_verified_phone(&phone).await? {
        LoginOutcome::Existing { token, .. } => Ok(Json(VerifyOtpResponse {
            success: true,
            token: Some(token),
            is_new_user: false,
            message: "OTP verified successfully".to_owned(),
        })),
        LoginOutcome::NewUser => Ok(Json(VerifyOtpResponse {
            success: true,
            token: None,
            is_new_user: true,
            message: "OTP verified. Please complete your profile.".to_owned(),
        })),
    }
}

// ============================================================================
// Onboarding
// ============================================================================

/// Request body for complete-profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfileRequest {
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    /// Self-reported farming experience (e.g. "beginner").
    pub level: Option<String>,
    pub farm_name: Option<String>,
    pub address: Option<String>,
    pub size: Option<f64>,
    pub primary_crop: Option<String>,
    pub soil_type: Option<String>,
    pub water_source: Option<String>,
    pub has_land: Option<bool>,
}

/// Response for complete-profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfileResponse {
    pub success: bool,
    pub token: String,
    pub message: String,
    pub user_id: UserId,
}

/// Complete onboarding for a verified phone and issue a token.
///
/// POST /api/auth/complete-profile
#[instrument(skip(state, body))]
pub async fn complete_profile(
    State(state): State<AppState>,
    Json(body): Json<CompleteProfileRequest>,
) -> Result<Json<CompleteProfileResponse>> {
    let phone = parse_phone(&body.phone)?;

    let has_farm_details = body.farm_name.is_some()
        || body.address.is_some()
        || body.size.is_some()
        || body.primary_crop.is_some()
        || body.soil_type.is_some()
        || body.water_source.is_some();

    let onboarding = Onboarding {
        profile: ProfilePatch {
            name: body.name,
            email: body.email,
            location: body.location,
            city: body.city,
            experience_level: body.level,
        },
        has_land: !matches!(body.has_land, Some(false)),
        farm: has_farm_details.then(|| FarmDetails {
            name: body.farm_name.unwrap_or_default(),
            address: body.address.unwrap_or_default(),
            size_acres: body.size.unwrap_or(0.0),
            primary_crop: body.primary_crop.unwrap_or_default(),
            soil_type: body.soil_type.unwrap_or_default(),
            water_source: body.water_source.unwrap_or_default(),
        }),
    };

    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, token) = auth.complete_profile(&phone, &onboarding).await?;

    Ok(Json(CompleteProfileResponse {
        success: true,
        token,
        message: "Profile completed".to_owned(),
        user_id: user.id,
    }))
}

// ============================================================================
// Current user
// ============================================================================

/// Wire shape of the current user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Phone,
    pub location: String,
    pub city: String,
    /// Self-reported farming experience.
    pub level: String,
    pub xp: i32,
    pub xp_level: i32,
    pub onboarded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm: Option<Farm>,
}

impl UserView {
    fn from_parts(user: User, farm: Option<Farm>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            location: user.location,
            city: user.city,
            level: user.experience_level,
            xp: user.xp,
            xp_level: user.xp_level,
            onboarded: user.onboarded,
            farm,
        }
    }
}

/// Response for /me.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserView,
}

/// Get the current user.
///
/// GET /api/auth/me
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<MeResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, farm) = auth.current_user(user_id).await?;

    Ok(Json(MeResponse {
        success: true,
        user: UserView::from_parts(user, farm),
    }))
}

// ============================================================================
// Logout
// ============================================================================

/// Response for logout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
    pub user_id: Option<UserId>,
}

/// Acknowledge a logout.
///
/// Tokens are stateless, so there is nothing to revoke server-side; the id
/// from a still-valid token is echoed for audit logging.
///
/// POST /api/auth/logout
#[instrument(skip_all)]
pub async fn logout(OptionalUser(user_id): OptionalUser) -> Json<LogoutResponse> {
    if let Some(id) = user_id {
        tracing::info!(user_id = %id, "user logged out");
    }

    Json(LogoutResponse {
        success: true,
        message: "Successfully logged out".to_owned(),
        user_id,
    })
}
