//! Authentication extractors.
//!
//! Provides extractors for requiring bearer-token authentication in route
//! handlers. Tokens arrive as `Authorization: Bearer <jwt>` headers and are
//! verified against the app's token service.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use farmstellar_core::UserId;

use crate::error::ApiError;
use crate::services::token::extract_bearer;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with 401 when the header is missing, malformed, expired, or
/// carries a bad signature.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user_id): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, user {user_id}!")
/// }
/// ```
pub struct RequireUser(pub UserId);

impl<S> FromRequestParts<S> for RequireUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let token = extract_bearer(header).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid authorization header".to_owned())
        })?;

        let user_id = state.tokens().authenticate(token)?;

        Ok(Self(user_id))
    }
}

/// Extractor that optionally resolves the bearer token.
///
/// Unlike `RequireUser`, this never rejects: a missing or invalid token
/// yields `None`.
pub struct OptionalUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let user_id = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| extract_bearer(Some(header)))
            .and_then(|token| state.tokens().authenticate(token).ok());

        Ok(Self(user_id))
    }
}
