//! Identity resolution and onboarding.
//!
//! Maps a verified phone number to an account. Verification alone never
//! creates a user: an unknown phone gets a "new user" outcome and must
//! complete onboarding before a token is issued for it.

mod error;

pub use error::AuthError;

use sqlx::PgPool;

use farmstellar_core::{Phone, UserId};

use crate::db::users::{FarmDetails, ProfilePatch, UserRepository};
use crate::models::user::{Farm, User};
use crate::services::token::TokenService;

/// Outcome of resolving a verified phone.
pub enum LoginOutcome {
    /// The phone maps to an existing account; a session token was issued.
    Existing { user: User, token: String },
    /// The phone is unseen; onboarding must run before identity exists.
    NewUser,
}

/// Onboarding request applied by [`AuthService::complete_profile`].
#[derive(Debug, Clone, Default)]
pub struct Onboarding {
    pub profile: ProfilePatch,
    /// `false` when the user reported having no land; suppresses farm
    /// creation.
    pub has_land: bool,
    pub farm: Option<FarmDetails>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Resolve a phone that just passed OTP verification.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` on database failure and
    /// `AuthError::TokenCreation` if signing fails.
    pub async fn resolve_verified_phone(&self, phone: &Phone) -> Result<LoginOutcome, AuthError> {
        match self.users.get_by_phone(phone).await? {
            Some(user) => {
                let token = self.tokens.issue(user.id)?;
                tracing::info!(user_id = %user.id, "existing user logged in");
                Ok(LoginOutcome::Existing { user, token })
            }
            None => {
                tracing::info!(phone = %phone, "new user verified, onboarding required");
                Ok(LoginOutcome::NewUser)
            }
        }
    }

    /// Complete onboarding for a verified phone.
    ///
    /// Creates the account when the phone is unseen, otherwise patches the
    /// existing profile. A farm is created at most once, and only when the
    /// user did not report being landless. Marks the user onboarded and
    /// issues a session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` on database failure and
    /// `AuthError::TokenCreation` if signing fails.
    pub async fn complete_profile(
        &self,
        phone: &Phone,
        onboarding: &Onboarding,
    ) -> Result<(User, String), AuthError> {
        let user = match self.users.get_by_phone(phone).await? {
            Some(existing) => self.users.update_profile(existing.id, &onboarding.profile).await?,
            None => {
                let user = self.users.create(phone, &onboarding.profile).await?;
                tracing::info!(user_id = %user.id, "created user during onboarding");
                user
            }
        };

        if onboarding.has_land {
            let mut details = onboarding.farm.clone().unwrap_or_default();
            if details.name.is_empty() {
                details.name = default_farm_name(&user.name);
            }
            let farm = self.users.ensure_farm(user.id, &details).await?;
            tracing::info!(user_id = %user.id, farm_id = %farm.id, "farm ready");
        }

        self.users.set_onboarded(user.id).await?;

        let token = self.tokens.issue(user.id)?;

        // Re-read so the returned snapshot reflects the onboarded flag.
        let user = self
            .users
            .get_by_id(user.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok((user, token))
    }

    /// Get the current user and their farm for a verified token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the id no longer resolves.
    pub async fn current_user(&self, user_id: UserId) -> Result<(User, Option<Farm>), AuthError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let farm = self.users.get_farm(user_id).await?;

        Ok((user, farm))
    }
}

/// Default farm name used when onboarding omits one.
fn default_farm_name(user_name: &str) -> String {
    if user_name.is_empty() {
        "Farmer's Farm".to_owned()
    } else {
        format!("{user_name}'s Farm")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_farm_name() {
        assert_eq!(default_farm_name("Asha"), "Asha's Farm");
        assert_eq!(default_farm_name(""), "Farmer's Farm");
    }
}
