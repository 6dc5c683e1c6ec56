//! Signed bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user id and a 7-day expiry. Issuance
//! and verification are pure computation; no I/O is involved.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use farmstellar_core::UserId;

use super::auth::AuthError;

/// Token lifetime: 7 days.
const TOKEN_LIFETIME_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Payload stored in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id.
    pub user_id: i32,
    /// Issued at (Unix timestamp).
    pub iat: u64,
    /// Expiration time (Unix timestamp).
    pub exp: u64,
}

/// Issues and verifies signed session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    /// Create a token service from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a token for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenCreation` if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = unix_now();
        self.issue_with_window(user_id, now, now + TOKEN_LIFETIME_SECONDS)
    }

    fn issue_with_window(
        &self,
        user_id: UserId,
        iat: u64,
        exp: u64,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            user_id: user_id.as_i32(),
            iat,
            exp,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verify a token and return the user id it was issued to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` when past the expiry, and
    /// `AuthError::InvalidToken` on signature or shape failure.
    pub fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            },
        )?;

        Ok(UserId::new(data.claims.user_id))
    }
}

/// Current Unix timestamp in seconds.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Extract a token from an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new(&SecretString::from(
            "test-signing-key-that-is-at-least-32-chars",
        ))
    }

    #[test]
    fn test_issue_and_authenticate_roundtrip() {
        let tokens = test_service();

        let token = tokens.issue(UserId::new(42)).unwrap();
        assert!(!token.is_empty());

        let user_id = tokens.authenticate(&token).unwrap();
        assert_eq!(user_id, UserId::new(42));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = test_service();
        assert!(matches!(
            tokens.authenticate("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let tokens = test_service();
        let other = TokenService::new(&SecretString::from(
            "a-different-signing-key-at-least-32-chars",
        ));

        let token = tokens.issue(UserId::new(7)).unwrap();
        assert!(matches!(
            other.authenticate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = test_service();

        // Issued and expired well in the past (beyond validation leeway).
        let iat = unix_now() - 10_000;
        let token = tokens
            .issue_with_window(UserId::new(7), iat, iat + 1)
            .unwrap();

        assert!(matches!(
            tokens.authenticate(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(extract_bearer(Some("Bearer ")), None);
        assert_eq!(extract_bearer(Some("Basic abc123")), None);
        assert_eq!(extract_bearer(Some("abc123")), None);
        assert_eq!(extract_bearer(None), None);
    }
}
