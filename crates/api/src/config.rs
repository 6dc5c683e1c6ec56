//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `JWT_SECRET` - Token signing secret (min 32 chars, high entropy;
//!   required outside `development`, where a fixed fallback is substituted)
//!
//! ## Optional
//! - `APP_ENV` - `development` or `production` (default: production)
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `OTP_TTL_SECONDS` - One-time-code lifetime (default: 300)
//! - `SMS_GATEWAY_URL` - HTTP SMS gateway endpoint (console delivery if unset)
//! - `SMS_GATEWAY_TOKEN` - Bearer token for the SMS gateway
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Signing secret substituted when `APP_ENV=development` and `JWT_SECRET` is
/// unset. Never accepted in production: secret validation rejects it there.
const DEV_JWT_SECRET: &str = "farmstellar-dev-signing-secret-0123456789abcdef";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application environment.
///
/// Controls the fixed diagnostic OTP code, the `sampleOtp` response field,
/// and whether the JWT secret fallback is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    Development,
    #[default]
    Production,
}

impl AppEnv {
    /// Whether the app runs in the diagnostic `development` mode.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::str::FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            _ => Err(format!("invalid app env: {s}")),
        }
    }
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Application environment
    pub app_env: AppEnv,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// One-time-code lifetime
    pub otp_ttl: Duration,
    /// HTTP SMS gateway configuration (console delivery when absent)
    pub sms: Option<SmsConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// HTTP SMS gateway configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct SmsConfig {
    /// Gateway endpoint URL
    pub gateway_url: String,
    /// Bearer token for the gateway
    pub token: SecretString,
}

impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("gateway_url", &self.gateway_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the JWT secret fails validation (placeholder detection, entropy
    /// check). Outside `development` a missing `JWT_SECRET` is fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_env("DATABASE_URL").map(SecretString::from)?;
        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let app_env = get_env_or_default("APP_ENV", "production")
            .parse::<AppEnv>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_ENV".to_string(), e))?;

        let jwt_secret = load_jwt_secret(app_env)?;

        let otp_ttl_seconds = get_env_or_default("OTP_TTL_SECONDS", "300")
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar("OTP_TTL_SECONDS".to_string(), e.to_string()))?;

        let sms = SmsConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            app_env,
            jwt_secret,
            otp_ttl: Duration::from_secs(otp_ttl_seconds),
            sms,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SmsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(gateway_url) = get_optional_env("SMS_GATEWAY_URL") else {
            return Ok(None);
        };

        let token = get_required_env("SMS_GATEWAY_TOKEN").map(SecretString::from)?;

        Ok(Some(Self { gateway_url, token }))
    }
}

/// Load the JWT signing secret, applying the environment-gated fallback.
///
/// In `development`, a missing `JWT_SECRET` substitutes the fixed dev secret
/// and validation is skipped. Everywhere else the variable is required and
/// must pass length, placeholder, and entropy checks.
fn load_jwt_secret(app_env: AppEnv) -> Result<SecretString, ConfigError> {
    match get_optional_env("JWT_SECRET") {
        Some(value) if app_env.is_development() => Ok(SecretString::from(value)),
        Some(value) => {
            validate_secret_length(&value, "JWT_SECRET")?;
            validate_secret_strength(&value, "JWT_SECRET")?;
            Ok(SecretString::from(value))
        }
        None if app_env.is_development() => {
            tracing::warn!("JWT_SECRET not set - using development fallback secret");
            Ok(SecretString::from(DEV_JWT_SECRET))
        }
        None => Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string())),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a secret meets minimum length requirements.
fn validate_secret_length(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_length_too_short() {
        let result = validate_secret_length("short", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_dev_fallback_rejected_by_production_validation() {
        // The dev fallback must never survive production secret checks
        assert!(validate_secret_strength(DEV_JWT_SECRET, "JWT_SECRET").is_err());
    }

    #[test]
    fn test_app_env_parse() {
        assert_eq!(
            "development".parse::<AppEnv>().unwrap(),
            AppEnv::Development
        );
        assert_eq!("production".parse::<AppEnv>().unwrap(), AppEnv::Production);
        assert!("staging".parse::<AppEnv>().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            app_env: AppEnv::Development,
            jwt_secret: SecretString::from(DEV_JWT_SECRET),
            otp_ttl: Duration::from_secs(300),
            sms: None,
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_sms_config_debug_redacts_token() {
        let config = SmsConfig {
            gateway_url: "https://sms.example.test/send".to_string(),
            token: SecretString::from("super_secret_gateway_token"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("https://sms.example.test/send"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_gateway_token"));
    }
}
