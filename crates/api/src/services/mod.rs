//! Application services.
//!
//! Services own the business rules and sit between the route handlers and
//! the repositories:
//!
//! - [`otp`] - one-time-code issuance and verification
//! - [`auth`] - identity resolution, onboarding, current-user lookup
//! - [`token`] - signed bearer token issuance/verification
//! - [`progress`] - quest progress ledger and XP awards
//! - [`sms`] - delivery collaborator for one-time codes

pub mod auth;
pub mod otp;
pub mod progress;
pub mod sms;
pub mod token;

pub use auth::{AuthError, AuthService, LoginOutcome};
pub use otp::{OtpError, OtpService};
pub use progress::{CompletionReward, ProgressError, ProgressService};
pub use sms::{SmsError, SmsGateway};
pub use token::TokenService;
