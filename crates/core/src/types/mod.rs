//! Core types for Farmstellar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod otp;
pub mod phone;
pub mod quest;
pub mod xp;

pub use id::*;
pub use otp::{OtpCode, OtpCodeError};
pub use phone::{Phone, PhoneError};
pub use quest::{QuestId, QuestIdError, QuestStatus};
pub use xp::level_for_xp;
