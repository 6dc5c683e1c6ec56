//! Quest identifier and progress status types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`QuestId`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum QuestIdError {
    /// The input string is empty.
    #[error("quest id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("quest id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A quest identifier.
///
/// Quest ids are canonical lowercase strings (e.g. `soil_scout`). Keeping a
/// single string representation at every boundary avoids comparing the same
/// identifier under two different types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct QuestId(String);

impl QuestId {
    /// Maximum length of a quest id.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `QuestId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or longer than 64 characters.
    pub fn parse(s: &str) -> Result<Self, QuestIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(QuestIdError::Empty);
        }

        if trimmed.len() > Self::MAX_LENGTH {
            return Err(QuestIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the quest id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `QuestId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for QuestId {
    type Err = QuestIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for QuestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for QuestId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for QuestId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for QuestId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Per-user progress status for a quest.
///
/// The machine is linear: `NotStarted -> InProgress -> Submitted ->
/// Completed`. Auto-completion may jump from any non-completed state straight
/// to `Completed`; a completed entry is never regressed by completion
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "quest_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    #[default]
    NotStarted,
    InProgress,
    Submitted,
    Completed,
}

impl QuestStatus {
    /// Whether this status is the terminal `Completed` state.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Submitted => write!(f, "submitted"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for QuestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid quest status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quest_id_parse() {
        assert_eq!(QuestId::parse("soil_scout").unwrap().as_str(), "soil_scout");
        // surrounding whitespace is dropped
        assert_eq!(QuestId::parse(" crops ").unwrap().as_str(), "crops");
    }

    #[test]
    fn test_quest_id_empty() {
        assert!(matches!(QuestId::parse(""), Err(QuestIdError::Empty)));
        assert!(matches!(QuestId::parse("   "), Err(QuestIdError::Empty)));
    }

    #[test]
    fn test_quest_id_too_long() {
        let long = "q".repeat(65);
        assert!(matches!(
            QuestId::parse(&long),
            Err(QuestIdError::TooLong { .. })
        ));
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&QuestStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: QuestStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, QuestStatus::Completed);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "submitted".parse::<QuestStatus>().unwrap(),
            QuestStatus::Submitted
        );
        assert!("done".parse::<QuestStatus>().is_err());
    }

    #[test]
    fn test_status_is_completed() {
        assert!(QuestStatus::Completed.is_completed());
        assert!(!QuestStatus::Submitted.is_completed());
        assert!(!QuestStatus::NotStarted.is_completed());
    }

    #[test]
    fn test_status_default() {
        assert_eq!(QuestStatus::default(), QuestStatus::NotStarted);
    }
}
