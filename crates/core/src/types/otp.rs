//! One-time code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OtpCodeError {
    /// The input is not exactly the required number of digits.
    #[error("OTP must be exactly {expected} digits")]
    WrongLength {
        /// Required digit count.
        expected: usize,
    },
    /// The input contains a non-digit character.
    #[error("OTP must contain only digits")]
    NonDigit,
}

/// A one-time verification code.
///
/// Exactly 6 ASCII digits. Codes are generated by the OTP issuer and
/// delivered out of band; this type only validates shape, never correctness
/// against the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a valid code.
    pub const DIGITS: usize = 6;

    /// Parse an `OtpCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 6 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpCodeError> {
        if s.len() != Self::DIGITS {
            return Err(OtpCodeError::WrongLength {
                expected: Self::DIGITS,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Build a code from a numeric value in `[100000, 999999]`.
    ///
    /// Used by the issuer after drawing a uniform random value; out-of-range
    /// values are a caller bug and map to the shape error.
    ///
    /// # Errors
    ///
    /// Returns [`OtpCodeError::WrongLength`] if `n` is outside the 6-digit range.
    pub fn from_number(n: u32) -> Result<Self, OtpCodeError> {
        if !(100_000..=999_999).contains(&n) {
            return Err(OtpCodeError::WrongLength {
                expected: Self::DIGITS,
            });
        }
        Ok(Self(n.to_string()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OtpCode {
    type Err = OtpCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for OtpCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OtpCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OtpCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OtpCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(OtpCode::parse("123456").is_ok());
        assert!(OtpCode::parse("000000").is_ok());
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            OtpCode::parse("12345"),
            Err(OtpCodeError::WrongLength { .. })
        ));
        assert!(matches!(
            OtpCode::parse("1234567"),
            Err(OtpCodeError::WrongLength { .. })
        ));
    }

    #[test]
    fn test_parse_non_digit() {
        assert!(matches!(
            OtpCode::parse("12a456"),
            Err(OtpCodeError::NonDigit)
        ));
    }

    #[test]
    fn test_from_number() {
        assert_eq!(OtpCode::from_number(123_456).unwrap().as_str(), "123456");
        assert_eq!(OtpCode::from_number(100_000).unwrap().as_str(), "100000");
        assert_eq!(OtpCode::from_number(999_999).unwrap().as_str(), "999999");

        assert!(OtpCode::from_number(99_999).is_err());
        assert!(OtpCode::from_number(1_000_000).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let code = OtpCode::parse("654321").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"654321\"");

        let parsed: OtpCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
    }
}
