//! Algerian mobile phone numbers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a phone number fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid phone number")]
pub struct PhoneNumberError;

/// A validated mobile number: ten digits, `0` then `5`, `6` or `7`.
///
/// Whitespace anywhere in the input is dropped before matching, so
/// `"055 123 4567"` is accepted and stored as `"0551234567"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneNumberError`] if the digits do not form a mobile number.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = compact.as_bytes();

        let valid = bytes.len() == 10
            && bytes.first() == Some(&b'0')
            && matches!(bytes.get(1), Some(b'5' | b'6' | b'7'))
            && bytes.iter().all(u8::is_ascii_digit);

        if valid {
            Ok(Self(compact))
        } else {
            Err(PhoneNumberError)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mobile_numbers() {
        for input in ["0551234567", "0661234567", "0771234567"] {
            assert_eq!(PhoneNumber::parse(input).unwrap().as_str(), input);
        }
    }

    #[test]
    fn test_whitespace_is_stripped() {
        let phone = PhoneNumber::parse(" 055 12 34 567 ").unwrap();
        assert_eq!(phone.as_str(), "0551234567");
    }

    #[test]
    fn test_too_short() {
        assert_eq!(PhoneNumber::parse("0612345"), Err(PhoneNumberError));
    }

    #[test]
    fn test_wrong_prefix() {
        assert!(PhoneNumber::parse("0451234567").is_err());
        assert!(PhoneNumber::parse("1551234567").is_err());
    }

    #[test]
    fn test_non_digits() {
        assert!(PhoneNumber::parse("05512345a7").is_err());
        assert!(PhoneNumber::parse("+213551234").is_err());
        assert!(PhoneNumber::parse("").is_err());
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        assert!(PhoneNumber::parse("055123456٧").is_err());
    }
}
