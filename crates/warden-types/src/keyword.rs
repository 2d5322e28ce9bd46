//! Reserved keyword identifiers.
//!
//! Some articles are identified by a literal keyword instead of a UUID:
//! the built-in constraints (`open`, `read`, `write`, `execute`), the
//! system agent (`system`), and resources named by short slugs (`doc1`).

use crate::TryNew;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest keyword accepted.
pub const MAX_KEYWORD_LEN: usize = 64;

/// Why a string was rejected as a [`Keyword`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordError {
    /// The string was empty.
    #[error("keyword must not be empty")]
    Empty,

    /// The string exceeded [`MAX_KEYWORD_LEN`].
    #[error("keyword '{0}' exceeds {MAX_KEYWORD_LEN} characters")]
    TooLong(String),

    /// The first character was not a lowercase ASCII letter.
    #[error("keyword '{0}' must start with a lowercase letter")]
    BadStart(String),

    /// A character outside `[a-z0-9._-]` was found.
    #[error("keyword '{keyword}' contains invalid character '{found}'")]
    InvalidChar {
        /// The rejected keyword.
        keyword: String,
        /// The offending character.
        found: char,
    },
}

/// A validated keyword: `[a-z][a-z0-9._-]{0,63}`.
///
/// # Example
///
/// ```
/// use warden_types::{Keyword, TryNew};
///
/// let kw = Keyword::try_new("write".to_string()).expect("valid keyword");
/// assert_eq!(kw.as_str(), "write");
///
/// assert!(Keyword::try_new("Write".to_string()).is_err());
/// assert!(Keyword::try_new("/accounts".to_string()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Keyword(String);

impl Keyword {
    /// Returns the keyword text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryNew for Keyword {
    type Error = KeywordError;
    type Args = String;

    fn try_new(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(KeywordError::Empty);
        };
        if value.len() > MAX_KEYWORD_LEN {
            return Err(KeywordError::TooLong(value));
        }
        if !first.is_ascii_lowercase() {
            return Err(KeywordError::BadStart(value));
        }
        if let Some(found) = chars.find(|c| {
            !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        }) {
            return Err(KeywordError::InvalidChar {
                keyword: value,
                found,
            });
        }
        Ok(Self(value))
    }
}

impl TryFrom<String> for Keyword {
    type Error = KeywordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl TryFrom<&str> for Keyword {
    type Error = KeywordError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value.to_string())
    }
}

impl From<Keyword> for String {
    fn from(value: Keyword) -> Self {
        value.0
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_slugs() {
        for ok in ["open", "doc1", "db.client", "agent-system", "a_b"] {
            assert!(Keyword::try_from(ok).is_ok(), "{ok} should be accepted");
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Keyword::try_from(""), Err(KeywordError::Empty));
        assert!(matches!(
            Keyword::try_from("1doc"),
            Err(KeywordError::BadStart(_))
        ));
        assert!(matches!(
            Keyword::try_from("doc 1"),
            Err(KeywordError::InvalidChar { found: ' ', .. })
        ));
        let long = "a".repeat(MAX_KEYWORD_LEN + 1);
        assert!(matches!(
            Keyword::try_new(long),
            Err(KeywordError::TooLong(_))
        ));
    }

    #[test]
    fn serde_validates() {
        let kw: Keyword = serde_json::from_str("\"read\"").expect("valid keyword json");
        assert_eq!(kw.as_str(), "read");
        assert!(serde_json::from_str::<Keyword>("\"READ\"").is_err());
    }
}
