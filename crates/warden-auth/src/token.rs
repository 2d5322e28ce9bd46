//! Credential tokens carried by roles.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_types::ErrorCode;

/// Error encoding or decoding a [`Token`].
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token could not be written as JSON.
    #[error("token encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The input was not a valid token document.
    #[error("token decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ErrorCode for TokenError {
    fn code(&self) -> &'static str {
        match self {
            Self::Encode(_) => "TOKEN_ENCODE",
            Self::Decode(_) => "TOKEN_DECODE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Credential payload bound to a role.
///
/// `Debug` never prints secrets.
///
/// # Example
///
/// ```
/// use warden_auth::Token;
///
/// let token = Token::credentials("app", "s3cret");
/// let json = token.serialize().expect("encode");
/// assert_eq!(Token::deserialize(&json).expect("decode"), token);
/// assert!(!format!("{token:?}").contains("s3cret"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    /// Username and password.
    Credentials {
        /// Login name.
        username: String,
        /// Secret.
        password: String,
    },
    /// Opaque bearer string.
    Bearer {
        /// Secret.
        token: String,
    },
}

impl Token {
    /// Creates a username/password token.
    #[must_use]
    pub fn credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates a bearer token.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Returns the username, for credential tokens.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Credentials { username, .. } => Some(username),
            Self::Bearer { .. } => None,
        }
    }

    /// Encodes the token as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if serialization fails.
    pub fn serialize(&self) -> Result<String, TokenError> {
        serde_json::to_string(self).map_err(TokenError::Encode)
    }

    /// Decodes a token from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Decode`] if `input` is not a token.
    pub fn deserialize(input: &str) -> Result<Self, TokenError> {
        serde_json::from_str(input).map_err(TokenError::Decode)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credentials { username, .. } => f
                .debug_struct("Credentials")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}
