//! Identifier types for Warden articles.
//!
//! Every subject, resource, constraint, command and transaction is an
//! *article*: something with an access-control identity. An article is
//! identified either by a UUID or by a reserved [`Keyword`].
//!
//! # UUID Strategy
//!
//! | Constructor | UUID | Identity style |
//! |-------------|------|----------------|
//! | `random()` | v4 | dynamic (runtime-assigned) |
//! | `derived(name)` | v5 under the Warden namespace | static |
//! | `keyword(kw)` | none, the keyword is the id | static |
//!
//! Derived UUIDs are stable across processes, so a command or constraint
//! defined in code has the same identity everywhere.

use crate::{Keyword, KeywordError, TryNew};
use serde::{Deserialize, Serialize};
use uuid::{uuid, Uuid};

/// Namespace for deterministic UUID v5 derivation.
const WARDEN_NAMESPACE: Uuid = uuid!("6f1d2c4e-8b3a-4d57-9e0f-2a7c5b1e9d40");

/// A UUID or keyword identifying an article.
///
/// # Example
///
/// ```
/// use warden_types::ArticleId;
///
/// // Keywords stay literal
/// let write = ArticleId::from("write");
/// assert!(write.is_keyword());
/// assert_eq!(write.to_string(), "write");
///
/// // Anything else that is not a UUID is derived deterministically
/// assert_eq!(ArticleId::from("/accounts"), ArticleId::from("/accounts"));
/// assert!(!ArticleId::from("/accounts").is_keyword());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    /// UUID identity (random or derived).
    Uuid(Uuid),
    /// Reserved literal keyword.
    Keyword(Keyword),
}

impl ArticleId {
    /// Creates a dynamic identifier with a random UUID v4.
    #[must_use]
    pub fn random() -> Self {
        Self::Uuid(Uuid::new_v4())
    }

    /// Creates a static identifier derived from `name` (UUID v5).
    #[must_use]
    pub fn derived(name: &str) -> Self {
        Self::Uuid(Uuid::new_v5(&WARDEN_NAMESPACE, name.as_bytes()))
    }

    /// Creates a keyword identifier.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError`] if `keyword` is not a valid keyword.
    pub fn keyword(keyword: &str) -> Result<Self, KeywordError> {
        Keyword::try_new(keyword.to_string()).map(Self::Keyword)
    }

    /// Parses `value` as a UUID, then as a keyword, and otherwise derives
    /// a UUID from it.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if let Ok(uuid) = Uuid::parse_str(value) {
            return Self::Uuid(uuid);
        }
        match Keyword::try_new(value.to_string()) {
            Ok(kw) => Self::Keyword(kw),
            Err(_) => Self::derived(value),
        }
    }

    /// Returns `true` for keyword identifiers.
    #[must_use]
    pub fn is_keyword(&self) -> bool {
        matches!(self, Self::Keyword(_))
    }

    /// Returns the UUID, if this is a UUID identifier.
    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(uuid) => Some(*uuid),
            Self::Keyword(_) => None,
        }
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for ArticleId {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Uuid> for ArticleId {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<Keyword> for ArticleId {
    fn from(value: Keyword) -> Self {
        Self::Keyword(value)
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uuid(uuid) => write!(f, "{uuid}"),
            Self::Keyword(kw) => write!(f, "{kw}"),
        }
    }
}

/// Defines a typed wrapper around [`ArticleId`].
macro_rules! article_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(ArticleId);

        impl $name {
            /// Creates a dynamic identifier with a random UUID v4.
            #[must_use]
            pub fn random() -> Self {
                Self(ArticleId::random())
            }

            /// Creates a static identifier derived from `name`.
            #[must_use]
            pub fn derived(name: &str) -> Self {
                Self(ArticleId::derived(name))
            }

            /// Creates a keyword identifier.
            ///
            /// # Errors
            ///
            /// Returns [`KeywordError`] if `keyword` is not a valid keyword.
            pub fn keyword(keyword: &str) -> Result<Self, KeywordError> {
                ArticleId::keyword(keyword).map(Self)
            }

            /// Returns the underlying article identifier.
            #[must_use]
            pub fn article(&self) -> &ArticleId {
                &self.0
            }
        }

        impl From<ArticleId> for $name {
            fn from(value: ArticleId) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(ArticleId::parse(value))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(ArticleId::parse(&value))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

article_id!(
    /// Identifier of a subject: an agent or a role.
    SubjectId,
    "subject"
);

article_id!(
    /// Identifier of a protected or resolved resource.
    ResourceId,
    "resource"
);

article_id!(
    /// Identifier of a constraint category (`open`, `read`, ...).
    ConstraintId,
    "constraint"
);

article_id!(
    /// Static identifier of a command kind.
    CommandId,
    "command"
);

article_id!(
    /// Identifier of a transaction.
    TransactionId,
    "txn"
);

article_id!(
    /// Identifier of an incoming request.
    RequestId,
    "req"
);

article_id!(
    /// Identifier of a command target in a chain.
    TargetId,
    "target"
);

// Tests are in lib.rs as integration tests for public API
