//! Article identity: id, common name and identity style.

use crate::{ArticleId, KeywordError};
use serde::{Deserialize, Serialize};

/// How an article's identifier was assigned.
///
/// | Style | Assigned | Examples |
/// |-------|----------|----------|
/// | `Static` | At definition time | commands, constraints, the system agent |
/// | `Dynamic` | At runtime | guest agents, resource instances, transactions |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStyle {
    /// Fixed identifier (keyword or derived UUID).
    Static,
    /// Runtime-assigned random identifier.
    Dynamic,
}

/// The access-control identity of an article.
///
/// `I` is one of the typed identifiers, e.g. [`SubjectId`](crate::SubjectId).
///
/// # Example
///
/// ```
/// use warden_types::{Identity, IdentityStyle, SubjectId};
///
/// let system: Identity<SubjectId> = Identity::keyword("system", "System")
///     .expect("valid keyword");
/// assert_eq!(system.style(), IdentityStyle::Static);
/// assert_eq!(system.id().to_string(), "subject:system");
///
/// let guest: Identity<SubjectId> = Identity::dynamic("Guest");
/// assert_eq!(guest.style(), IdentityStyle::Dynamic);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity<I> {
    id: I,
    name: String,
    style: IdentityStyle,
}

impl<I: From<ArticleId>> Identity<I> {
    /// Static identity whose UUID is derived from `name`.
    #[must_use]
    pub fn fixed(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: I::from(ArticleId::derived(&name)),
            name,
            style: IdentityStyle::Static,
        }
    }

    /// Static identity identified by a keyword.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError`] if `keyword` is invalid.
    pub fn keyword(keyword: &str, name: impl Into<String>) -> Result<Self, KeywordError> {
        Ok(Self {
            id: I::from(ArticleId::keyword(keyword)?),
            name: name.into(),
            style: IdentityStyle::Static,
        })
    }

    /// Dynamic identity with a fresh random UUID.
    #[must_use]
    pub fn dynamic(name: impl Into<String>) -> Self {
        Self {
            id: I::from(ArticleId::random()),
            name: name.into(),
            style: IdentityStyle::Dynamic,
        }
    }
}

impl<I> Identity<I> {
    /// Builds an identity from parts.
    #[must_use]
    pub fn from_parts(id: I, name: impl Into<String>, style: IdentityStyle) -> Self {
        Self {
            id,
            name: name.into(),
            style,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &I {
        &self.id
    }

    /// Returns the common name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns how the identifier was assigned.
    #[must_use]
    pub fn style(&self) -> IdentityStyle {
        self.style
    }

    /// Returns `true` for statically identified articles.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.style == IdentityStyle::Static
    }
}

impl<I: std::fmt::Display> std::fmt::Display for Identity<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
