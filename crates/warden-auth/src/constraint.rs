//! Constraint categories.
//!
//! A constraint is a static article naming a kind of restriction on a
//! resource. Constraints are identified by keyword and always apply at
//! resource scope.
//!
//! | Constraint | Keyword |
//! |------------|---------|
//! | Open | `open` |
//! | Read | `read` |
//! | Write | `write` |
//! | Execute | `execute` |
//! | Custom | any other keyword |

use serde::{Deserialize, Serialize};
use warden_types::{ConstraintId, Identity, IdentityStyle, Keyword, KeywordError, TryNew};

/// Where a constraint applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintScope {
    /// A single resource.
    Resource,
}

impl ConstraintScope {
    /// Returns the scope name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "RESOURCE",
        }
    }
}

/// The category of a [`Constraint`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Open (view) a resource.
    Open,
    /// Read its contents.
    Read,
    /// Modify it.
    Write,
    /// Run it.
    Execute,
    /// Application-defined category.
    Custom(Keyword),
}

impl ConstraintKind {
    /// Returns the keyword for this category.
    #[must_use]
    pub fn keyword(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Read => "read",
            Self::Write => "write",
            Self::Execute => "execute",
            Self::Custom(kw) => kw.as_str(),
        }
    }
}

/// A named restriction category.
///
/// # Example
///
/// ```
/// use warden_auth::{Constraint, ConstraintScope};
/// use warden_types::ConstraintId;
///
/// let write = Constraint::write();
/// assert_eq!(write.id(), &ConstraintId::from("write"));
/// assert_eq!(write.scope(), ConstraintScope::Resource);
///
/// let approve = Constraint::custom("approve").expect("valid keyword");
/// assert_eq!(approve.id().to_string(), "constraint:approve");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    identity: Identity<ConstraintId>,
    kind: ConstraintKind,
}

impl Constraint {
    fn from_kind(kind: ConstraintKind, name: &str) -> Self {
        let id = ConstraintId::from(kind.keyword());
        Self {
            identity: Identity::from_parts(id, name, IdentityStyle::Static),
            kind,
        }
    }

    /// The `open` constraint.
    #[must_use]
    pub fn open() -> Self {
        Self::from_kind(ConstraintKind::Open, "Open")
    }

    /// The `read` constraint.
    #[must_use]
    pub fn read() -> Self {
        Self::from_kind(ConstraintKind::Read, "Read")
    }

    /// The `write` constraint.
    #[must_use]
    pub fn write() -> Self {
        Self::from_kind(ConstraintKind::Write, "Write")
    }

    /// The `execute` constraint.
    #[must_use]
    pub fn execute() -> Self {
        Self::from_kind(ConstraintKind::Execute, "Execute")
    }

    /// A custom constraint identified by `keyword`.
    ///
    /// Built-in keywords map to their built-in constraint.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError`] if `keyword` is invalid.
    pub fn custom(keyword: &str) -> Result<Self, KeywordError> {
        Ok(match keyword {
            "open" => Self::open(),
            "read" => Self::read(),
            "write" => Self::write(),
            "execute" => Self::execute(),
            _ => {
                let kw = Keyword::try_new(keyword.to_string())?;
                Self::from_kind(ConstraintKind::Custom(kw), keyword)
            }
        })
    }

    /// Returns the constraint identifier.
    #[must_use]
    pub fn id(&self) -> &ConstraintId {
        self.identity.id()
    }

    /// Returns the full identity.
    #[must_use]
    pub fn identity(&self) -> &Identity<ConstraintId> {
        &self.identity
    }

    /// Returns the category.
    #[must_use]
    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    /// Always [`ConstraintScope::Resource`].
    #[must_use]
    pub fn scope(&self) -> ConstraintScope {
        ConstraintScope::Resource
    }
}

impl From<&Constraint> for ConstraintId {
    fn from(value: &Constraint) -> Self {
        value.id().clone()
    }
}
