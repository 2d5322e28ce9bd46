//! Subjects: anything that can be granted access.

use crate::{Agent, Role};
use std::sync::Arc;
use warden_types::{Identity, SubjectId};

/// An agent or a role.
///
/// Subjects compare equal when their identifiers match.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_auth::{Agent, Subject};
///
/// let system = Subject::from(Arc::new(Agent::system()));
/// assert_eq!(system.name(), "System");
/// assert!(system.as_agent().is_some());
/// ```
#[derive(Debug, Clone)]
pub enum Subject {
    /// An acting principal.
    Agent(Arc<Agent>),
    /// A capability bundle.
    Role(Arc<dyn Role>),
}

impl Subject {
    /// Returns the subject identity.
    #[must_use]
    pub fn identity(&self) -> &Identity<SubjectId> {
        match self {
            Self::Agent(agent) => agent.identity(),
            Self::Role(role) => role.identity(),
        }
    }

    /// Returns the subject identifier.
    #[must_use]
    pub fn id(&self) -> &SubjectId {
        self.identity().id()
    }

    /// Returns the common name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.identity().name()
    }

    /// Returns the agent, if this subject is one.
    #[must_use]
    pub fn as_agent(&self) -> Option<&Arc<Agent>> {
        match self {
            Self::Agent(agent) => Some(agent),
            Self::Role(_) => None,
        }
    }

    /// Returns the role, if this subject is one.
    #[must_use]
    pub fn as_role(&self) -> Option<&Arc<dyn Role>> {
        match self {
            Self::Agent(_) => None,
            Self::Role(role) => Some(role),
        }
    }
}

impl PartialEq for Subject {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Subject {}

impl From<Arc<Agent>> for Subject {
    fn from(value: Arc<Agent>) -> Self {
        Self::Agent(value)
    }
}

impl From<Arc<dyn Role>> for Subject {
    fn from(value: Arc<dyn Role>) -> Self {
        Self::Role(value)
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identity())
    }
}
