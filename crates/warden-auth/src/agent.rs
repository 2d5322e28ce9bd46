//! Acting principals.
//!
//! An [`Agent`] is the subject on whose behalf a request runs. Its
//! [`AgentKind`] decides which roles may be assigned to it; the roles it
//! holds decide which commands and resources it may reach.
//!
//! # Kinds
//!
//! | Kind | Identity | Authenticated |
//! |------|----------|---------------|
//! | `System` | static keyword `system` | yes |
//! | `Guest` | dynamic | **no** |
//! | `User` | dynamic | yes |
//! | `Application` | static, derived from the name | yes |
//! | `OAuthUser` | dynamic | yes |

use crate::{AccessControlError, Role};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use warden_types::{Identity, IdentityStyle, SubjectId};

/// What sort of principal an agent is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AgentKind {
    /// The process itself.
    System,
    /// An unauthenticated visitor.
    Guest,
    /// A signed-in human.
    User,
    /// Another program acting under its own identity.
    Application,
    /// A human authenticated by an external identity provider.
    #[serde(rename = "oauth_user")]
    OAuthUser {
        /// Provider name, e.g. `github`.
        provider: String,
    },
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Guest => write!(f, "guest"),
            Self::User => write!(f, "user"),
            Self::Application => write!(f, "application"),
            Self::OAuthUser { provider } => write!(f, "oauth:{provider}"),
        }
    }
}

/// An acting principal and the roles assigned to it.
///
/// Roles are keyed by role id, so assigning the same role twice keeps one
/// entry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_auth::{Agent, AdministratorRole, DatabaseClientRole, Role};
///
/// let alice = Agent::user("alice");
/// let client: Arc<dyn Role> = Arc::new(DatabaseClientRole::new("db://main", None));
/// alice.assign_role(client).expect("users may be database clients");
/// assert!(alice.has_role(&DatabaseClientRole::role_id()));
///
/// // Only the system agent may administer.
/// assert!(alice.assign_role(Arc::new(AdministratorRole::new())).is_err());
/// ```
#[derive(Debug)]
pub struct Agent {
    identity: Identity<SubjectId>,
    kind: AgentKind,
    roles: RwLock<HashMap<SubjectId, Arc<dyn Role>>>,
}

impl Agent {
    /// Creates an agent from an identity and kind.
    #[must_use]
    pub fn new(identity: Identity<SubjectId>, kind: AgentKind) -> Self {
        Self {
            identity,
            kind,
            roles: RwLock::new(HashMap::new()),
        }
    }

    /// The system agent.
    #[must_use]
    pub fn system() -> Self {
        let identity =
            Identity::from_parts(SubjectId::from("system"), "System", IdentityStyle::Static);
        Self::new(identity, AgentKind::System)
    }

    /// A fresh guest.
    #[must_use]
    pub fn guest() -> Self {
        Self::new(Identity::dynamic("Guest"), AgentKind::Guest)
    }

    /// A signed-in user.
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self::new(Identity::dynamic(name), AgentKind::User)
    }

    /// An application with a stable identity derived from `name`.
    #[must_use]
    pub fn application(name: impl Into<String>) -> Self {
        Self::new(Identity::fixed(name), AgentKind::Application)
    }

    /// A user authenticated by `provider`.
    #[must_use]
    pub fn oauth_user(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::new(
            Identity::dynamic(name),
            AgentKind::OAuthUser {
                provider: provider.into(),
            },
        )
    }

    /// Returns the agent identifier.
    #[must_use]
    pub fn id(&self) -> &SubjectId {
        self.identity.id()
    }

    /// Returns the common name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Returns the full identity.
    #[must_use]
    pub fn identity(&self) -> &Identity<SubjectId> {
        &self.identity
    }

    /// Returns the agent kind.
    #[must_use]
    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    /// Returns `false` only for guests.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.kind != AgentKind::Guest
    }

    /// Assigns `role` if it authorizes this agent.
    ///
    /// # Errors
    ///
    /// Returns [`AccessControlError::RoleRejected`] if
    /// [`Role::is_authorized`] is false for this agent.
    pub fn assign_role(&self, role: Arc<dyn Role>) -> Result<(), AccessControlError> {
        if !role.is_authorized(self) {
            tracing::warn!(
                agent = %self.id(),
                kind = %self.kind,
                role = role.identity().name(),
                "role rejected agent"
            );
            return Err(AccessControlError::RoleRejected {
                role: role.identity().name().to_string(),
                agent: self.id().clone(),
            });
        }
        let role_id = role.identity().id().clone();
        tracing::debug!(agent = %self.id(), role = %role_id, "role assigned");
        self.roles.write().insert(role_id, role);
        Ok(())
    }

    /// Removes a role. Returns `true` if it was held.
    pub fn revoke_role(&self, role_id: &SubjectId) -> bool {
        self.roles.write().remove(role_id).is_some()
    }

    /// Returns `true` if the role is held.
    #[must_use]
    pub fn has_role(&self, role_id: &SubjectId) -> bool {
        self.roles.read().contains_key(role_id)
    }

    /// Returns a held role.
    #[must_use]
    pub fn role(&self, role_id: &SubjectId) -> Option<Arc<dyn Role>> {
        self.roles.read().get(role_id).cloned()
    }

    /// Returns all held roles, in no particular order.
    #[must_use]
    pub fn roles(&self) -> Vec<Arc<dyn Role>> {
        self.roles.read().values().cloned().collect()
    }
}
