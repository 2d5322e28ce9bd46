//! Delegated per-resource permissions.
//!
//! A delegation maps `(constraint, resource)` pairs to the set of subjects
//! permitted to act on that resource under that constraint.
//!
//! # Semantics
//!
//! | State of the pair | `has_permission` |
//! |-------------------|------------------|
//! | no entry | `true` for everyone (default-open) |
//! | entry, subject not listed | `false` |
//! | entry, subject listed | `true` |
//!
//! Matching is exact on `(constraint, resource)`; there are no wildcards.
//!
//! # Architecture
//!
//! ```text
//! Delegation trait (warden-auth)   ← trait definition (THIS MODULE)
//!          │
//!          └── Delegate (warden-runtime)   ← concrete, registry-cached impl
//! ```
//!
//! The `authority` argument records who set up or granted an entry. It is
//! not checked against any governing policy; any subject may act as an
//! authority.

use crate::{AccessControlError, Agent, Authorization};
use warden_types::{ConstraintId, ResourceId, SubjectId};

/// Per-resource permission delegation.
///
/// Implementations must be `Send + Sync`; one delegate is shared by every
/// transaction in the process.
pub trait Delegation: Send + Sync + std::fmt::Debug {
    /// Creates empty entries for every `(constraint, resource)` pair not
    /// already present. Existing entries are left unchanged.
    fn set_constraint(
        &self,
        authority: &SubjectId,
        constraints: &[ConstraintId],
        resources: &[ResourceId],
    );

    /// Adds `subject` to the permitted set of an existing entry.
    ///
    /// Returns `false` (and changes nothing) when no entry exists.
    fn grant_permission(
        &self,
        authority: &SubjectId,
        subject: &SubjectId,
        constraint: &ConstraintId,
        resource: &ResourceId,
    ) -> bool;

    /// Returns `true` when no entry exists, else whether `subject` is
    /// permitted.
    fn has_permission(
        &self,
        authority: &SubjectId,
        subject: &SubjectId,
        constraint: &ConstraintId,
        resource: &ResourceId,
    ) -> bool;

    /// Removes `subject` from an entry. Returns `true` if it was listed.
    fn revoke_permission(
        &self,
        subject: &SubjectId,
        constraint: &ConstraintId,
        resource: &ResourceId,
    ) -> bool;

    /// Drops an entry, reopening the pair. Returns `true` if it existed.
    fn remove_constraint(&self, constraint: &ConstraintId, resource: &ResourceId) -> bool;

    /// Returns the number of entries.
    fn constraint_count(&self) -> usize;

    /// Typed verdict for `agent`: guests get 401, others 403.
    fn check(
        &self,
        authority: &SubjectId,
        agent: &Agent,
        constraint: &ConstraintId,
        resource: &ResourceId,
    ) -> Authorization {
        Authorization::for_agent(
            self.has_permission(authority, agent.id(), constraint, resource),
            agent,
        )
    }

    /// Typed check as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessControlError::ConstraintDenied`] when `agent` is not
    /// permitted.
    fn require(
        &self,
        authority: &SubjectId,
        agent: &Agent,
        constraint: &ConstraintId,
        resource: &ResourceId,
    ) -> Result<(), AccessControlError> {
        match self.check(authority, agent, constraint, resource) {
            Authorization::Authorized => Ok(()),
            Authorization::Denied { code } => Err(AccessControlError::ConstraintDenied {
                subject: agent.id().clone(),
                constraint: constraint.clone(),
                resource: resource.clone(),
                code,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DenyCode;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};

    /// Minimal in-memory delegation for exercising the provided methods.
    #[derive(Debug, Default)]
    struct MapDelegation {
        entries: Mutex<HashMap<(ConstraintId, ResourceId), HashSet<SubjectId>>>,
    }

    impl Delegation for MapDelegation {
        fn set_constraint(
            &self,
            _authority: &SubjectId,
            constraints: &[ConstraintId],
            resources: &[ResourceId],
        ) {
            let mut entries = self.entries.lock();
            for c in constraints {
                for r in resources {
                    entries.entry((c.clone(), r.clone())).or_default();
                }
            }
        }

        fn grant_permission(
            &self,
            _authority: &SubjectId,
            subject: &SubjectId,
            constraint: &ConstraintId,
            resource: &ResourceId,
        ) -> bool {
            match self
                .entries
                .lock()
                .get_mut(&(constraint.clone(), resource.clone()))
            {
                Some(set) => {
                    set.insert(subject.clone());
                    true
                }
                None => false,
            }
        }

        fn has_permission(
            &self,
            _authority: &SubjectId,
            subject: &SubjectId,
            constraint: &ConstraintId,
            resource: &ResourceId,
        ) -> bool {
            self.entries
                .lock()
                .get(&(constraint.clone(), resource.clone()))
                .map_or(true, |set| set.contains(subject))
        }

        fn revoke_permission(
            &self,
            subject: &SubjectId,
            constraint: &ConstraintId,
            resource: &ResourceId,
        ) -> bool {
            self.entries
                .lock()
                .get_mut(&(constraint.clone(), resource.clone()))
                .is_some_and(|set| set.remove(subject))
        }

        fn remove_constraint(&self, constraint: &ConstraintId, resource: &ResourceId) -> bool {
            self.entries
                .lock()
                .remove(&(constraint.clone(), resource.clone()))
                .is_some()
        }

        fn constraint_count(&self) -> usize {
            self.entries.lock().len()
        }
    }

    #[test]
    fn check_reports_deny_code_by_agent() {
        let d = MapDelegation::default();
        let authority = SubjectId::from("system");
        let write = ConstraintId::from("write");
        let doc = ResourceId::from("doc1");
        d.set_constraint(&authority, &[write.clone()], &[doc.clone()]);

        let guest = Agent::guest();
        let user = Agent::user("u");
        assert_eq!(
            d.check(&authority, &guest, &write, &doc).deny_code(),
            Some(DenyCode::Unauthenticated)
        );
        assert_eq!(
            d.check(&authority, &user, &write, &doc).deny_code(),
            Some(DenyCode::Forbidden)
        );

        assert!(d.grant_permission(&authority, user.id(), &write, &doc));
        assert!(d.require(&authority, &user, &write, &doc).is_ok());
        assert!(d.require(&authority, &guest, &write, &doc).is_err());
    }

    #[test]
    fn unconstrained_pair_is_open() {
        let d = MapDelegation::default();
        let guest = Agent::guest();
        assert!(d
            .check(
                &SubjectId::random(),
                &guest,
                &ConstraintId::from("read"),
                &ResourceId::from("anything")
            )
            .is_authorized());
    }
}
