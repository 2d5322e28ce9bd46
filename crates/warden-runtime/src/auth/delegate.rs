//! Default implementation of [`Delegation`].
//!
//! # Architecture
//!
//! ```text
//! Delegation trait (warden-auth)   ← abstract definition
//!          │
//!          └── Delegate (THIS MODULE)   ← concrete, registry-cached impl
//! ```
//!
//! # Layout
//!
//! ```text
//! ConstraintId ──▶ ResourceId ──▶ DelegateEntry { authority, grants: subject → grantor }
//! ```
//!
//! A missing entry means the pair is open to everyone. An entry with no
//! grants is closed to everyone until a subject is granted.
//!
//! # Persistence
//!
//! When registered with a non-empty locator, `wakeup` reads a
//! [`DelegateSnapshot`] from that file (if present) and `sleep` writes it
//! back atomically.

use crate::registry::{
    ensure_parent_dir, expand_tilde, write_atomic, CacheClass, CacheObject, SleepError,
    StoreError, WakeupContext, WakeupError,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use warden_auth::{Agent, Delegation};
use warden_types::{ConstraintId, ResourceId, SubjectId};

/// Who set up one `(constraint, resource)` pair, and who may act on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateEntry {
    authority: SubjectId,
    grants: BTreeMap<SubjectId, SubjectId>,
}

impl DelegateEntry {
    fn new(authority: SubjectId) -> Self {
        Self {
            authority,
            grants: BTreeMap::new(),
        }
    }

    /// The subject that set the constraint.
    #[must_use]
    pub fn authority(&self) -> &SubjectId {
        &self.authority
    }

    /// Permitted subjects, sorted.
    pub fn permitted(&self) -> impl Iterator<Item = &SubjectId> {
        self.grants.keys()
    }

    /// Returns `true` if `subject` is permitted.
    #[must_use]
    pub fn is_permitted(&self, subject: &SubjectId) -> bool {
        self.grants.contains_key(subject)
    }

    /// The authority that granted `subject`.
    #[must_use]
    pub fn grantor_of(&self, subject: &SubjectId) -> Option<&SubjectId> {
        self.grants.get(subject)
    }
}

/// One granted subject in a [`DelegateRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// Permitted subject.
    pub subject: SubjectId,
    /// Authority that granted it.
    pub grantor: SubjectId,
}

/// One `(constraint, resource)` entry in a [`DelegateSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateRecord {
    /// Constraint category.
    pub constraint: ConstraintId,
    /// Guarded resource.
    pub resource: ResourceId,
    /// Subject that set the constraint.
    pub authority: SubjectId,
    /// Permitted subjects.
    #[serde(default)]
    pub grants: Vec<GrantRecord>,
}

/// Serializable copy of a [`Delegate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateSnapshot {
    /// Entries, sorted by constraint then resource.
    pub records: Vec<DelegateRecord>,
}

/// Thread-safe, in-memory permission delegate.
///
/// # Example
///
/// ```
/// use warden_auth::Delegation;
/// use warden_runtime::auth::Delegate;
/// use warden_types::{ConstraintId, ResourceId, SubjectId};
///
/// let delegate = Delegate::new();
/// let admin = SubjectId::from("system");
/// let alice = SubjectId::random();
/// let write = ConstraintId::from("write");
/// let doc = ResourceId::from("doc1");
///
/// // default-open
/// assert!(delegate.has_permission(&admin, &alice, &write, &doc));
///
/// // default-deny once constrained
/// delegate.set_constraint(&admin, &[write.clone()], &[doc.clone()]);
/// assert!(!delegate.has_permission(&admin, &alice, &write, &doc));
///
/// delegate.grant_permission(&admin, &alice, &write, &doc);
/// assert!(delegate.has_permission(&admin, &alice, &write, &doc));
/// ```
#[derive(Debug, Default)]
pub struct Delegate {
    entries: RwLock<HashMap<ConstraintId, HashMap<ResourceId, DelegateEntry>>>,
    locator: Option<PathBuf>,
}

impl Delegate {
    /// Creates an empty, unpersisted delegate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the file this delegate is persisted to.
    #[must_use]
    pub fn locator(&self) -> Option<&Path> {
        self.locator.as_deref()
    }

    /// Returns a copy of the entry for a pair.
    #[must_use]
    pub fn entry(&self, constraint: &ConstraintId, resource: &ResourceId) -> Option<DelegateEntry> {
        self.entries
            .read()
            .get(constraint)
            .and_then(|by_resource| by_resource.get(resource))
            .cloned()
    }

    /// Returns the authority that granted `subject` on a pair.
    #[must_use]
    pub fn grantor_of(
        &self,
        subject: &SubjectId,
        constraint: &ConstraintId,
        resource: &ResourceId,
    ) -> Option<SubjectId> {
        self.entry(constraint, resource)
            .and_then(|e| e.grantor_of(subject).cloned())
    }

    /// Captures every entry.
    #[must_use]
    pub fn snapshot(&self) -> DelegateSnapshot {
        let entries = self.entries.read();
        let mut records: Vec<_> = entries
            .iter()
            .flat_map(|(constraint, by_resource)| {
                by_resource.iter().map(move |(resource, entry)| DelegateRecord {
                    constraint: constraint.clone(),
                    resource: resource.clone(),
                    authority: entry.authority.clone(),
                    grants: entry
                        .grants
                        .iter()
                        .map(|(subject, grantor)| GrantRecord {
                            subject: subject.clone(),
                            grantor: grantor.clone(),
                        })
                        .collect(),
                })
            })
            .collect();
        records.sort_by(|a, b| (&a.constraint, &a.resource).cmp(&(&b.constraint, &b.resource)));
        DelegateSnapshot { records }
    }

    /// Replaces all entries with those in `snapshot`.
    pub fn restore(&self, snapshot: &DelegateSnapshot) {
        let mut entries = self.entries.write();
        entries.clear();
        for record in &snapshot.records {
            let mut entry = DelegateEntry::new(record.authority.clone());
            for grant in &record.grants {
                entry
                    .grants
                    .insert(grant.subject.clone(), grant.grantor.clone());
            }
            entries
                .entry(record.constraint.clone())
                .or_default()
                .insert(record.resource.clone(), entry);
        }
    }

    fn read_snapshot(path: &Path) -> Result<Option<DelegateSnapshot>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn write_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        write_atomic(path, &json)?;
        Ok(())
    }
}

impl Delegation for Delegate {
    fn set_constraint(
        &self,
        authority: &SubjectId,
        constraints: &[ConstraintId],
        resources: &[ResourceId],
    ) {
        let mut entries = self.entries.write();
        for constraint in constraints {
            let by_resource = entries.entry(constraint.clone()).or_default();
            for resource in resources {
                by_resource.entry(resource.clone()).or_insert_with(|| {
                    tracing::debug!(
                        authority = %authority,
                        constraint = %constraint,
                        resource = %resource,
                        "constraint set"
                    );
                    DelegateEntry::new(authority.clone())
                });
            }
        }
    }

    fn grant_permission(
        &self,
        authority: &SubjectId,
        subject: &SubjectId,
        constraint: &ConstraintId,
        resource: &ResourceId,
    ) -> bool {
        let mut entries = self.entries.write();
        let Some(entry) = entries
            .get_mut(constraint)
            .and_then(|by_resource| by_resource.get_mut(resource))
        else {
            tracing::debug!(
                constraint = %constraint,
                resource = %resource,
                "grant ignored, no constraint set"
            );
            return false;
        };
        entry
            .grants
            .entry(subject.clone())
            .or_insert_with(|| authority.clone());
        true
    }

    fn has_permission(
        &self,
        _authority: &SubjectId,
        subject: &SubjectId,
        constraint: &ConstraintId,
        resource: &ResourceId,
    ) -> bool {
        self.entries
            .read()
            .get(constraint)
            .and_then(|by_resource| by_resource.get(resource))
            .map_or(true, |entry| entry.is_permitted(subject))
    }

    fn revoke_permission(
        &self,
        subject: &SubjectId,
        constraint: &ConstraintId,
        resource: &ResourceId,
    ) -> bool {
        self.entries
            .write()
            .get_mut(constraint)
            .and_then(|by_resource| by_resource.get_mut(resource))
            .is_some_and(|entry| entry.grants.remove(subject).is_some())
    }

    fn remove_constraint(&self, constraint: &ConstraintId, resource: &ResourceId) -> bool {
        let mut entries = self.entries.write();
        let Some(by_resource) = entries.get_mut(constraint) else {
            return false;
        };
        let removed = by_resource.remove(resource).is_some();
        if by_resource.is_empty() {
            entries.remove(constraint);
        }
        removed
    }

    fn constraint_count(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }
}

impl CacheObject for Delegate {
    fn sleep(&self, _subject: &Agent) -> Result<(), SleepError> {
        let Some(path) = &self.locator else {
            return Ok(());
        };
        self.write_snapshot(path)
            .map_err(|e| SleepError::new(Self::CLASS, e.to_string()))?;
        tracing::debug!(
            path = %path.display(),
            entries = self.constraint_count(),
            "delegate saved"
        );
        Ok(())
    }
}

impl CacheClass for Delegate {
    const CLASS: &'static str = "Delegate";

    fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
        if ctx.locator().is_empty() {
            return Ok(Self::new());
        }
        let path = expand_tilde(Path::new(ctx.locator()));
        let delegate = Self {
            entries: RwLock::default(),
            locator: Some(path),
        };
        if let Some(path) = delegate.locator() {
            let snapshot = Self::read_snapshot(path).map_err(|e| ctx.failed(e.to_string()))?;
            if let Some(snapshot) = snapshot {
                delegate.restore(&snapshot);
            }
        }
        Ok(delegate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::App;
    use std::sync::Arc;
    use tempfile::TempDir;
    use warden_auth::DenyCode;

    fn ids() -> (SubjectId, SubjectId, ConstraintId, ResourceId) {
        (
            SubjectId::from("system"),
            SubjectId::random(),
            ConstraintId::from("write"),
            ResourceId::from("doc1"),
        )
    }

    // ── Delegation semantics ─────────────────────────────────

    #[test]
    fn unconstrained_is_open() {
        let delegate = Delegate::new();
        let (admin, x, write, doc) = ids();
        assert!(delegate.has_permission(&admin, &x, &write, &doc));
        assert!(!delegate.grant_permission(&admin, &x, &write, &doc));
        assert_eq!(delegate.constraint_count(), 0);
    }

    #[test]
    fn constrained_is_closed_until_granted() {
        let delegate = Delegate::new();
        let (admin, x, write, doc) = ids();
        delegate.set_constraint(&admin, &[write.clone()], &[doc.clone()]);
        assert!(!delegate.has_permission(&admin, &x, &write, &doc));

        assert!(delegate.grant_permission(&admin, &x, &write, &doc));
        let once = delegate.snapshot();
        assert!(delegate.grant_permission(&admin, &x, &write, &doc));
        assert_eq!(delegate.snapshot(), once);
        assert!(delegate.has_permission(&admin, &x, &write, &doc));
        assert_eq!(delegate.grantor_of(&x, &write, &doc), Some(admin));
    }

    #[test]
    fn set_constraint_is_idempotent() {
        let delegate = Delegate::new();
        let (admin, x, write, doc) = ids();
        let read = ConstraintId::from("read");
        let doc2 = ResourceId::from("doc2");
        delegate.set_constraint(&admin, &[write.clone(), read], &[doc.clone(), doc2]);
        assert_eq!(delegate.constraint_count(), 4);

        delegate.grant_permission(&admin, &x, &write, &doc);
        let other = SubjectId::random();
        delegate.set_constraint(&other, &[write.clone()], &[doc.clone()]);
        assert_eq!(delegate.constraint_count(), 4);
        let entry = delegate.entry(&write, &doc).expect("entry");
        assert_eq!(entry.authority(), &admin);
        assert!(entry.is_permitted(&x));
    }

    #[test]
    fn matching_is_exact() {
        let delegate = Delegate::new();
        let (admin, x, write, doc) = ids();
        delegate.set_constraint(&admin, &[write.clone()], &[doc.clone()]);
        assert!(delegate.has_permission(&admin, &x, &ConstraintId::from("read"), &doc));
        assert!(delegate.has_permission(&admin, &x, &write, &ResourceId::from("doc10")));
    }

    #[test]
    fn revoke_and_remove() {
        let delegate = Delegate::new();
        let (admin, x, write, doc) = ids();
        delegate.set_constraint(&admin, &[write.clone()], &[doc.clone()]);
        delegate.grant_permission(&admin, &x, &write, &doc);

        assert!(delegate.revoke_permission(&x, &write, &doc));
        assert!(!delegate.revoke_permission(&x, &write, &doc));
        assert!(!delegate.has_permission(&admin, &x, &write, &doc));

        assert!(delegate.remove_constraint(&write, &doc));
        assert!(!delegate.remove_constraint(&write, &doc));
        assert!(delegate.has_permission(&admin, &x, &write, &doc));
    }

    #[test]
    fn authority_is_not_validated() {
        let delegate = Delegate::new();
        let (_, x, write, doc) = ids();
        let nobody = SubjectId::random();
        delegate.set_constraint(&nobody, &[write.clone()], &[doc.clone()]);
        assert!(delegate.grant_permission(&nobody, &x, &write, &doc));
        assert!(delegate.has_permission(&SubjectId::random(), &x, &write, &doc));
    }

    #[test]
    fn check_reports_deny_code() {
        let delegate = Delegate::new();
        let (admin, _, write, doc) = ids();
        delegate.set_constraint(&admin, &[write.clone()], &[doc.clone()]);

        let guest = Agent::guest();
        let user = Agent::user("bob");
        assert_eq!(
            delegate.check(&admin, &guest, &write, &doc).deny_code(),
            Some(DenyCode::Unauthenticated)
        );
        assert_eq!(
            delegate.check(&admin, &user, &write, &doc).deny_code(),
            Some(DenyCode::Forbidden)
        );
    }

    // ── Lifecycle ────────────────────────────────────────────

    #[test]
    fn snapshot_restore() {
        let source = Delegate::new();
        let (admin, x, write, doc) = ids();
        source.set_constraint(&admin, &[write.clone()], &[doc.clone()]);
        source.grant_permission(&admin, &x, &write, &doc);

        let json = serde_json::to_string(&source.snapshot()).expect("serialize");
        let snapshot: DelegateSnapshot = serde_json::from_str(&json).expect("deserialize");

        let target = Delegate::new();
        target.restore(&snapshot);
        assert!(target.has_permission(&admin, &x, &write, &doc));
        assert!(!target.has_permission(&admin, &SubjectId::random(), &write, &doc));
    }

    #[test]
    fn sleep_and_wakeup_persist_to_locator() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("state").join("delegate.json");
        let app = App::builder()
            .with_class::<Delegate>(path.to_string_lossy())
            .build()
            .expect("app");
        let system = Arc::new(Agent::system());
        let (admin, x, write, doc) = ids();

        let delegate = app.delegate(&system).expect("wake");
        assert_eq!(delegate.locator(), Some(path.as_path()));
        delegate.set_constraint(&admin, &[write.clone()], &[doc.clone()]);
        delegate.grant_permission(&admin, &x, &write, &doc);

        assert!(app.registry().sleep(Delegate::CLASS, &system));
        assert!(path.exists());

        let revived = app.delegate(&system).expect("wake again");
        assert!(!Arc::ptr_eq(&delegate, &revived));
        assert!(revived.has_permission(&admin, &x, &write, &doc));
        assert!(!revived.has_permission(&admin, &SubjectId::random(), &write, &doc));
    }

    #[test]
    fn wakeup_rejects_corrupt_state() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("delegate.json");
        std::fs::write(&path, "{").expect("write");
        let app = App::builder()
            .with_class::<Delegate>(path.to_string_lossy())
            .build()
            .expect("app");
        let err = app
            .delegate(&Arc::new(Agent::system()))
            .expect_err("corrupt");
        assert!(matches!(err, crate::registry::RegistryError::Construction { .. }));
    }
}
