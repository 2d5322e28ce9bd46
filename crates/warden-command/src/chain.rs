//! Command chain: ordered chain-of-responsibility dispatch.
//!
//! Targets are kept in an ordered `Vec`. The head is fixed at
//! construction; each link appends a subordinate to the current tail.
//!
//! ```text
//! CommandChain::new(head)
//!     set_command_link(head, a)      head ── a
//!     set_command_link(a, b)         head ── a ── b
//! ```
//!
//! # Link Rules
//!
//! | Attempt | Error |
//! |---------|-------|
//! | link a target to itself | `SelfLink` |
//! | make the head a subordinate | `HeadAsSubordinate` |
//! | link a target already in the chain | `AlreadyLinked` |
//! | link under a target not in the chain | `NotInChain` |
//! | link under a target that has a subordinate | `SubordinateTaken` |
//!
//! Thread-safe when wrapped in a `RwLock` by the owner:
//! `dispatch()` takes `&self`, `set_command_link()` takes `&mut self`.

use crate::{Command, CommandError, CommandResult, CommandTarget, Direction};
use std::sync::Arc;
use warden_types::TargetId;

/// An ordered chain of command targets.
pub struct CommandChain {
    targets: Vec<Arc<dyn CommandTarget>>,
}

impl CommandChain {
    /// Creates a chain whose superior end is `head`.
    #[must_use]
    pub fn new(head: Arc<dyn CommandTarget>) -> Self {
        Self {
            targets: vec![head],
        }
    }

    /// Returns the superior end.
    #[must_use]
    pub fn head(&self) -> &Arc<dyn CommandTarget> {
        &self.targets[0]
    }

    /// Returns the subordinate end.
    #[must_use]
    pub fn tail(&self) -> &Arc<dyn CommandTarget> {
        &self.targets[self.targets.len() - 1]
    }

    /// Returns the number of linked targets, head included.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Returns target ids from head to tail.
    pub fn target_ids(&self) -> impl Iterator<Item = &TargetId> {
        self.targets.iter().map(|t| t.id())
    }

    /// Returns `true` if `id` is linked.
    #[must_use]
    pub fn contains(&self, id: &TargetId) -> bool {
        self.position(id).is_some()
    }

    /// Returns the superior of `id`.
    #[must_use]
    pub fn superior_of(&self, id: &TargetId) -> Option<&TargetId> {
        let pos = self.position(id)?;
        pos.checked_sub(1).map(|p| self.targets[p].id())
    }

    /// Returns the subordinate of `id`.
    #[must_use]
    pub fn subordinate_of(&self, id: &TargetId) -> Option<&TargetId> {
        let pos = self.position(id)?;
        self.targets.get(pos + 1).map(|t| t.id())
    }

    fn position(&self, id: &TargetId) -> Option<usize> {
        self.targets.iter().position(|t| t.id() == id)
    }

    /// Links `other` as the subordinate of `target`.
    ///
    /// # Errors
    ///
    /// See the link rules in the module documentation. A failed link leaves
    /// the chain unchanged.
    pub fn set_command_link(
        &mut self,
        target: &TargetId,
        other: Arc<dyn CommandTarget>,
    ) -> Result<(), CommandError> {
        let other_id = other.id();
        if other_id == target {
            return Err(CommandError::SelfLink {
                target: target.clone(),
            });
        }
        if other_id == self.head().id() {
            return Err(CommandError::HeadAsSubordinate {
                target: other_id.clone(),
            });
        }
        if self.contains(other_id) {
            return Err(CommandError::AlreadyLinked {
                target: other_id.clone(),
            });
        }
        let Some(pos) = self.position(target) else {
            return Err(CommandError::NotInChain {
                target: target.clone(),
            });
        };
        if let Some(existing) = self.targets.get(pos + 1) {
            return Err(CommandError::SubordinateTaken {
                target: target.clone(),
                existing: existing.id().clone(),
            });
        }

        tracing::debug!(superior = %target, subordinate = %other_id, "command link set");
        self.targets.push(other);
        Ok(())
    }

    /// Dispatches `command` to the first target that handles it.
    ///
    /// Forward commands start at the head, reverse commands at the tail.
    /// The chain is traversed at most once; if no target handles the
    /// command the result is a failure naming it.
    pub fn dispatch(&self, command: &Command) -> CommandResult {
        let found = match command.direction() {
            Direction::Forward => self.targets.iter().find(|t| t.handles(command.id())),
            Direction::Reverse => self.targets.iter().rev().find(|t| t.handles(command.id())),
        };

        match found {
            Some(target) => {
                tracing::debug!(
                    command = command.name(),
                    handler = %target.id(),
                    invoker = %command.invoker().id(),
                    "dispatching command"
                );
                target.handle(command)
            }
            None => {
                tracing::warn!(command = command.name(), "no target handles command");
                CommandResult::failure(format!("unhandled command: {}", command.name()))
            }
        }
    }
}

impl std::fmt::Debug for CommandChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.target_ids()).finish()
    }
}
