//! Command target trait and testing utilities.

use crate::{Command, CommandResult};
use warden_types::{CommandId, TargetId};

/// A link in a [`CommandChain`](crate::CommandChain).
///
/// Each target declares which command ids it handles. The chain hands a
/// command to the first target, in travel order, that handles it.
///
/// # Thread Safety
///
/// Targets must be `Send + Sync`; one chain is shared by every transaction.
pub trait CommandTarget: Send + Sync {
    /// Unique identifier within a chain.
    fn id(&self) -> &TargetId;

    /// Returns `true` if this target handles `command`.
    fn handles(&self, command: &CommandId) -> bool;

    /// Handles a command this target declared it handles.
    fn handle(&self, command: &Command) -> CommandResult;
}

/// Test utilities for command targets.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A mock target for testing.
    ///
    /// Handles a fixed set of command ids with a fixed result function.
    /// Tracks invocation count via `call_count`.
    pub struct MockTarget {
        /// Target ID.
        pub id: TargetId,
        /// Commands this target claims.
        pub handled: Vec<CommandId>,
        /// Produces the result of every handle() call.
        pub result_fn: Box<dyn Fn(&Command) -> CommandResult + Send + Sync>,
        /// Number of times handle() has been called.
        pub call_count: Arc<AtomicUsize>,
    }

    impl MockTarget {
        /// Creates a target that handles nothing.
        pub fn passive(id: &str) -> Self {
            Self {
                id: TargetId::from(id),
                handled: Vec::new(),
                result_fn: Box::new(|_| CommandResult::failure("passive target")),
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Creates a target that answers `command` with `value`.
        pub fn responder(id: &str, command: CommandId, value: serde_json::Value) -> Self {
            Self {
                id: TargetId::from(id),
                handled: vec![command],
                result_fn: Box::new(move |_| CommandResult::Success(value.clone())),
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Creates a target that fails `command` with `message`.
        pub fn failer(id: &str, command: CommandId, message: &str) -> Self {
            let message = message.to_string();
            Self {
                id: TargetId::from(id),
                handled: vec![command],
                result_fn: Box::new(move |_| CommandResult::failure(message.clone())),
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Creates a target that answers `command` with its own id, so
        /// tests can see which target won.
        pub fn echo_id(id: &str, command: CommandId) -> Self {
            let name = id.to_string();
            Self {
                id: TargetId::from(id),
                handled: vec![command],
                result_fn: Box::new(move |_| CommandResult::success(name.clone())),
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Returns the number of times this target has handled a command.
        pub fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    impl CommandTarget for MockTarget {
        fn id(&self) -> &TargetId {
            &self.id
        }

        fn handles(&self, command: &CommandId) -> bool {
            self.handled.contains(command)
        }

        fn handle(&self, command: &Command) -> CommandResult {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            (self.result_fn)(command)
        }
    }
}
