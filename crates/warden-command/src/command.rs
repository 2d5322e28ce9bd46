//! Commands and the static factories that build them.
//!
//! A [`Command`] is an immutable message: a static identity, positional
//! arguments, the subject that invoked it and the direction it travels
//! along a [`CommandChain`].
//!
//! Commands are never constructed directly. Each command kind implements
//! [`CommandSpec`], whose `invoke` validates the arguments against the
//! declared signature, builds the command and dispatches it.

use crate::{Arg, ArgKind, CommandChain, CommandError, CommandResult};
use warden_auth::Subject;
use warden_types::{CommandId, Identity};

/// Which end of a chain a command starts from.
///
/// ```text
///  head (superior) ── T1 ── T2 ── tail (subordinate)
///  Forward  ───────────────────────────────▶
///  ◀─────────────────────────────── Reverse
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the head toward the subordinate end.
    Forward,
    /// From the tail toward the superior end.
    Reverse,
}

/// An immutable, validated command.
#[derive(Debug, Clone)]
pub struct Command {
    identity: Identity<CommandId>,
    args: Vec<Arg>,
    invoker: Subject,
    direction: Direction,
}

impl Command {
    /// Returns the static command identifier.
    #[must_use]
    pub fn id(&self) -> &CommandId {
        self.identity.id()
    }

    /// Returns the command name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Returns all positional arguments.
    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Returns one positional argument.
    #[must_use]
    pub fn arg(&self, position: usize) -> Option<&Arg> {
        self.args.get(position)
    }

    /// Returns the invoking subject.
    #[must_use]
    pub fn invoker(&self) -> &Subject {
        &self.invoker
    }

    /// Returns the travel direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Static description and factory of a command kind.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use warden_auth::{Agent, Subject};
/// use warden_command::{ArgKind, CommandSpec, Direction};
///
/// struct Ping;
///
/// impl CommandSpec for Ping {
///     const NAME: &'static str = "demo.ping";
///     const DIRECTION: Direction = Direction::Forward;
///     const SIGNATURE: &'static [ArgKind] = &[ArgKind::String];
/// }
///
/// let invoker = Subject::from(Arc::new(Agent::system()));
/// let cmd = Ping::build(invoker.clone(), vec!["hello".into()]).expect("valid args");
/// assert_eq!(cmd.name(), "demo.ping");
///
/// assert!(Ping::build(invoker, vec![42.into()]).is_err());
/// ```
pub trait CommandSpec {
    /// Static command name; the command id is derived from it.
    const NAME: &'static str;

    /// Direction of travel.
    const DIRECTION: Direction;

    /// Declared kind of each positional argument.
    const SIGNATURE: &'static [ArgKind];

    /// Static command identifier.
    fn id() -> CommandId {
        CommandId::derived(Self::NAME)
    }

    /// Extra value checks beyond the declared kinds.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidArgument`] for a bad value.
    fn validate(_args: &[Arg]) -> Result<(), CommandError> {
        Ok(())
    }

    /// Validates `args` and builds the command.
    ///
    /// # Errors
    ///
    /// - [`CommandError::Arity`] if the argument count is wrong
    /// - [`CommandError::ArgumentType`] for the first mistyped argument
    /// - whatever [`validate`](Self::validate) reports
    fn build(invoker: Subject, args: Vec<Arg>) -> Result<Command, CommandError> {
        if args.len() != Self::SIGNATURE.len() {
            return Err(CommandError::Arity {
                command: Self::NAME.to_string(),
                expected: Self::SIGNATURE.len(),
                found: args.len(),
            });
        }
        for (position, (expected, arg)) in Self::SIGNATURE.iter().zip(&args).enumerate() {
            if !expected.accepts(arg) {
                return Err(CommandError::ArgumentType {
                    command: Self::NAME.to_string(),
                    position,
                    expected: *expected,
                    found: arg.describe().to_string(),
                });
            }
        }
        Self::validate(&args)?;

        Ok(Command {
            identity: Identity::fixed(Self::NAME),
            args,
            invoker,
            direction: Self::DIRECTION,
        })
    }

    /// Builds the command and dispatches it through `chain`.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`build`](Self::build). A command
    /// that is dispatched but fails or goes unhandled yields
    /// `Ok(CommandResult::Failure { .. })`.
    fn invoke(
        chain: &CommandChain,
        invoker: Subject,
        args: Vec<Arg>,
    ) -> Result<CommandResult, CommandError> {
        let command = Self::build(invoker, args)?;
        Ok(chain.dispatch(&command))
    }
}
