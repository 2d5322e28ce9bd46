//! End-to-end dispatch through a multi-target chain.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warden_auth::{Agent, Subject};
use warden_command::{
    Command, CommandChain, CommandError, CommandResult, CommandSpec, CommandTarget, Log, Query,
    Version,
};
use warden_types::{CommandId, ErrorCode, TargetId};

/// Handles every command in `handled`, recording how often it ran.
struct Recorder {
    id: TargetId,
    handled: Vec<CommandId>,
    calls: AtomicUsize,
}

impl Recorder {
    fn new(id: &str, handled: Vec<CommandId>) -> Arc<Self> {
        Arc::new(Self {
            id: TargetId::from(id),
            handled,
            calls: AtomicUsize::new(0),
        })
    }
}

impl CommandTarget for Recorder {
    fn id(&self) -> &TargetId {
        &self.id
    }

    fn handles(&self, command: &CommandId) -> bool {
        self.handled.contains(command)
    }

    fn handle(&self, command: &Command) -> CommandResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *command.id() == Version::id() {
            return CommandResult::success(env!("CARGO_PKG_VERSION"));
        }
        if *command.id() == Query::id() {
            let Ok((sql, params)) = Query::parts(command) else {
                return CommandResult::failure("malformed query");
            };
            return CommandResult::success(json!({ "sql": sql, "params": params }));
        }
        CommandResult::success(Value::Null)
    }
}

fn invoker() -> Subject {
    Subject::from(Arc::new(Agent::user("alice")))
}

#[test]
fn version_through_linked_chain() {
    let system = Recorder::new("system", vec![Version::id(), Log::id()]);
    let database = Recorder::new("database", vec![Query::id()]);

    let mut chain = CommandChain::new(system.clone());
    chain
        .set_command_link(&TargetId::from("system"), database.clone())
        .expect("link database");

    let result = Version::invoke(&chain, invoker(), vec![]).expect("valid");
    assert_eq!(result, CommandResult::success(env!("CARGO_PKG_VERSION")));
    assert_eq!(system.calls.load(Ordering::SeqCst), 1);
    assert_eq!(database.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn query_reaches_subordinate() {
    let system = Recorder::new("system", vec![Version::id(), Log::id()]);
    let database = Recorder::new("database", vec![Query::id()]);

    let mut chain = CommandChain::new(system);
    chain
        .set_command_link(&TargetId::from("system"), database.clone())
        .expect("link database");

    let value = Query::invoke(
        &chain,
        invoker(),
        vec!["SELECT name FROM users WHERE id = ?".into(), json!([1]).into()],
    )
    .expect("valid")
    .into_result()
    .expect("handled");
    assert_eq!(value["params"], json!([1]));
    assert_eq!(database.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn validation_errors_never_dispatch() {
    let system = Recorder::new("system", vec![Version::id(), Log::id()]);
    let chain = CommandChain::new(system.clone());

    let err = Log::invoke(&chain, invoker(), vec![json!(1).into(), "x".into()])
        .expect_err("level must be a string");
    assert_eq!(err.code(), "COMMAND_ARGUMENT_TYPE");
    assert_eq!(system.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unhandled_failure_converts_to_error() {
    let chain = CommandChain::new(Recorder::new("system", vec![Version::id()]));
    let err = Query::invoke(&chain, invoker(), vec!["SELECT 1".into(), json!([]).into()])
        .expect("valid")
        .into_result()
        .expect_err("no database target");
    assert_eq!(
        err,
        CommandError::Failed {
            message: "unhandled command: warden.command.query".into()
        }
    );
}

#[test]
fn chain_rejects_relinking_head() {
    let system = Recorder::new("system", vec![]);
    let mut chain = CommandChain::new(system.clone());
    chain
        .set_command_link(&TargetId::from("system"), Recorder::new("db", vec![]))
        .expect("link db");
    let err = chain
        .set_command_link(&TargetId::from("db"), system)
        .expect_err("head cannot be a subordinate");
    assert_eq!(err.code(), "COMMAND_HEAD_AS_SUBORDINATE");
}
