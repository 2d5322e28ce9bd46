//! End-to-end request resolution through the application context.

use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use warden_auth::{Agent, Constraint, Delegation};
use warden_command::testing::MockTarget;
use warden_command::{Log, Version};
use warden_runtime::auth::Delegate;
use warden_runtime::config::{BootMode, WardenConfig};
use warden_runtime::registry::{CacheClass, RegistryError};
use warden_runtime::resource::{Document, Request, ResourceRegistration};
use warden_runtime::transaction::{TransactionError, TransactionState};
use warden_runtime::App;
use warden_types::{ResourceId, SubjectId};

fn members() -> ResourceRegistration {
    ResourceRegistration::new("members")
        .with_resource_class("MembersOnly")
        .with_authority_class("authentication")
}

fn reports() -> ResourceRegistration {
    ResourceRegistration::new("reports")
        .with_resource_class(Document::class_for("reports"))
        .with_authority_class("authentication")
}

fn app() -> App {
    App::builder()
        .with_version("4.2.0")
        .with_document("reports")
        .with_registration(members())
        .with_registration(reports())
        .build()
        .expect("app")
}

// ── Built-in fallbacks ──────────────────────────────────────────────

#[test]
fn root_acknowledges_with_version() {
    let app = app();
    let guest = app.guest_agent().expect("guest");
    let resource = app.handle(&Request::get("/"), &guest);
    assert_eq!(resource.status(), 200);
    assert_eq!(
        resource.to_json()["body"],
        json!({ "message": "Warden is running", "version": "4.2.0" })
    );
}

#[test]
fn unregistered_resource_is_404_and_completed() {
    let app = app();
    let guest = app.guest_agent().expect("guest");
    let mut txn = app
        .create_transaction(&Request::get("/nowhere"), &guest)
        .expect("default transaction");
    let resource = txn.run(&app).expect("not found is a resource");
    assert_eq!(resource.status(), 404);
    assert_eq!(resource.name(), "Resource not found");
    assert_eq!(txn.state(), &TransactionState::Completed);
}

// ── Authority enlistment ────────────────────────────────────────────

#[test]
fn guest_is_challenged_exactly_once() {
    let app = app();
    let guest = app.guest_agent().expect("guest");
    let mut txn = app
        .create_transaction(&Request::get("/members"), &guest)
        .expect("transaction");
    let resource = txn.run(&app).expect("challenge");

    assert_eq!(resource.status(), 401);
    assert_eq!(txn.state(), &TransactionState::Completed);
    let child = txn.child().expect("authority enlisted");
    assert!(child.name().starts_with("authentication"));
    assert_eq!(child.state(), &TransactionState::Completed);
    assert!(child.child().is_none());
}

#[test]
fn authenticated_member_is_served() {
    let app = app();
    let alice = app.user_agent("alice").expect("user");
    let resource = app.handle(&Request::get("/members"), &alice);
    assert_eq!(resource.status(), 200);
    assert_eq!(resource.name(), "MembersOnly");
}

#[test]
fn document_access_follows_delegation() {
    let app = app();
    let system = app.system_agent().expect("system");
    let guest = app.guest_agent().expect("guest");
    let alice = app.user_agent("alice").expect("user");
    let request = Request::get("/reports");

    // open until constrained
    assert_eq!(app.handle(&request, &alice).status(), 200);

    let delegate = app.delegate(&system).expect("delegate");
    let open = Constraint::open().id().clone();
    let reports = ResourceId::from("reports");
    delegate.set_constraint(system.id(), &[open.clone()], &[reports.clone()]);

    // cached document rechecks every agent
    assert_eq!(app.handle(&request, &guest).status(), 401);
    assert_eq!(app.handle(&request, &alice).status(), 403);

    assert!(delegate.grant_permission(system.id(), alice.id(), &open, &reports));
    assert_eq!(app.handle(&request, &alice).status(), 200);

    assert!(delegate.revoke_permission(alice.id(), &open, &reports));
    assert_eq!(app.handle(&request, &alice).status(), 403);
}

#[test]
fn reloaded_delegate_governs_cached_document() {
    let app = app();
    let system = app.system_agent().expect("system");
    let alice = app.user_agent("alice").expect("user");
    let request = Request::get("/reports");
    let open = Constraint::open().id().clone();
    let reports = ResourceId::from("reports");

    let delegate = app.delegate(&system).expect("delegate");
    delegate.set_constraint(system.id(), &[open.clone()], &[reports.clone()]);
    assert!(delegate.grant_permission(system.id(), alice.id(), &open, &reports));
    assert_eq!(app.handle(&request, &alice).status(), 200);

    assert!(app.registry().sleep(Delegate::CLASS, &system));
    let live = app.delegate(&system).expect("reloaded");
    live.set_constraint(system.id(), &[open.clone()], &[reports.clone()]);
    assert_eq!(app.handle(&request, &alice).status(), 403);

    assert!(live.grant_permission(system.id(), alice.id(), &open, &reports));
    assert_eq!(app.handle(&request, &alice).status(), 200);
}

#[test]
fn authority_is_recorded_but_not_validated() {
    let app = app();
    let delegate = app.delegate(&Arc::new(Agent::guest())).expect("anyone may load");
    let stranger = SubjectId::random();
    let subject = SubjectId::random();
    let write = Constraint::write().id().clone();
    let doc = ResourceId::from("doc1");

    delegate.set_constraint(&stranger, &[write.clone()], &[doc.clone()]);
    assert!(!delegate.has_permission(&stranger, &subject, &write, &doc));
    assert!(delegate.grant_permission(&stranger, &subject, &write, &doc));
    assert!(delegate.grant_permission(&stranger, &subject, &write, &doc));

    // any authority reads the same answer
    assert!(delegate.has_permission(&SubjectId::random(), &subject, &write, &doc));
    assert_eq!(
        delegate.entry(&write, &doc).expect("entry").authority(),
        &stranger
    );
}

// ── Failure paths ───────────────────────────────────────────────────

#[test]
fn missing_class_aborts_and_handle_reports_500() {
    let app = App::builder()
        .with_registration(ResourceRegistration::new("ledger").with_resource_class("Ledger"))
        .build()
        .expect("app");
    let guest = app.guest_agent().expect("guest");
    let request = Request::get("/ledger");

    let mut txn = app.create_transaction(&request, &guest).expect("transaction");
    let err = txn.run(&app).expect_err("unregistered class");
    assert!(matches!(
        err,
        TransactionError::Registry(RegistryError::NotRegistered(ref name)) if name == "Ledger"
    ));
    assert!(matches!(txn.state(), TransactionState::Aborted { .. }));

    assert_eq!(app.handle(&request, &guest).status(), 500);
}

// ── Commands ────────────────────────────────────────────────────────

#[test]
fn version_through_linked_chain() {
    let app = App::builder()
        .with_target(Arc::new(MockTarget::passive("audit")))
        .build()
        .expect("app");
    app.link_target(Arc::new(MockTarget::passive("metrics")))
        .expect("link");
    let system = app.system_agent().expect("system");

    assert_eq!(app.chain().target_count(), 3);
    assert_eq!(
        app.invoke::<Version>(&system, vec![]).expect("version"),
        json!(env!("CARGO_PKG_VERSION"))
    );
    assert!(app
        .invoke::<Log>(&system, vec!["STATUS".into(), "hello".into()])
        .is_ok());
}

// ── Registry ────────────────────────────────────────────────────────

#[test]
fn concurrent_loads_share_one_instance() {
    let app = app();
    let instances: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| app.system_agent().expect("system")))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect()
    });
    assert!(instances.iter().all(|agent| Arc::ptr_eq(agent, &instances[0])));
}

#[test]
fn sleep_evicts_and_next_load_wakes_fresh() {
    let app = app();
    let system = app.system_agent().expect("system");
    let first = app.delegate(&system).expect("delegate");
    assert!(Arc::ptr_eq(&first, &app.delegate(&system).expect("cached")));

    assert_eq!(app.shutdown(&system).expect("shutdown"), 2);
    assert!(app.registry().loaded_classes().is_empty());

    let second = app.delegate(&system).expect("fresh");
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn install_mode_persists_recipes_for_next_start() {
    let dir = TempDir::new().expect("tempdir");
    let registry_file = dir.path().join("registry.json");

    let mut config = WardenConfig::default();
    config.mode = BootMode::Install;
    config.paths.registry_file = Some(registry_file.clone());
    let installer = App::builder()
        .with_config(config.clone())
        .with_document("archive")
        .build()
        .expect("installer");
    installer
        .shutdown(&Agent::system())
        .expect("save registry");
    assert!(registry_file.exists());

    config.mode = BootMode::Normal;
    let app = App::builder()
        .with_config(config)
        .with_registration(
            ResourceRegistration::new("archive")
                .with_resource_class(Document::class_for("archive")),
        )
        .build()
        .expect("app");
    assert!(app.registry().is_loadable(&Document::class_for("archive")));

    let alice = app.user_agent("alice").expect("user");
    assert_eq!(app.handle(&Request::get("/archive"), &alice).status(), 200);
}
