//! The application context.
//!
//! [`App`] owns everything that would otherwise be process-global: the
//! class registry, the command chain, the transaction catalog and the
//! resource registrations. Hosts build one with [`App::builder`] and share
//! it by reference.
//!
//! # Lifecycle
//!
//! ```text
//! AppBuilder::build()
//!     │  built-in classes → stored recipes → builder classes
//!     │  chain: SystemTarget ── [DatabaseTarget] ── extra targets
//!     ▼
//! App::handle(request, agent)   (any number of times, any thread)
//!     ▼
//! App::shutdown(subject)        sleep every instance, save recipes
//!                               in install/update mode
//! ```

use crate::auth::{Delegate, GuestAgent, SystemAgent};
use crate::config::WardenConfig;
use crate::registry::{
    CacheClass, ClassRegistry, Instance, LocalFileStore, RegistryError, RegistryStore, StoreError,
};
use crate::resource::{
    Acknowledgement, Document, ErrorResource, Install, LoginChallenge, MembersOnly, Request,
    Resource, ResourceRegistration,
};
use crate::target::{DatabaseTarget, QueryExecutor, SystemTarget};
use crate::transaction::{Transaction, TransactionCatalog, TransactionError, TransactionSeed};
use parking_lot::{RwLock, RwLockReadGuard};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use warden_auth::{AccessControlError, Agent, Subject};
use warden_command::{Arg, CommandChain, CommandError, CommandSpec, CommandTarget};
use warden_types::{ErrorCode, ResourceId};

/// Errors raised while building or shutting down an [`App`].
#[derive(Debug, Error)]
pub enum AppError {
    /// A command target could not be linked.
    #[error("command chain: {0}")]
    Chain(#[from] CommandError),

    /// The registry store failed.
    #[error("registry store: {0}")]
    Store(#[from] StoreError),

    /// A registration names a transaction class the catalog lacks.
    #[error("resource '{resource}' names unknown transaction class '{class}'")]
    UnknownTransactionClass {
        /// The registered resource.
        resource: String,
        /// The missing class.
        class: String,
    },
}

impl ErrorCode for AppError {
    fn code(&self) -> &'static str {
        match self {
            Self::Chain(_) => "APP_CHAIN",
            Self::Store(_) => "APP_STORE",
            Self::UnknownTransactionClass { .. } => "APP_UNKNOWN_TRANSACTION_CLASS",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

type ClassRegistration = fn(&ClassRegistry, String);

fn register<T: CacheClass>(registry: &ClassRegistry, locator: String) {
    registry.register_class::<T>(locator);
}

fn register_document(registry: &ClassRegistry, name: String) {
    registry.register_loadable_class(Document::class_for(&name), name, Document::factory_method());
}

/// Builder for [`App`].
#[derive(Default)]
pub struct AppBuilder {
    version: Option<String>,
    config: WardenConfig,
    classes: Vec<(ClassRegistration, String)>,
    targets: Vec<Arc<dyn CommandTarget>>,
    executor: Option<Arc<dyn QueryExecutor>>,
    store: Option<Box<dyn RegistryStore>>,
    catalog: TransactionCatalog,
    registrations: Vec<ResourceRegistration>,
}

impl AppBuilder {
    /// Overrides the reported version (defaults to the crate version).
    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Uses `config`; its `[[resources]]` become registrations.
    #[must_use]
    pub fn with_config(mut self, config: WardenConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers class `T` with `locator`, replacing any built-in or stored
    /// recipe of the same name.
    #[must_use]
    pub fn with_class<T: CacheClass>(mut self, locator: impl Into<String>) -> Self {
        self.classes.push((register::<T>, locator.into()));
        self
    }

    /// Registers a protected document named `name`.
    #[must_use]
    pub fn with_document(mut self, name: impl Into<String>) -> Self {
        self.classes.push((register_document, name.into()));
        self
    }

    /// Appends a command target after the built-in ones.
    #[must_use]
    pub fn with_target(mut self, target: Arc<dyn CommandTarget>) -> Self {
        self.targets.push(target);
        self
    }

    /// Links a [`DatabaseTarget`] running queries through `executor`.
    #[must_use]
    pub fn with_query_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Persists registry recipes in `store`, overriding
    /// `paths.registry_file`.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn RegistryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Adds a registration; later ones replace earlier ones for the same
    /// resource.
    #[must_use]
    pub fn with_registration(mut self, registration: ResourceRegistration) -> Self {
        self.registrations.push(registration);
        self
    }

    /// Adds or replaces a transaction class.
    #[must_use]
    pub fn with_transaction_class(
        mut self,
        name: impl Into<String>,
        factory: crate::transaction::TransactionFactory,
    ) -> Self {
        self.catalog.register(name, factory);
        self
    }

    /// Builds the application.
    ///
    /// # Errors
    ///
    /// - [`AppError::Store`] if the store cannot be opened or read
    /// - [`AppError::Chain`] if an extra target cannot be linked
    /// - [`AppError::UnknownTransactionClass`] for a registration whose
    ///   transaction or authority class is not in the catalog
    pub fn build(self) -> Result<App, AppError> {
        let registry = ClassRegistry::new();
        registry.register_class::<SystemAgent>("");
        registry.register_class::<GuestAgent>("");
        registry.register_class::<Delegate>("");
        registry.register_class::<Acknowledgement>("");
        registry.register_class::<Install>("");
        registry.register_class::<LoginChallenge>("");
        registry.register_class::<MembersOnly>("");
        registry.register_factory::<Document>();

        let store = match (self.store, &self.config.paths.registry_file) {
            (Some(store), _) => Some(store),
            (None, Some(path)) => {
                Some(Box::new(LocalFileStore::new(path)) as Box<dyn RegistryStore>)
            }
            (None, None) => None,
        };
        if let Some(store) = &store {
            if let Some(snapshot) = store.load()? {
                registry.restore(&snapshot);
            }
        }

        for (register, locator) in self.classes {
            register(&registry, locator);
        }

        let version = self
            .version
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
        let mut chain = CommandChain::new(Arc::new(SystemTarget::new(version.clone())));
        let extras = self
            .executor
            .map(|executor| Arc::new(DatabaseTarget::new(executor)) as Arc<dyn CommandTarget>)
            .into_iter()
            .chain(self.targets);
        for target in extras {
            let tail = chain.tail().id().clone();
            chain.set_command_link(&tail, target)?;
        }

        let mut registrations = HashMap::new();
        for registration in self.config.resources.iter().chain(&self.registrations) {
            for class in std::iter::once(&registration.transaction_class)
                .chain(registration.authority_class.as_ref())
            {
                if !self.catalog.contains(class) {
                    return Err(AppError::UnknownTransactionClass {
                        resource: registration.resource.clone(),
                        class: class.clone(),
                    });
                }
            }
            registrations.insert(registration.resource_id(), registration.clone());
        }

        tracing::debug!(
            version = %version,
            mode = %self.config.mode,
            classes = registry.len(),
            registrations = registrations.len(),
            "app built"
        );

        Ok(App {
            version,
            config: self.config,
            registry,
            chain: RwLock::new(chain),
            catalog: self.catalog,
            registrations,
            store,
        })
    }
}

/// The application context.
pub struct App {
    version: String,
    config: WardenConfig,
    registry: ClassRegistry,
    chain: RwLock<CommandChain>,
    catalog: TransactionCatalog,
    registrations: HashMap<ResourceId, ResourceRegistration>,
    store: Option<Box<dyn RegistryStore>>,
}

impl App {
    /// Starts building an application.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    /// Reported version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Effective configuration.
    #[must_use]
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// The class registry.
    #[must_use]
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// The transaction catalog.
    #[must_use]
    pub fn catalog(&self) -> &TransactionCatalog {
        &self.catalog
    }

    /// Read access to the command chain.
    pub fn chain(&self) -> RwLockReadGuard<'_, CommandChain> {
        self.chain.read()
    }

    /// Links `target` as the subordinate of the current tail.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Chain`] if the link is refused.
    pub fn link_target(&self, target: Arc<dyn CommandTarget>) -> Result<(), AppError> {
        let mut chain = self.chain.write();
        let tail = chain.tail().id().clone();
        chain.set_command_link(&tail, target)?;
        Ok(())
    }

    /// Builds command `C` from `args`, dispatches it on behalf of `agent`
    /// and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for invalid arguments, or
    /// [`CommandError::Failed`] if the command failed or went unhandled.
    pub fn invoke<C: CommandSpec>(
        &self,
        agent: &Arc<Agent>,
        args: Vec<Arg>,
    ) -> Result<Value, CommandError> {
        let invoker = Subject::from(Arc::clone(agent));
        let chain = self.chain.read();
        C::invoke(&chain, invoker, args)?.into_result()
    }

    /// Loads class `name` on behalf of `agent`.
    ///
    /// # Errors
    ///
    /// See [`ClassRegistry::load_class`].
    pub fn load_class(&self, name: &str, agent: &Arc<Agent>) -> Result<Instance, RegistryError> {
        self.registry.load_class(self, name, agent, &[])
    }

    /// Loads the class registered for `T` on behalf of `agent`.
    ///
    /// # Errors
    ///
    /// See [`ClassRegistry::load`].
    pub fn load<T: CacheClass>(&self, agent: &Arc<Agent>) -> Result<Arc<T>, RegistryError> {
        self.registry.load::<T>(self, agent, &[])
    }

    /// The permission store.
    ///
    /// # Errors
    ///
    /// See [`ClassRegistry::load`].
    pub fn delegate(&self, agent: &Arc<Agent>) -> Result<Arc<Delegate>, RegistryError> {
        self.load::<Delegate>(agent)
    }

    /// The system agent.
    ///
    /// # Errors
    ///
    /// See [`ClassRegistry::load`].
    pub fn system_agent(&self) -> Result<Arc<Agent>, RegistryError> {
        let caller = Arc::new(Agent::system());
        self.load::<SystemAgent>(&caller)
            .map(|system| Arc::clone(system.agent()))
    }

    /// The shared guest agent.
    ///
    /// # Errors
    ///
    /// See [`ClassRegistry::load`].
    pub fn guest_agent(&self) -> Result<Arc<Agent>, RegistryError> {
        let caller = Arc::new(Agent::guest());
        self.load::<GuestAgent>(&caller)
            .map(|guest| Arc::clone(guest.agent()))
    }

    /// A user agent, holding the database client role when a database is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns [`AccessControlError::RoleRejected`] if the role refuses the
    /// user.
    pub fn user_agent(&self, name: &str) -> Result<Arc<Agent>, AccessControlError> {
        let user = Agent::user(name);
        if let Some(database) = &self.config.database {
            user.assign_role(Arc::new(database.client_role()))?;
        }
        Ok(Arc::new(user))
    }

    /// The registration for `request`, or a bare one resolving against the
    /// built-in fallbacks.
    #[must_use]
    pub fn registration_for(&self, request: &Request) -> ResourceRegistration {
        self.registrations
            .get(&request.resource_id())
            .cloned()
            .unwrap_or_else(|| ResourceRegistration::new(request.resource_name()))
    }

    /// Builds the transaction that resolves `request` for `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::UnknownClass`] if the registration's
    /// transaction class is not in the catalog.
    pub fn create_transaction(
        &self,
        request: &Request,
        agent: &Arc<Agent>,
    ) -> Result<Box<dyn Transaction>, TransactionError> {
        let registration = self.registration_for(request);
        let class = registration.transaction_class.clone();
        let seed = TransactionSeed {
            agent: Arc::clone(agent),
            request: request.clone(),
            registration,
        };
        self.catalog.create(&class, seed)
    }

    /// Resolves `request` for `agent`.
    ///
    /// Always yields a resource: unsupported methods give 405 and failures
    /// escaping the transaction give 500.
    pub fn handle(&self, request: &Request, agent: &Arc<Agent>) -> Arc<dyn Resource> {
        let name = request.resource_name();
        if !request.method().is_supported() {
            tracing::debug!(
                request = %request.id(),
                method = %request.method(),
                "method not allowed"
            );
            return Arc::new(ErrorResource::new(405, "Method Not Allowed", name));
        }
        let outcome = self
            .create_transaction(request, agent)
            .and_then(|mut transaction| transaction.run(self));
        match outcome {
            Ok(resource) => resource,
            Err(err) => {
                tracing::error!(
                    request = %request.id(),
                    agent = %agent.id(),
                    code = err.code(),
                    error = %err,
                    "request failed"
                );
                Arc::new(ErrorResource::internal(name))
            }
        }
    }

    /// Puts every loaded instance to sleep and, in install or update mode,
    /// saves the registry recipes. Returns the number of instances slept.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the recipes cannot be saved.
    pub fn shutdown(&self, subject: &Agent) -> Result<usize, AppError> {
        let slept = self.registry.sleep_all(subject);
        if self.config.mode.persists_registry() {
            if let Some(store) = &self.store {
                store.save(&self.registry.snapshot())?;
                tracing::info!(classes = self.registry.len(), "registry saved");
            }
        }
        tracing::debug!(slept, mode = %self.config.mode, "app shut down");
        Ok(slept)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("version", &self.version)
            .field("mode", &self.config.mode)
            .field("registry", &self.registry)
            .field("catalog", &self.catalog)
            .field("registrations", &self.registrations.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootMode;
    use crate::registry::MemoryStore;
    use crate::resource::Method;
    use serde_json::json;
    use warden_command::testing::MockTarget;
    use warden_command::Version;
    use warden_types::assert_error_codes;

    fn assert_sync<T: Send + Sync>() {}

    #[test]
    fn app_is_shareable() {
        assert_sync::<App>();
    }

    #[test]
    fn default_version_is_crate_version() {
        let app = App::builder().build().expect("app");
        assert_eq!(app.version(), env!("CARGO_PKG_VERSION"));
        let system = app.system_agent().expect("system");
        assert_eq!(
            app.invoke::<Version>(&system, vec![]).expect("version"),
            json!(env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn builtin_classes_registered() {
        let app = App::builder().build().expect("app");
        for class in [
            SystemAgent::CLASS,
            GuestAgent::CLASS,
            Delegate::CLASS,
            Acknowledgement::CLASS,
            Install::CLASS,
            LoginChallenge::CLASS,
            MembersOnly::CLASS,
        ] {
            assert!(app.registry().is_loadable(class), "{class}");
        }
        assert!(app.registry().loaded_classes().is_empty());
    }

    #[test]
    fn reverse_version_reaches_tail_first() {
        let app = App::builder()
            .with_version("1.0.0")
            .with_target(Arc::new(MockTarget::responder(
                "shadow",
                Version::id(),
                json!("shadowed"),
            )))
            .build()
            .expect("app");
        let guest = app.guest_agent().expect("guest");
        assert_eq!(
            app.invoke::<Version>(&guest, vec![]).expect("version"),
            json!("shadowed")
        );
        assert_eq!(app.chain().target_count(), 2);
        assert_eq!(app.chain().head().id(), &SystemTarget::target_id());
    }

    #[test]
    fn link_target_appends_and_refuses_duplicates() {
        let app = App::builder().build().expect("app");
        app.link_target(Arc::new(MockTarget::passive("audit")))
            .expect("link");
        let err = app
            .link_target(Arc::new(MockTarget::passive("audit")))
            .expect_err("already linked");
        assert!(matches!(
            err,
            AppError::Chain(CommandError::AlreadyLinked { .. })
        ));
        assert_eq!(err.code(), "APP_CHAIN");
    }

    #[test]
    fn unknown_transaction_class_refused() {
        let err = App::builder()
            .with_registration(
                ResourceRegistration::new("members").with_authority_class("oauth"),
            )
            .build()
            .expect_err("no oauth transaction");
        assert!(matches!(
            err,
            AppError::UnknownTransactionClass { ref class, .. } if class == "oauth"
        ));
    }

    #[test]
    fn registrations_from_config_and_builder() {
        let mut config = WardenConfig::default();
        config
            .resources
            .push(ResourceRegistration::new("members").with_resource_class("Old"));
        let app = App::builder()
            .with_config(config)
            .with_registration(
                ResourceRegistration::new("/members/").with_resource_class("MembersOnly"),
            )
            .build()
            .expect("app");

        let registration = app.registration_for(&Request::get("/members"));
        assert_eq!(registration.resource_class.as_deref(), Some("MembersOnly"));

        let bare = app.registration_for(&Request::get("/ghost?x=1"));
        assert_eq!(bare.resource, "ghost");
        assert!(bare.resource_class.is_none());
    }

    #[test]
    fn handle_maps_errors_to_500() {
        let app = App::builder()
            .with_registration(ResourceRegistration::new("ledger").with_resource_class("Ledger"))
            .build()
            .expect("app");
        let guest = app.guest_agent().expect("guest");
        let resource = app.handle(&Request::get("/ledger"), &guest);
        assert_eq!(resource.status(), 500);
        assert_eq!(resource.name(), "Internal Error");
    }

    #[test]
    fn handle_refuses_unsupported_methods() {
        let app = App::builder().build().expect("app");
        let guest = app.guest_agent().expect("guest");
        let request = Request::new(Method::parse("PATCH"), "/");
        assert_eq!(app.handle(&request, &guest).status(), 405);
    }

    #[test]
    fn custom_transaction_class() {
        fn challenge(seed: TransactionSeed) -> Box<dyn Transaction> {
            Box::new(crate::transaction::AuthenticationTransaction::new(seed))
        }
        let app = App::builder()
            .with_transaction_class("challenge", challenge)
            .with_registration(
                ResourceRegistration::new("login").with_transaction_class("challenge"),
            )
            .build()
            .expect("app");
        let guest = app.guest_agent().expect("guest");
        assert_eq!(app.handle(&Request::get("/login"), &guest).status(), 401);
    }

    #[test]
    fn user_agent_gets_database_role() {
        let mut config = WardenConfig::default();
        config.database = Some(crate::config::DatabaseConfig {
            locator: "db://main".into(),
            username: Some("app".into()),
            password: None,
        });
        let app = App::builder().with_config(config).build().expect("app");
        let alice = app.user_agent("alice").expect("user");
        assert!(alice.has_role(&warden_auth::DatabaseClientRole::role_id()));

        let plain = App::builder().build().expect("app");
        assert!(plain.user_agent("bob").expect("user").roles().is_empty());
    }

    #[test]
    fn normal_mode_leaves_registry_dir_untouched() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let state_dir = dir.path().join("state");

        let mut config = WardenConfig::default();
        config.paths.registry_file = Some(state_dir.join("registry.json"));
        let app = App::builder()
            .with_config(config.clone())
            .build()
            .expect("app");
        app.shutdown(&Agent::system()).expect("shutdown");
        assert!(!state_dir.exists());

        config.mode = BootMode::Update;
        let app = App::builder().with_config(config).build().expect("app");
        app.shutdown(&Agent::system()).expect("shutdown");
        assert!(state_dir.join("registry.json").exists());
    }

    #[test]
    fn shutdown_saves_only_when_mode_persists() {
        let store = Arc::new(MemoryStore::new());

        let mut config = WardenConfig::default();
        config.mode = BootMode::Normal;
        let normal = App::builder()
            .with_config(config.clone())
            .with_store(Box::new(Arc::clone(&store)))
            .build()
            .expect("app");
        normal.system_agent().expect("system");
        let system = Agent::system();
        assert_eq!(normal.shutdown(&system).expect("shutdown"), 1);
        assert!(store.load().expect("load").is_none());

        config.mode = BootMode::Install;
        let install = App::builder()
            .with_config(config)
            .with_document("reports")
            .with_store(Box::new(Arc::clone(&store)))
            .build()
            .expect("app");
        install.shutdown(&system).expect("shutdown");
        let saved = store.load().expect("load").expect("saved");
        assert!(saved
            .classes
            .iter()
            .any(|recipe| recipe.class_name == Document::class_for("reports")));
    }

    #[test]
    fn stored_recipes_restored_before_builder_classes() {
        let store = Arc::new(MemoryStore::new());
        let seeded = ClassRegistry::new();
        seeded.register_loadable_class("Document:archive", "archive", Document::factory_method());
        seeded.register_loadable_class(
            Delegate::CLASS,
            "/stored/delegate.json",
            Delegate::factory_method(),
        );
        store.save(&seeded.snapshot()).expect("seed");

        let app = App::builder()
            .with_store(Box::new(Arc::clone(&store)))
            .with_class::<Delegate>("")
            .build()
            .expect("app");
        assert!(app.registry().is_loadable("Document:archive"));
        assert_eq!(
            app.registry().recipe(Delegate::CLASS).expect("recipe").locator,
            ""
        );
    }

    #[test]
    fn error_codes() {
        assert_error_codes(
            &[
                AppError::UnknownTransactionClass {
                    resource: "r".into(),
                    class: "c".into(),
                },
                AppError::Chain(CommandError::Failed {
                    message: "x".into(),
                }),
            ],
            "APP_",
        );
    }
}
