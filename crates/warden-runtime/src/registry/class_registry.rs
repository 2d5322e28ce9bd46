//! The class registry: lazy, authorization-aware object cache.
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | factories | factory method id (`"Delegate::wakeup"`) | typed constructor |
//! | recipes | class name | [`ClassRecipe`] |
//! | instances | class name | cached [`Instance`] |
//!
//! Factories are registered in code; recipes can also come from a
//! persisted [`RegistrySnapshot`]. A recipe whose method has no factory
//! fails with [`RegistryError::UnknownFactory`] at load time.
//!
//! # Concurrency
//!
//! Each class name has a slot lock held across check-then-create, so two
//! threads loading the same class run `wakeup` once. A `wakeup` or
//! `check_access` may load *other* classes; loading its own class from
//! inside either deadlocks.

use super::{
    CacheClass, ClassRecipe, Instance, RegistryError, RegistrySnapshot, WakeupContext,
    WakeupError,
};
use crate::App;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use warden_auth::Agent;

/// Typed constructor stored in the factory table.
type Factory = fn(&WakeupContext<'_>) -> Result<Instance, WakeupError>;

fn construct<T: CacheClass>(ctx: &WakeupContext<'_>) -> Result<Instance, WakeupError> {
    T::wakeup(ctx).map(Instance::new)
}

/// Process-wide registry of loadable classes and their live instances.
#[derive(Default)]
pub struct ClassRegistry {
    factories: RwLock<HashMap<String, Factory>>,
    recipes: RwLock<HashMap<String, ClassRecipe>>,
    instances: RwLock<HashMap<String, Instance>>,
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Registration ===

    /// Adds `T::wakeup` to the factory table.
    pub fn register_factory<T: CacheClass>(&self) {
        self.factories
            .write()
            .insert(T::factory_method(), construct::<T>);
    }

    /// Registers the factory of `T` and a recipe under `T::CLASS`.
    pub fn register_class<T: CacheClass>(&self, locator: impl Into<String>) {
        self.register_factory::<T>();
        self.register_loadable_class(T::CLASS, locator, T::factory_method());
    }

    /// Records how to create `name`.
    ///
    /// Re-registering overwrites the recipe; a live instance stays cached
    /// until it is put to sleep.
    pub fn register_loadable_class(
        &self,
        name: impl Into<String>,
        locator: impl Into<String>,
        factory_method: impl Into<String>,
    ) {
        let recipe = ClassRecipe::new(name, locator, factory_method);
        tracing::debug!(
            class = %recipe.class_name,
            method = %recipe.factory_method,
            "class registered"
        );
        self.recipes
            .write()
            .insert(recipe.class_name.clone(), recipe);
    }

    /// Removes a recipe. Returns `true` if it existed.
    ///
    /// A live instance is not evicted.
    pub fn unregister(&self, name: &str) -> bool {
        self.recipes.write().remove(name).is_some()
    }

    // === Queries ===

    /// Returns `true` if a recipe is registered for `name`.
    #[must_use]
    pub fn is_loadable(&self, name: &str) -> bool {
        self.recipes.read().contains_key(name)
    }

    /// Returns the recipe for `name`.
    #[must_use]
    pub fn recipe(&self, name: &str) -> Option<ClassRecipe> {
        self.recipes.read().get(name).cloned()
    }

    /// Returns the number of registered recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.read().len()
    }

    /// Returns `true` if no recipe is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.read().is_empty()
    }

    /// Returns `true` if `name` has a live instance.
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.instances.read().contains_key(name)
    }

    /// Names of classes with a live instance, sorted.
    #[must_use]
    pub fn loaded_classes(&self) -> Vec<String> {
        let mut names: Vec<_> = self.instances.read().keys().cloned().collect();
        names.sort();
        names
    }

    // === Loading ===

    /// Returns the instance of `name`, waking it on first use.
    ///
    /// A cached instance is returned as-is after
    /// [`CacheObject::check_access`](super::CacheObject::check_access)
    /// accepts `subject`; `wakeup` is not re-run.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if `name` has no recipe
    /// - [`RegistryError::UnknownFactory`] if the recipe's method has no
    ///   constructor
    /// - [`RegistryError::AccessDenied`] if the class refused `subject`
    /// - [`RegistryError::Construction`] for other wakeup failures
    pub fn load_class(
        &self,
        app: &App,
        name: &str,
        subject: &Arc<Agent>,
        args: &[Value],
    ) -> Result<Instance, RegistryError> {
        if let Some(instance) = self.cached(app, name, subject)? {
            return Ok(instance);
        }

        let recipe = self
            .recipe(name)
            .ok_or_else(|| RegistryError::not_registered(name))?;
        let factory = self
            .factories
            .read()
            .get(&recipe.factory_method)
            .copied()
            .ok_or_else(|| RegistryError::UnknownFactory {
                class: name.to_string(),
                method: recipe.factory_method.clone(),
            })?;

        let slot = self.slot(name);
        let _guard = slot.lock();
        if let Some(instance) = self.cached(app, name, subject)? {
            return Ok(instance);
        }

        let ctx = WakeupContext::new(app, name, &recipe.locator, subject, args);
        let instance = factory(&ctx).map_err(|err| match err {
            WakeupError::AccessDenied(denied) => {
                tracing::warn!(
                    class = name,
                    subject = %subject.id(),
                    error = %denied,
                    "wakeup denied"
                );
                RegistryError::AccessDenied(denied)
            }
            WakeupError::Failed { class, message } => {
                RegistryError::Construction { class, message }
            }
            WakeupError::Registry(inner) => *inner,
        })?;

        tracing::debug!(class = name, subject = %subject.id(), "class woken");
        self.instances
            .write()
            .insert(name.to_string(), instance.clone());
        Ok(instance)
    }

    /// Typed [`load_class`](Self::load_class) of `T::CLASS`.
    ///
    /// # Errors
    ///
    /// As `load_class`, plus [`RegistryError::TypeMismatch`] when the cached
    /// instance is not a `T`.
    pub fn load<T: CacheClass>(
        &self,
        app: &App,
        subject: &Arc<Agent>,
        args: &[Value],
    ) -> Result<Arc<T>, RegistryError> {
        self.load_class(app, T::CLASS, subject, args)?
            .downcast::<T>()
            .ok_or_else(|| RegistryError::TypeMismatch {
                class: T::CLASS.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    fn cached(
        &self,
        app: &App,
        name: &str,
        subject: &Arc<Agent>,
    ) -> Result<Option<Instance>, RegistryError> {
        let Some(instance) = self.instances.read().get(name).cloned() else {
            return Ok(None);
        };
        instance.object().check_access(app, subject)?;
        tracing::trace!(class = name, "class served from cache");
        Ok(Some(instance))
    }

    fn slot(&self, name: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.slots.lock().entry(name.to_string()).or_default())
    }

    // === Eviction ===

    /// Evicts `name`, letting it flush first. Returns `true` if it was live.
    ///
    /// A failing `sleep` is logged and the instance is evicted anyway.
    pub fn sleep(&self, name: &str, subject: &Agent) -> bool {
        let slot = self.slot(name);
        let _guard = slot.lock();
        let Some(instance) = self.instances.write().remove(name) else {
            return false;
        };
        if let Err(err) = instance.object().sleep(subject) {
            tracing::warn!(class = name, error = %err, "sleep failed, state not flushed");
        } else {
            tracing::debug!(class = name, "class put to sleep");
        }
        true
    }

    /// Evicts every live instance. Returns how many were evicted.
    pub fn sleep_all(&self, subject: &Agent) -> usize {
        self.loaded_classes()
            .iter()
            .filter(|name| self.sleep(name, subject))
            .count()
    }

    // === Persistence ===

    /// Captures all recipes.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::new(self.recipes.read().values().cloned().collect())
    }

    /// Registers every recipe in `snapshot`, overwriting same-named ones.
    pub fn restore(&self, snapshot: &RegistrySnapshot) {
        let mut recipes = self.recipes.write();
        for recipe in &snapshot.classes {
            recipes.insert(recipe.class_name.clone(), recipe.clone());
        }
        tracing::debug!(classes = snapshot.classes.len(), "registry restored");
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("recipes", &self.len())
            .field("loaded", &self.loaded_classes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CacheObject, SleepError};
    use warden_auth::{AccessControlError, DenyCode};
    use warden_types::ErrorCode;

    /// Locators of every `Counted` wakeup and sleep, across all tests.
    static WAKEUPS: Mutex<Vec<String>> = parking_lot::const_mutex(Vec::new());
    static SLEEPS: Mutex<Vec<String>> = parking_lot::const_mutex(Vec::new());

    fn count(log: &Mutex<Vec<String>>, locator: &str) -> usize {
        log.lock().iter().filter(|l| *l == locator).count()
    }

    /// Records lifecycle calls under its locator.
    struct Counted {
        locator: String,
    }

    impl CacheObject for Counted {
        fn sleep(&self, _subject: &Agent) -> Result<(), SleepError> {
            SLEEPS.lock().push(self.locator.clone());
            Ok(())
        }
    }

    impl CacheClass for Counted {
        const CLASS: &'static str = "Counted";

        fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
            WAKEUPS.lock().push(ctx.locator().to_string());
            Ok(Counted {
                locator: ctx.locator().to_string(),
            })
        }
    }

    /// Only authenticated agents may wake or use it.
    #[derive(Debug)]
    struct Private;

    impl CacheObject for Private {
        fn check_access(&self, _app: &App, subject: &Arc<Agent>) -> Result<(), RegistryError> {
            if subject.is_authenticated() {
                Ok(())
            } else {
                let denied =
                    AccessControlError::unauthenticated(subject.id().clone(), "use Private");
                Err(denied.into())
            }
        }
    }

    impl CacheClass for Private {
        const CLASS: &'static str = "Private";

        fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
            Private.check_access(ctx.app(), ctx.subject())?;
            Ok(Private)
        }
    }

    /// Wakes only when its first argument is `true`; its sleep always fails.
    struct Broken;

    impl CacheObject for Broken {
        fn sleep(&self, _subject: &Agent) -> Result<(), SleepError> {
            Err(SleepError::new(Self::CLASS, "read-only"))
        }
    }

    impl CacheClass for Broken {
        const CLASS: &'static str = "Broken";

        fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
            match ctx.args().first().and_then(Value::as_bool) {
                Some(true) => Ok(Broken),
                _ => Err(ctx.failed("no database")),
            }
        }
    }

    /// Wakes `Counted` as a dependency.
    struct Dependent {
        inner: Instance,
    }

    impl CacheObject for Dependent {}

    impl CacheClass for Dependent {
        const CLASS: &'static str = "Dependent";

        fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
            let inner = ctx
                .app()
                .registry()
                .load_class(ctx.app(), Counted::CLASS, ctx.subject(), &[])?;
            Ok(Dependent { inner })
        }
    }

    /// An app whose `Counted` recipe carries `locator`.
    fn app(locator: &str) -> App {
        let app = App::builder().build().expect("default app");
        let registry = app.registry();
        registry.register_class::<Counted>(locator);
        registry.register_class::<Private>("");
        registry.register_class::<Broken>("");
        registry.register_class::<Dependent>("");
        app
    }

    fn user() -> Arc<Agent> {
        Arc::new(Agent::user("alice"))
    }

    // ── Registration ─────────────────────────────────────────

    #[test]
    fn registration_is_idempotent() {
        let registry = ClassRegistry::new();
        assert!(registry.is_empty());
        registry.register_loadable_class("Counted", "a", "Counted::wakeup");
        registry.register_loadable_class("Counted", "b", "Counted::wakeup");
        assert_eq!(registry.len(), 1);
        assert!(registry.is_loadable("Counted"));
        assert_eq!(registry.recipe("Counted").map(|r| r.locator), Some("b".into()));
        assert!(registry.unregister("Counted"));
        assert!(!registry.is_loadable("Counted"));
        assert!(!registry.unregister("Counted"));
    }

    // ── Loading ──────────────────────────────────────────────

    #[test]
    fn load_twice_returns_same_instance() {
        let app = app("load-twice");
        let registry = app.registry();

        let a = registry
            .load_class(&app, "Counted", &user(), &[])
            .expect("load");
        let b = registry
            .load_class(&app, "Counted", &user(), &[])
            .expect("load again");
        assert!(a.ptr_eq(&b));
        assert_eq!(count(&WAKEUPS, "load-twice"), 1);
        assert!(registry.is_loaded("Counted"));
    }

    #[test]
    fn sleep_evicts_and_next_load_wakes_fresh() {
        let app = app("sleep-evicts");
        let registry = app.registry();

        let a = registry
            .load_class(&app, "Counted", &user(), &[])
            .expect("load");
        assert!(registry.sleep("Counted", &Agent::system()));
        assert!(!registry.sleep("Counted", &Agent::system()));
        assert_eq!(count(&SLEEPS, "sleep-evicts"), 1);

        let b = registry
            .load_class(&app, "Counted", &user(), &[])
            .expect("reload");
        assert!(!a.ptr_eq(&b));
        assert_eq!(count(&WAKEUPS, "sleep-evicts"), 2);
    }

    #[test]
    fn unknown_class_not_registered() {
        let app = app("unknown");
        let err = app
            .registry()
            .load_class(&app, "Ghost", &user(), &[])
            .expect_err("ghost");
        assert!(matches!(err, RegistryError::NotRegistered(ref n) if n == "Ghost"));
    }

    #[test]
    fn recipe_without_factory() {
        let app = app("no-factory");
        app.registry()
            .register_loadable_class("Legacy", "", "Legacy::create");
        let err = app
            .registry()
            .load_class(&app, "Legacy", &user(), &[])
            .expect_err("no factory");
        assert_eq!(err.code(), "REGISTRY_UNKNOWN_FACTORY");
    }

    #[test]
    fn denial_propagates_unchanged() {
        let app = app("denial");
        let guest = Arc::new(Agent::guest());
        let err = app
            .registry()
            .load_class(&app, "Private", &guest, &[])
            .expect_err("guest refused");
        let denied = err.access_denied().expect("access denied");
        assert_eq!(denied.deny_code(), DenyCode::Unauthenticated);
        assert!(!app.registry().is_loaded("Private"));
    }

    #[test]
    fn cached_instance_rechecks_access() {
        let app = app("recheck");
        app.registry()
            .load_class(&app, "Private", &user(), &[])
            .expect("user may wake");
        let err = app
            .registry()
            .load_class(&app, "Private", &Arc::new(Agent::guest()), &[])
            .expect_err("guest refused on cache hit");
        assert!(err.access_denied().is_some());
    }

    #[test]
    fn wakeup_failure_is_construction() {
        let app = app("construction");
        let err = app
            .registry()
            .load_class(&app, "Broken", &user(), &[])
            .expect_err("broken");
        assert!(matches!(
            err,
            RegistryError::Construction { ref class, ref message }
                if class == "Broken" && message == "no database"
        ));
    }

    #[test]
    fn failing_sleep_still_evicts() {
        let app = app("failing-sleep");
        app.registry()
            .load_class(&app, "Broken", &user(), &[Value::Bool(true)])
            .expect("woken with args");
        assert!(app.registry().sleep("Broken", &Agent::system()));
        assert!(!app.registry().is_loaded("Broken"));
    }

    #[test]
    fn wakeup_may_load_other_classes() {
        let app = app("dependency");
        let dependent = app
            .registry()
            .load::<Dependent>(&app, &user(), &[])
            .expect("dependent");
        let counted = app
            .registry()
            .load_class(&app, "Counted", &user(), &[])
            .expect("counted");
        assert!(dependent.inner.ptr_eq(&counted));
        assert_eq!(count(&WAKEUPS, "dependency"), 1);
    }

    #[test]
    fn typed_load_mismatch() {
        let app = app("mismatch");
        app.registry()
            .register_loadable_class(Private::CLASS, "", Counted::factory_method());
        let err = app
            .registry()
            .load::<Private>(&app, &user(), &[])
            .expect_err("recipe builds a Counted");
        assert_eq!(err.code(), "REGISTRY_TYPE_MISMATCH");
    }

    #[test]
    fn concurrent_loads_wake_once() {
        let app = app("concurrent");

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    app.registry()
                        .load_class(&app, "Counted", &user(), &[])
                        .expect("load")
                });
            }
        });
        assert_eq!(count(&WAKEUPS, "concurrent"), 1);
    }

    // ── Persistence ──────────────────────────────────────────

    #[test]
    fn snapshot_restore() {
        let source = ClassRegistry::new();
        source.register_loadable_class("A", "/a.json", "A::wakeup");
        source.register_loadable_class("B", "", "B::wakeup");

        let target = ClassRegistry::new();
        target.restore(&source.snapshot());
        assert_eq!(target.len(), 2);
        assert_eq!(target.recipe("A"), source.recipe("A"));
    }

    #[test]
    fn sleep_all_evicts_everything() {
        let app = app("sleep-all");
        app.registry()
            .load_class(&app, "Counted", &user(), &[])
            .expect("load");
        app.registry()
            .load_class(&app, "Private", &user(), &[])
            .expect("load");
        let loaded = app.registry().loaded_classes().len();
        assert_eq!(app.registry().sleep_all(&Agent::system()), loaded);
        assert!(app.registry().loaded_classes().is_empty());
        assert_eq!(count(&SLEEPS, "sleep-all"), 1);
    }
}
