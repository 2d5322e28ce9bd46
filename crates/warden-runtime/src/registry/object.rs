//! The sleep/wakeup lifecycle of registry-cached objects.
//!
//! # Lifecycle
//!
//! ```text
//!            load_class(name)                 sleep(name)
//!  (absent) ─────────────────▶ (cached) ─────────────────▶ (absent)
//!            CacheClass::wakeup           CacheObject::sleep
//!                                  │
//!                 load_class(name) │ (no wakeup, same Arc)
//!                                  ▼
//!                              (cached)
//! ```
//!
//! The instance side ([`CacheObject`]) is object-safe and stored behind
//! `Arc<dyn CacheObject>`. The class side ([`CacheClass`]) carries the
//! static class name and the `wakeup` constructor registered in the
//! registry's factory table.

use crate::resource::Resource;
use crate::App;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use warden_auth::{AccessControlError, Agent};

use super::RegistryError;

/// Instance side of a registry-cached object.
pub trait CacheObject: Any + Send + Sync {
    /// Flushes state before eviction.
    ///
    /// Failures are logged and swallowed by the registry.
    ///
    /// # Errors
    ///
    /// Returns [`SleepError`] if state could not be flushed.
    fn sleep(&self, _subject: &Agent) -> Result<(), SleepError> {
        Ok(())
    }

    /// Re-checks access for a subject served from the cache.
    ///
    /// `wakeup` only runs once per cached lifetime; objects whose access
    /// depends on the subject repeat the check here. Shared state such as
    /// the delegate must be looked up through `app` on every call, since
    /// the registry may have replaced it since this object woke.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AccessDenied`] when `subject` may not use the
    ///   object
    /// - any error from loading the classes the check depends on
    fn check_access(&self, _app: &App, _subject: &Arc<Agent>) -> Result<(), RegistryError> {
        Ok(())
    }

    /// Exposes the object as a resource, if it is one.
    fn as_resource(self: Arc<Self>) -> Option<Arc<dyn Resource>> {
        None
    }
}

/// Class side of a registry-cached object.
///
/// # Example
///
/// ```
/// use warden_runtime::registry::{CacheClass, CacheObject, WakeupContext, WakeupError};
///
/// struct Counter;
///
/// impl CacheObject for Counter {}
///
/// impl CacheClass for Counter {
///     const CLASS: &'static str = "Counter";
///
///     fn wakeup(_ctx: &WakeupContext<'_>) -> Result<Self, WakeupError> {
///         Ok(Counter)
///     }
/// }
///
/// assert_eq!(Counter::factory_method(), "Counter::wakeup");
/// ```
pub trait CacheClass: CacheObject + Sized {
    /// Class name the object is registered and cached under.
    const CLASS: &'static str;

    /// Constructs the object, performing its own authorization.
    ///
    /// # Errors
    ///
    /// - [`WakeupError::AccessDenied`] when `ctx.subject()` is refused
    /// - [`WakeupError::Failed`] for any other construction failure
    fn wakeup(ctx: &WakeupContext<'_>) -> Result<Self, WakeupError>;

    /// Factory method id recorded in class recipes.
    #[must_use]
    fn factory_method() -> String {
        format!("{}::wakeup", Self::CLASS)
    }
}

/// Everything a `wakeup` receives.
pub struct WakeupContext<'a> {
    app: &'a App,
    class: &'a str,
    locator: &'a str,
    subject: &'a Arc<Agent>,
    args: &'a [Value],
}

impl<'a> WakeupContext<'a> {
    pub(crate) fn new(
        app: &'a App,
        class: &'a str,
        locator: &'a str,
        subject: &'a Arc<Agent>,
        args: &'a [Value],
    ) -> Self {
        Self {
            app,
            class,
            locator,
            subject,
            args,
        }
    }

    /// The application context, for loading other classes or dispatching
    /// commands.
    #[must_use]
    pub fn app(&self) -> &'a App {
        self.app
    }

    /// The class being woken.
    #[must_use]
    pub fn class(&self) -> &'a str {
        self.class
    }

    /// The recipe's locator (path). Empty for in-memory classes.
    #[must_use]
    pub fn locator(&self) -> &'a str {
        self.locator
    }

    /// The agent on whose behalf the class is loaded.
    #[must_use]
    pub fn subject(&self) -> &'a Arc<Agent> {
        self.subject
    }

    /// Extra construction arguments.
    #[must_use]
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Builds a [`WakeupError::Failed`] for this class.
    #[must_use]
    pub fn failed(&self, message: impl Into<String>) -> WakeupError {
        WakeupError::Failed {
            class: self.class.to_string(),
            message: message.into(),
        }
    }
}

/// Why a `wakeup` did not produce an object.
#[derive(Debug, Error)]
pub enum WakeupError {
    /// The subject was refused.
    #[error(transparent)]
    AccessDenied(#[from] AccessControlError),

    /// Construction failed.
    #[error("wakeup of {class} failed: {message}")]
    Failed {
        /// Class being woken.
        class: String,
        /// What went wrong.
        message: String,
    },

    /// Loading a dependency from the registry failed.
    #[error(transparent)]
    Registry(Box<RegistryError>),
}

impl From<RegistryError> for WakeupError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::AccessDenied(err) => Self::AccessDenied(err),
            other => Self::Registry(Box::new(other)),
        }
    }
}

/// A `sleep` that could not flush its state.
#[derive(Debug, Error)]
#[error("sleep of {class} failed: {message}")]
pub struct SleepError {
    /// Class being evicted.
    pub class: String,
    /// What went wrong.
    pub message: String,
}

impl SleepError {
    /// Creates a sleep error.
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
        }
    }
}

/// A cached object as handed out by the registry.
///
/// Cloning is cheap; clones of one instance are pointer-equal.
#[derive(Clone)]
pub struct Instance {
    class: &'static str,
    object: Arc<dyn CacheObject>,
    any: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub(crate) fn new<T: CacheClass>(object: T) -> Self {
        let object = Arc::new(object);
        Self {
            class: T::CLASS,
            object: object.clone(),
            any: object,
        }
    }

    /// Class name of the cached object.
    #[must_use]
    pub fn class(&self) -> &'static str {
        self.class
    }

    /// The object, type-erased.
    #[must_use]
    pub fn object(&self) -> &Arc<dyn CacheObject> {
        &self.object
    }

    /// Downcasts to a concrete class.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.any).downcast::<T>().ok()
    }

    /// Returns the object as a resource, if it is one.
    #[must_use]
    pub fn as_resource(&self) -> Option<Arc<dyn Resource>> {
        Arc::clone(&self.object).as_resource()
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.any, &other.any)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}
