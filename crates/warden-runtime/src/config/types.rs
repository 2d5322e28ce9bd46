//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use crate::resource::ResourceRegistration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use warden_auth::{DatabaseClientRole, Token};

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use warden_runtime::config::{BootMode, WardenConfig};
///
/// let config = WardenConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.mode, BootMode::Normal);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WardenConfig {
    /// Enable debug mode (verbose logging).
    pub debug: bool,

    /// Boot mode.
    pub mode: BootMode,

    /// Path configuration.
    pub paths: PathsConfig,

    /// Resource registrations (`[[resources]]`).
    pub resources: Vec<ResourceRegistration>,

    /// Application database (`[database]`).
    pub database: Option<DatabaseConfig>,
}

impl WardenConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one file layer on top of this config.
    ///
    /// Every key the layer sets overrides, including keys set back to their
    /// default value. Registrations are merged by resource id, the layer
    /// winning.
    pub fn apply(&mut self, layer: &ConfigLayer) {
        if let Some(debug) = layer.debug {
            self.debug = debug;
        }
        if let Some(mode) = layer.mode {
            self.mode = mode;
        }

        self.paths.merge(&layer.paths);

        for registration in &layer.resources {
            let id = registration.resource_id();
            match self.resources.iter_mut().find(|r| r.resource_id() == id) {
                Some(existing) => *existing = registration.clone(),
                None => self.resources.push(registration.clone()),
            }
        }

        if layer.database.is_some() {
            self.database.clone_from(&layer.database);
        }
    }
}

/// One configuration file, as written.
///
/// Scalars are optional so that a higher layer can tell "not set" apart
/// from "set to the default".
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigLayer {
    /// `debug = ...`, if present.
    pub debug: Option<bool>,
    /// `mode = ...`, if present.
    pub mode: Option<BootMode>,
    /// `[paths]`.
    pub paths: PathsConfig,
    /// `[[resources]]`.
    pub resources: Vec<ResourceRegistration>,
    /// `[database]`.
    pub database: Option<DatabaseConfig>,
}

impl ConfigLayer {
    /// Parses a layer from TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or has mistyped keys.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// How the application was started.
///
/// Only `install` and `update` flush the class registry at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootMode {
    /// Regular operation.
    #[default]
    Normal,
    /// First-time installation.
    Install,
    /// Upgrade of an existing installation.
    Update,
}

impl BootMode {
    /// Returns the mode name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Install => "install",
            Self::Update => "update",
        }
    }

    /// Returns `true` if the registry is saved at shutdown.
    #[must_use]
    pub fn persists_registry(self) -> bool {
        matches!(self, Self::Install | Self::Update)
    }
}

impl std::str::FromStr for BootMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "install" => Ok(Self::Install),
            "update" => Ok(Self::Update),
            other => Err(format!("unknown boot mode '{other}'")),
        }
    }
}

impl std::fmt::Display for BootMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Registry snapshot file. No file means the registry is not persisted.
    pub registry_file: Option<PathBuf>,
}

impl PathsConfig {
    fn merge(&mut self, other: &Self) {
        if other.registry_file.is_some() {
            self.registry_file.clone_from(&other.registry_file);
        }
    }
}

/// Application database connection.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection descriptor.
    pub locator: String,
    /// Login name.
    pub username: Option<String>,
    /// Login password.
    pub password: Option<String>,
}

impl DatabaseConfig {
    /// Builds the database client role for this connection.
    #[must_use]
    pub fn client_role(&self) -> DatabaseClientRole {
        let token = self.username.as_ref().map(|username| {
            Token::credentials(username.clone(), self.password.clone().unwrap_or_default())
        });
        DatabaseClientRole::new(self.locator.clone(), token)
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("locator", &self.locator)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
