//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.warden/config.toml`)
//! 3. Project config (`.warden/config.toml`)
//! 4. Environment variables (`WARDEN_*`)
//!
//! Each layer overrides the previous.

use super::{
    default_config_path, BootMode, ConfigError, ConfigLayer, WardenConfig, PROJECT_CONFIG_DIR,
    PROJECT_CONFIG_FILE,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use warden_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/path/to/project")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), warden_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.warden/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    skip_env: bool,
    skip_global: bool,
    skip_project: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.warden/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Skips project config loading.
    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be parsed,
    /// or an environment variable holds an invalid value. Missing config files
    /// are silently ignored.
    pub fn load(&self) -> Result<WardenConfig, ConfigError> {
        let mut config = WardenConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_config) = Self::load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.apply(&global_config);
            }
        }

        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_config_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(project_config) = Self::load_file(&project_config_path)? {
                    debug!(
                        path = %project_config_path.display(),
                        project = %project_root.display(),
                        "Loaded project config"
                    );
                    config.apply(&project_config);
                }
            }
        }

        if !self.skip_env {
            Self::apply_env_vars(&mut config)?;
        }

        Ok(config)
    }

    /// Loads a config file, returning None if it doesn't exist.
    fn load_file(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

        let layer =
            ConfigLayer::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

        Ok(Some(layer))
    }

    fn apply_env_vars(config: &mut WardenConfig) -> Result<(), ConfigError> {
        parse_env_bool!(config.debug, "WARDEN_DEBUG");

        if let Ok(val) = std::env::var("WARDEN_MODE") {
            config.mode = val
                .parse::<BootMode>()
                .map_err(|message| ConfigError::invalid_env_var("WARDEN_MODE", message))?;
        }

        if let Ok(val) = std::env::var("WARDEN_REGISTRY_PATH") {
            config.paths.registry_file = Some(PathBuf::from(val));
        }

        Ok(())
    }
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off"
/// (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_defaults_only() {
        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config, WardenConfig::default());
    }

    #[test]
    fn load_global_config() {
        let temp = TempDir::new().unwrap();
        let config_path = create_config_file(
            temp.path(),
            r#"
debug = true
mode = "install"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&config_path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();

        assert!(config.debug);
        assert_eq!(config.mode, BootMode::Install);
    }

    #[test]
    fn load_project_overrides_global() {
        let global_temp = TempDir::new().unwrap();
        let project_temp = TempDir::new().unwrap();

        let warden_dir = project_temp.path().join(".warden");
        std::fs::create_dir_all(&warden_dir).unwrap();

        let global_path = create_config_file(
            global_temp.path(),
            r#"
debug = true

[[resources]]
resource = "members"
resource_class = "MembersOnly"

[[resources]]
resource = "reports"
resource_class = "Document:reports"
"#,
        );

        create_config_file(
            &warden_dir,
            r#"
mode = "update"

[[resources]]
resource = "members"
resource_class = "MembersOnly"
authority_class = "authentication"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project_temp.path())
            .skip_env_vars()
            .load()
            .unwrap();

        // debug from global (not overridden in project)
        assert!(config.debug);
        assert_eq!(config.mode, BootMode::Update);
        assert_eq!(config.resources.len(), 2);
        assert_eq!(
            config.resources[0].authority_class.as_deref(),
            Some("authentication")
        );
    }

    #[test]
    fn missing_config_files_ok() {
        let config = ConfigLoader::new()
            .with_global_config("/nonexistent/path/config.toml")
            .with_project_root("/nonexistent/project")
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config, WardenConfig::default());
    }

    #[test]
    fn invalid_toml_is_error() {
        let temp = TempDir::new().unwrap();
        let path = create_config_file(temp.path(), "mode = [");

        let err = ConfigLoader::new()
            .with_global_config(&path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap_err();

        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));

        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));

        assert_eq!(parse_bool("invalid"), None);
    }

    #[test]
    fn project_can_reset_global_mode() {
        let global_temp = TempDir::new().unwrap();
        let project_temp = TempDir::new().unwrap();
        let warden_dir = project_temp.path().join(".warden");
        std::fs::create_dir_all(&warden_dir).unwrap();

        let global_path = create_config_file(
            global_temp.path(),
            r#"
debug = true
mode = "install"
"#,
        );
        create_config_file(
            &warden_dir,
            r#"
debug = false
mode = "normal"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project_temp.path())
            .skip_env_vars()
            .load()
            .unwrap();

        assert!(!config.debug);
        assert_eq!(config.mode, BootMode::Normal);
    }

    #[test]
    fn env_var_override() {
        // The only test that touches WARDEN_* variables.
        std::env::set_var("WARDEN_DEBUG", "yes");
        std::env::set_var("WARDEN_MODE", "update");
        std::env::set_var("WARDEN_REGISTRY_PATH", "/var/lib/warden/registry.json");

        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .load();

        std::env::set_var("WARDEN_MODE", "repair");
        let invalid = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .load();

        std::env::remove_var("WARDEN_DEBUG");
        std::env::remove_var("WARDEN_MODE");
        std::env::remove_var("WARDEN_REGISTRY_PATH");

        let config = config.unwrap();
        assert!(config.debug);
        assert_eq!(config.mode, BootMode::Update);
        assert_eq!(
            config.paths.registry_file,
            Some(PathBuf::from("/var/lib/warden/registry.json"))
        );
        assert!(matches!(
            invalid.unwrap_err(),
            ConfigError::InvalidEnvVar { ref name, .. } if name == "WARDEN_MODE"
        ));
    }
}
