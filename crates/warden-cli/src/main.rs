//! Warden CLI - resolve one request through the authorization core.
//!
//! Prints the resulting resource as JSON on stdout; logs go to stderr.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`WARDEN_*`)
//! 3. Project config (`.warden/config.toml` in the project root)
//! 4. Global config (`~/.warden/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `WARDEN_DEBUG`: Enable debug mode (`true`/`false`)
//! - `WARDEN_MODE`: Boot mode (`normal`, `install`, `update`)
//! - `WARDEN_REGISTRY_PATH`: Registry snapshot file
//! - `WARDEN_LOG`: Log filter directive (default `warn`)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use warden_runtime::config::{BootMode, ConfigError, ConfigLoader, ConfigResolver, WardenConfig};
use warden_runtime::registry::default_registry_path;
use warden_runtime::resource::{Method, Request};
use warden_runtime::App;

/// Warden CLI - authorization-gated request resolution
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long)]
    project: Option<PathBuf>,

    /// Boot mode: normal, install or update (also: WARDEN_MODE)
    #[arg(long)]
    mode: Option<BootMode>,

    /// Registry snapshot file (also: WARDEN_REGISTRY_PATH)
    #[arg(long, value_name = "PATH")]
    registry_path: Option<PathBuf>,

    /// Run with isolated state in DIR. Global config is skipped.
    #[arg(long, value_name = "DIR")]
    sandbox: Option<PathBuf>,

    /// Act as this user instead of the guest
    #[arg(short, long)]
    user: Option<String>,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request path
    #[arg(default_value = "/")]
    path: String,
}

/// CLI-based configuration resolver.
///
/// Merges file/env config via [`ConfigLoader`] and applies CLI argument
/// overrides as the highest-priority layer.
struct CliConfigResolver {
    project_root: PathBuf,
    debug: bool,
    mode: Option<BootMode>,
    registry_path: Option<PathBuf>,
    sandbox_dir: Option<PathBuf>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args
            .project
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        Self {
            project_root,
            debug: args.debug,
            mode: args.mode,
            registry_path: args.registry_path.clone(),
            sandbox_dir: args.sandbox.clone(),
        }
    }
}

impl ConfigResolver for CliConfigResolver {
    fn resolve(&self) -> Result<WardenConfig, ConfigError> {
        let mut loader = ConfigLoader::new().with_project_root(&self.project_root);

        // Sandbox: skip global config
        if self.sandbox_dir.is_some() {
            loader = loader.skip_global_config();
        }

        let mut config = loader.load()?;

        if let Some(ref sandbox) = self.sandbox_dir {
            config.paths.registry_file = Some(sandbox.join("registry.json"));
        }

        if self.debug {
            config.debug = true;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(ref p) = self.registry_path {
            config.paths.registry_file = Some(p.clone());
        }
        if config.paths.registry_file.is_none() {
            config.paths.registry_file = Some(default_registry_path());
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver
        .resolve()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    // --debug (or debug = true) > WARDEN_LOG > default "warn"
    let filter = if config.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("WARDEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    info!(
        path = %resolver.project_root.display(),
        mode = %config.mode,
        "Project root"
    );

    let app = App::builder()
        .with_config(config)
        .build()
        .context("failed to build application")?;

    let agent = match &args.user {
        Some(name) => app.user_agent(name).context("failed to sign in")?,
        None => app.guest_agent().context("failed to load guest agent")?,
    };

    let request = Request::new(Method::parse(&args.method), args.path.as_str());
    let resource = app.handle(&request, &agent);
    println!("{}", serde_json::to_string_pretty(&resource.to_json())?);

    let system = app.system_agent().context("failed to load system agent")?;
    let slept = app.shutdown(&system).context("shutdown failed")?;
    info!(slept, status = resource.status(), "Done");

    Ok(())
}
