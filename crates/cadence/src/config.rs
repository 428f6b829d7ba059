//! Configuration types and loading for Cadence sessions.
//!
//! All types implement [`serde::Deserialize`] so they can be read from TOML.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration root.
//! - [`CacheConfig`] - Which cache tiers a new session starts with.
//! - [`load_config`] - Locate and parse a configuration file.
//!
//! # Example
//!
//! ```
//! # use cadence::config::AppConfig;
//! let config: AppConfig = toml::from_str("[cache]\ncollections = true").unwrap();
//! assert!(config.cache().collections());
//! assert!(!config.cache().structural());
//! ```

use std::{fs, path::Path};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;

use crate::error::{CadenceError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Cache configuration section.
    #[serde(default)]
    cache: CacheConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the given cache section.
    pub fn new(cache: CacheConfig) -> Self {
        Self { cache }
    }

    /// Returns the cache configuration.
    pub fn cache(&self) -> &CacheConfig {
        &self.cache
    }
}

/// Initial state of the cache toggles of a session.
///
/// Every tier is off by default: an uncached session always recomputes and can
/// never serve stale data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Memoize the per-kind collections of the diagram aggregator.
    #[serde(default)]
    collections: bool,

    /// Memoize hierarchy-derived relations.
    #[serde(default)]
    structural: bool,

    /// Memoize range-derived relations.
    #[serde(default)]
    range: bool,
}

impl CacheConfig {
    /// Creates a cache configuration with explicit toggles.
    pub fn new(collections: bool, structural: bool, range: bool) -> Self {
        Self {
            collections,
            structural,
            range,
        }
    }

    /// All caches enabled.
    pub fn enabled() -> Self {
        Self::new(true, true, true)
    }

    pub fn collections(&self) -> bool {
        self.collections
    }

    pub fn structural(&self) -> bool {
        self.structural
    }

    pub fn range(&self) -> bool {
        self.range
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (`cadence/config.toml`)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns an error if an explicit path is given but missing, or if a found
/// file cannot be read or parsed.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("cadence/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "cadence", "cadence") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Parse a configuration file.
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CadenceError::Config(format!(
            "Missing configuration file: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;

    toml::from_str(&content)
        .map_err(|err| CadenceError::Config(format!("Failed to parse TOML configuration: {err}")))
}
