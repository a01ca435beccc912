//! Runtime configuration
//!
//! Settings are read from `alarmpkg.toml` in the project root, or from
//! `config.toml` in the user config directory when the project has none.
//! A missing file yields defaults; a malformed file is an error.
//!
//! ```toml
//! [database]
//! path = "db/db.json"
//!
//! [sync]
//! backup = true
//! template_package = "example-package"
//! noise = [".arch1-1"]
//!
//! [build]
//! jobs = 8
//! sign = true
//!
//! [network]
//! max_retries = 3
//! timeout_secs = 300
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::error::ConfigError;
use crate::infra::layout;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Version sync settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Network settings
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Database configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Database path, relative to the project root unless absolute
    pub path: Option<String>,
}

/// Version sync configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Back up the database before syncing
    pub backup: Option<bool>,

    /// Record skipped by sync; empty string disables skipping
    pub template_package: Option<String>,

    /// Substrings stripped from upstream version tokens
    pub noise: Option<Vec<String>>,
}

/// Build configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    /// Parallel make jobs passed to makepkg
    pub jobs: Option<usize>,

    /// Sign built packages
    pub sign: Option<bool>,
}

/// Network configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    /// Download retry attempts
    pub max_retries: Option<u32>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Load the configuration for a project root
    ///
    /// Prefers `<root>/alarmpkg.toml`, then the user config file.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let project_file = root.join(defaults::PROJECT_CONFIG_FILE);
        if project_file.exists() {
            return Self::load_from_path(&project_file);
        }

        match layout::global_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Configured database path resolved against `root`
    pub fn database_path(&self, root: &Path) -> Option<PathBuf> {
        self.database.path.as_deref().map(|p| root.join(p))
    }

    /// Whether to back up the database before syncing
    #[must_use]
    pub fn backup_enabled(&self) -> bool {
        self.sync.backup.unwrap_or(true)
    }

    /// Record skipped by sync
    #[must_use]
    pub fn template_package(&self) -> Option<String> {
        match self.sync.template_package.as_deref() {
            Some("") => None,
            Some(name) => Some(name.to_string()),
            None => Some(defaults::TEMPLATE_PACKAGE.to_string()),
        }
    }

    /// Substrings stripped from upstream version tokens
    #[must_use]
    pub fn version_noise(&self) -> Vec<String> {
        self.sync.noise.clone().unwrap_or_else(|| {
            defaults::VERSION_NOISE
                .iter()
                .map(|s| (*s).to_string())
                .collect()
        })
    }

    /// Parallel make jobs
    #[must_use]
    pub fn build_jobs(&self) -> usize {
        self.build.jobs.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Whether to sign built packages
    #[must_use]
    pub fn sign_packages(&self) -> bool {
        self.build.sign.unwrap_or(defaults::SIGN_PACKAGES)
    }

    /// Download retry attempts
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.network
            .max_retries
            .unwrap_or(defaults::MAX_DOWNLOAD_RETRIES)
            .max(1)
    }

    /// Request timeout in seconds
    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.network
            .timeout_secs
            .unwrap_or(defaults::REQUEST_TIMEOUT_SECS)
    }
}
