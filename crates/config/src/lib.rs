//! ShelfScan Configuration System
//!
//! Every concern of the application owns one section of a single TOML file.
//! Sections implement `ConfigSection`, so adding a new one means adding a
//! field to [`Config`] and wiring it into `validate` and `merge`.
//!
//! # Architecture
//!
//! - **Trait-based**: each section validates and merges itself
//! - **Graceful degradation**: invalid values are reported on load, rejected on save
//! - **Atomic writes**: the config file is never left half-written
//! - **Environment overrides**: secrets can come from `SHELFSCAN_<SECTION>_<FIELD>`
//!
//! # Example
//!
//! ```rust,no_run
//! use shelfscan_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Lookup timeout: {}s", config.lookup.timeout_secs);
//! ```

mod error;
mod manager;
mod migration;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod auth_config;
mod lookup_config;
mod scanner_config;
mod storage_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use validation::{ConfigSection, Validator};

// Re-export config sections
pub use app_config::{AppConfig, LogLevel};
pub use auth_config::AuthConfig;
pub use lookup_config::LookupConfig;
pub use scanner_config::ScannerConfig;
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current config file format version for migrations
pub const CONFIG_VERSION: u32 = 2;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Metadata lookup endpoints
    pub lookup: LookupConfig,

    /// Catalog persistence
    pub storage: StorageConfig,

    /// OAuth client registration
    pub auth: AuthConfig,

    /// Cloud text recognition
    pub scanner: ScannerConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.lookup.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.storage.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.auth.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.scanner.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    ///
    /// Override chain: defaults < file < env vars < CLI args
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.lookup.merge(other.lookup);
        self.storage.merge(other.storage);
        self.auth.merge(other.auth);
        self.scanner.merge(other.scanner);
    }

    /// Resolves a configured path against the config directory
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve_path(config_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            config_dir.join(path)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            lookup: LookupConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            scanner: ScannerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_version_is_set() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        let mut override_config = Config::default();
        override_config.lookup.timeout_secs = 45;

        base.merge(override_config);
        assert_eq!(base.lookup.timeout_secs, 45);
    }

    #[test]
    fn test_errors_collected_across_sections() {
        let mut config = Config::default();
        config.lookup.timeout_secs = 0;
        config.scanner.max_results = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_resolve_path() {
        let dir = Path::new("/home/user/.config/shelfscan");
        assert_eq!(
            Config::resolve_path(dir, Path::new("books.json")),
            dir.join("books.json")
        );
        assert_eq!(
            Config::resolve_path(dir, Path::new("/tmp/books.json")),
            PathBuf::from("/tmp/books.json")
        );
    }
}
