//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "SHELFSCAN";

/// Main configuration manager
///
/// Owns the config directory and everything stored relative to it.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/shelfscan/`
    /// - macOS: `~/Library/Application Support/shelfscan/`
    /// - Windows: `%APPDATA%\shelfscan\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let config_path = config_dir.join("config.toml");
        let persistence = ConfigPersistence::new(config_path);

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "shelfscan")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Resolves a configured path against the config directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        Config::resolve_path(&self.config_dir, path)
    }

    /// Loads the configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file is corrupted, returns an error.
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Saves the configuration to file
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads, applies `update_fn`, and saves atomically
    ///
    /// ```rust,no_run
    /// # use shelfscan_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.storage.default_location = "Study".to_string();
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Generates a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.persistence.generate_default()?;
        Ok(true)
    }

    /// Overwrites the config file with default values
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Validates the current configuration file
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config file, then applies environment overrides
    ///
    /// Variables follow `SHELFSCAN_<SECTION>_<FIELD>`, for example
    /// `SHELFSCAN_AUTH_CLIENT_SECRET`. Only secrets, endpoints and the log
    /// level can be overridden.
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

/// Applies overrides looked up through `var`
pub(crate) fn apply_env_overrides<F>(config: &mut Config, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |section: &str, field: &str| {
        let key = format!("{}_{}_{}", ENV_PREFIX, section, field);
        var(&key).filter(|v| !v.trim().is_empty())
    };

    if let Some(level) = lookup("APP", "LOG_LEVEL") {
        match level.parse::<LogLevel>() {
            Ok(level) => config.app.log_level = level,
            Err(e) => log::warn!("Ignoring {}_APP_LOG_LEVEL: {}", ENV_PREFIX, e),
        }
    }

    if let Some(key) = lookup("LOOKUP", "GOOGLE_BOOKS_API_KEY") {
        config.lookup.google_books_api_key = key;
    }

    if let Some(url) = lookup("STORAGE", "DATABASE_URL") {
        config.storage.database_url = url;
    }

    if let Some(token) = lookup("STORAGE", "AUTH_TOKEN") {
        config.storage.auth_token = token;
    }

    if let Some(owner) = lookup("STORAGE", "OWNER_ID") {
        config.storage.owner_id = owner;
    }

    if let Some(id) = lookup("AUTH", "CLIENT_ID") {
        config.auth.client_id = id;
    }

    if let Some(secret) = lookup("AUTH", "CLIENT_SECRET") {
        config.auth.client_secret = secret;
    }

    if let Some(endpoint) = lookup("SCANNER", "VISION_ENDPOINT") {
        config.scanner.vision_endpoint = endpoint;
    }
}
