//! Wiring of configuration into the library crates

use anyhow::{bail, Context, Result};
use shelfscan_auth::{DefaultOAuthClient, FileTokenStorage, HttpTokenEndpoint, OAuthClient, SystemClock};
use shelfscan_catalog::{BookStore, Catalog, LocalStore, RemoteStore, TieredStore};
use shelfscan_config::{Config, ConfigManager};
use shelfscan_core::AppError;
use shelfscan_lookup::LookupExecutor;
use std::path::PathBuf;

pub type AppCatalog = Catalog<Box<dyn BookStore>>;

pub struct AppContext {
    pub manager: ConfigManager,
    pub config: Config,
    pub offline: bool,
}

impl AppContext {
    pub fn load(config_dir: Option<PathBuf>, offline: bool) -> Result<Self> {
        let manager = match config_dir {
            Some(dir) => ConfigManager::with_directory(dir),
            None => ConfigManager::new(),
        }
        .context("Failed to locate configuration directory")?;

        let config = manager
            .load_with_env_overrides()
            .with_context(|| format!("Failed to load {}", manager.config_path().display()))?;

        Ok(Self {
            manager,
            config,
            offline,
        })
    }

    pub fn local_store_path(&self) -> PathBuf {
        self.manager.resolve(&self.config.app.local_store_path)
    }

    pub fn token_store_path(&self) -> PathBuf {
        self.manager.resolve(&self.config.app.token_store_path)
    }

    /// Local catalog, layered under the remote store when one is enabled
    pub fn open_catalog(&self) -> Result<AppCatalog> {
        let path = self.local_store_path();
        let local = LocalStore::open(&path)
            .map_err(AppError::from)
            .with_context(|| format!("Failed to open catalog {}", path.display()))?;

        let store: Box<dyn BookStore> = if self.config.storage.remote_enabled && !self.offline {
            match RemoteStore::from_config(&self.config.storage) {
                Ok(remote) => Box::new(TieredStore::new(remote, local)),
                Err(e) => {
                    log::warn!("Remote store disabled: {}", e);
                    Box::new(local)
                }
            }
        } else {
            Box::new(local)
        };

        Ok(Catalog::new(
            store,
            self.config.storage.default_location.clone(),
        ))
    }

    pub fn lookup_executor(&self) -> Result<LookupExecutor> {
        self.require_online("metadata lookup")?;
        Ok(LookupExecutor::from_config(&self.config.lookup))
    }

    /// OAuth client with any previously stored tokens loaded
    pub fn oauth_client(&self) -> Result<DefaultOAuthClient> {
        let endpoint = HttpTokenEndpoint::from_config(&self.config.auth)
            .map_err(AppError::from)
            .context("Failed to set up token endpoint")?;
        let mut client = OAuthClient::new(
            self.config.auth.clone(),
            FileTokenStorage::new(self.token_store_path()),
            SystemClock,
            endpoint,
        );
        client.load();
        Ok(client)
    }

    pub fn require_online(&self, what: &str) -> Result<()> {
        if self.offline {
            bail!("{} is not available with --offline", what);
        }
        Ok(())
    }
}
