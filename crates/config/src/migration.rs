//! Configuration migration system
//!
//! Migrations operate on the raw TOML tree before it is deserialized, so keys
//! that no longer exist in [`Config`](crate::Config) can still be carried over.
//! When CONFIG_VERSION is incremented, add a migration here.

use crate::{ConfigError, ConfigResult, CONFIG_VERSION};
use toml::Value;

/// Version assumed for files written before the `version` key existed
const UNVERSIONED: u32 = 1;

/// A single upgrade step
pub trait Migration {
    /// Returns the version this migration upgrades TO
    fn target_version(&self) -> u32;

    /// Performs the migration in place
    fn migrate(&self, value: &mut Value) -> ConfigResult<()>;
}

/// Reads the `version` key of a raw config tree
pub fn file_version(value: &Value) -> u32 {
    value
        .get("version")
        .and_then(Value::as_integer)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(UNVERSIONED)
}

/// Upgrades a raw config tree to `CONFIG_VERSION`
///
/// Newer versions are returned untouched with a warning.
pub fn migrate_to_latest(mut value: Value) -> ConfigResult<Value> {
    let version = file_version(&value);

    if version == CONFIG_VERSION {
        return Ok(value);
    }

    if version > CONFIG_VERSION {
        log::warn!(
            "Config version {} is newer than supported version {}. Attempting to use as-is.",
            version,
            CONFIG_VERSION
        );
        return Ok(value);
    }

    log::info!(
        "Migrating config from version {} to {}",
        version,
        CONFIG_VERSION
    );

    for next_version in (version + 1)..=CONFIG_VERSION {
        match get_migration(next_version) {
            Some(migration) => {
                migration.migrate(&mut value)?;
                log::info!("Applied migration to version {}", migration.target_version());
            }
            None => log::warn!(
                "No migration defined for version {}, skipping",
                next_version
            ),
        }
    }

    let table = value.as_table_mut().ok_or(ConfigError::MigrationError {
        version: CONFIG_VERSION,
        reason: "config root is not a table".to_string(),
    })?;
    table.insert(
        "version".to_string(),
        Value::Integer(i64::from(CONFIG_VERSION)),
    );

    Ok(value)
}

/// Returns the migration for a specific version, if one exists
fn get_migration(version: u32) -> Option<Box<dyn Migration>> {
    match version {
        2 => Some(Box::new(MigrationV2)),
        _ => None,
    }
}

/// Version 2 renamed the Firebase-specific storage keys
struct MigrationV2;

impl Migration for MigrationV2 {
    fn target_version(&self) -> u32 {
        2
    }

    fn migrate(&self, value: &mut Value) -> ConfigResult<()> {
        let Some(storage) = value.get_mut("storage") else {
            return Ok(());
        };

        let storage = storage
            .as_table_mut()
            .ok_or_else(|| ConfigError::MigrationError {
                version: self.target_version(),
                reason: "[storage] is not a table".to_string(),
            })?;

        for (old, new) in [("firebase_url", "database_url"), ("user_id", "owner_id")] {
            if let Some(old_value) = storage.remove(old) {
                storage.entry(new.to_string()).or_insert(old_value);
            }
        }

        Ok(())
    }
}
