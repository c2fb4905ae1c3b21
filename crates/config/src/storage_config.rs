//! Catalog storage configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Where the catalog lives
///
/// The local file is always used; the remote realtime database is layered on
/// top of it when `remote_enabled` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Use the remote database as the primary store
    pub remote_enabled: bool,

    /// Realtime database root, e.g. `https://<project>.firebaseio.com`
    pub database_url: String,

    /// Key under `users/` that owns the books
    pub owner_id: String,

    /// Database auth token passed as the `auth` query parameter
    pub auth_token: String,

    /// Location given to imported books that carry none
    pub default_location: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            remote_enabled: false,
            database_url: String::new(),
            owner_id: String::new(),
            auth_token: String::new(),
            default_location: "Unsorted".to_string(),
        }
    }
}

impl ConfigSection for StorageConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::optional_http_url(&self.database_url, "storage.database_url"),
            Validator::not_empty(&self.default_location, "storage.default_location"),
        ];

        if self.remote_enabled {
            results.push(Validator::not_empty(
                &self.database_url,
                "storage.database_url",
            ));
            results.push(Validator::not_empty(&self.owner_id, "storage.owner_id"));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.remote_enabled = other.remote_enabled;
        self.database_url = other.database_url;
        self.owner_id = other.owner_id;
        self.auth_token = other.auth_token;
        self.default_location = other.default_location;
    }

    fn section_name(&self) -> &'static str {
        "storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(StorageConfig::default().validate().is_ok());
    }

    #[test]
    fn test_remote_requires_url_and_owner() {
        let mut config = StorageConfig::default();
        config.remote_enabled = true;
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);

        config.database_url = "https://shelf-1234.firebaseio.com".to_string();
        config.owner_id = "uid-42".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_location_required() {
        let mut config = StorageConfig::default();
        config.default_location = " ".to_string();
        assert!(config.validate().is_err());
    }
}
