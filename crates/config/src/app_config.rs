//! Application-level configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log level for application logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter to install in the logger
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ValidationError::with_value(
                "app.log_level",
                "must be one of: error, warn, info, debug, trace",
                other,
            )),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Log level for application output
    pub log_level: LogLevel,

    /// Local catalog file (relative to config dir if not absolute)
    pub local_store_path: PathBuf,

    /// OAuth token file (relative to config dir if not absolute)
    pub token_store_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            local_store_path: PathBuf::from("books.json"),
            token_store_path: PathBuf::from("tokens.json"),
        }
    }
}

impl ConfigSection for AppConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = Vec::new();

        if self.local_store_path.as_os_str().is_empty() {
            results.push(Err(ValidationError::new(
                "app.local_store_path",
                "must not be empty",
            )));
        }

        if self.token_store_path.as_os_str().is_empty() {
            results.push(Err(ValidationError::new(
                "app.token_store_path",
                "must not be empty",
            )));
        }

        if !self.local_store_path.as_os_str().is_empty()
            && self.local_store_path == self.token_store_path
        {
            results.push(Err(ValidationError::with_value(
                "app.token_store_path",
                "must differ from app.local_store_path",
                self.token_store_path.display(),
            )));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.log_level = other.log_level;
        self.local_store_path = other.local_store_path;
        self.token_store_path = other.token_store_path;
    }

    fn section_name(&self) -> &'static str {
        "app"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_store_path() {
        let mut config = AppConfig::default();
        config.local_store_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_paths_must_differ() {
        let mut config = AppConfig::default();
        config.token_store_path = config.local_store_path.clone();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors[0].field, "app.token_store_path");
    }

    #[test]
    fn test_merge() {
        let mut base = AppConfig::default();
        let mut other = AppConfig::default();
        other.log_level = LogLevel::Debug;
        other.local_store_path = PathBuf::from("/data/shelf.json");

        base.merge(other);
        assert_eq!(base.log_level, LogLevel::Debug);
        assert_eq!(base.local_store_path, PathBuf::from("/data/shelf.json"));
    }

    #[test]
    fn test_log_level_parse_and_display() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Error.to_string(), "error");
        assert_eq!(LogLevel::Info.as_filter(), log::LevelFilter::Info);
    }
}
