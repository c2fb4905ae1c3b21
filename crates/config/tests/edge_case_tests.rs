//! Edge case and error scenario tests

use std::fs;
use shelfscan_config::{Config, ConfigError, ConfigManager};
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_corrupted_config_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "this is not valid TOML {{{")?;

    assert!(manager.load().is_err());
    assert_eq!(manager.load_or_default(), Config::default());
    Ok(())
}

#[test]
fn test_whitespace_file_is_corrupted() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "\n\n   \t\n")?;

    let err = manager.load().unwrap_err();
    assert!(err.is_corruption());
    Ok(())
}

#[test]
fn test_wrong_type_is_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "[lookup]\ntimeout_secs = \"ten\"\n")?;

    assert!(matches!(manager.load(), Err(ConfigError::ParseError { .. })));
    Ok(())
}

#[test]
fn test_save_creates_parent_directories() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let nested_path = temp_dir.path().join("a").join("b").join("c");
    let manager = ConfigManager::with_directory(nested_path)?;

    manager.save(&Config::default())?;
    assert!(manager.config_path().exists());
    Ok(())
}

#[test]
fn test_unknown_keys_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(
        manager.config_path(),
        "version = 2\nfuture_flag = true\n[player]\nvolume = 3\n",
    )?;

    assert_eq!(manager.load()?, Config::default());
    Ok(())
}

#[test]
fn test_newer_version_loads_as_is() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "version = 99\n")?;

    let config = manager.load()?;
    assert_eq!(config.version, 99);
    Ok(())
}

#[test]
fn test_unicode_location_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.update(|c| c.storage.default_location = "書斎の本棚".to_string())?;

    assert_eq!(manager.load()?.storage.default_location, "書斎の本棚");
    Ok(())
}
