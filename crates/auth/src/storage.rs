//! Token persistence

use crate::{AuthError, AuthResult, TokenSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Where tokens live between runs
pub trait TokenStorage: Send + Sync {
    /// Reads stored tokens; `Ok(None)` when nothing is stored
    fn load(&self) -> AuthResult<Option<TokenSet>>;

    fn save(&self, tokens: &TokenSet) -> AuthResult<()>;

    fn clear(&self) -> AuthResult<()>;
}

impl<T: TokenStorage + ?Sized> TokenStorage for std::sync::Arc<T> {
    fn load(&self) -> AuthResult<Option<TokenSet>> {
        (**self).load()
    }

    fn save(&self, tokens: &TokenSet) -> AuthResult<()> {
        (**self).save(tokens)
    }

    fn clear(&self) -> AuthResult<()> {
        (**self).clear()
    }
}

/// JSON file, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> AuthError {
        AuthError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> AuthResult<Option<TokenSet>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| AuthError::Corrupted {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    fn save(&self, tokens: &TokenSet) -> AuthResult<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let json = serde_json::to_string_pretty(tokens).map_err(|e| AuthError::Corrupted {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let mut temp_file = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        temp_file
            .write_all(json.as_bytes())
            .map_err(|e| self.io_error(e))?;
        temp_file.flush().map_err(|e| self.io_error(e))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        log::debug!("Saved tokens to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    tokens: Mutex<Option<TokenSet>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenSet) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }

    /// Current contents, for inspection
    pub fn snapshot(&self) -> Option<TokenSet> {
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> AuthResult<Option<TokenSet>> {
        Ok(self.snapshot())
    }

    fn save(&self, tokens: &TokenSet) -> AuthResult<()> {
        *self.tokens.lock().unwrap_or_else(|e| e.into_inner()) = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        *self.tokens.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn tokens() -> TokenSet {
        TokenSet {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileTokenStorage::new(dir.path().join("tokens.json"));

        assert_eq!(storage.load().unwrap(), None);
        storage.save(&tokens()).expect("Should save");
        assert_eq!(storage.load().unwrap(), Some(tokens()));
    }

    #[test]
    fn test_file_clear_is_idempotent() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileTokenStorage::new(dir.path().join("tokens.json"));

        storage.save(&tokens()).expect("Should save");
        storage.clear().expect("Should clear");
        storage.clear().expect("Should clear twice");
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_corrupted_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{not json").unwrap();

        let err = FileTokenStorage::new(path).load().unwrap_err();
        assert!(matches!(err, AuthError::Corrupted { .. }));
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileTokenStorage::new(dir.path().join("nested").join("tokens.json"));
        storage.save(&tokens()).expect("Should save");
        assert!(storage.path().exists());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryTokenStorage::new();
        assert_eq!(storage.load().unwrap(), None);
        storage.save(&tokens()).unwrap();
        assert!(storage.snapshot().is_some());
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }
}
