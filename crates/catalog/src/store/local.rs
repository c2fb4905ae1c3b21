use crate::{BookStore, CatalogError, CatalogResult, MemoryStore};
use shelfscan_core::{BookId, CatalogBook};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON array of books in a single file.
///
/// The file is read once on open and rewritten atomically after every change.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    books: MemoryStore,
}

impl LocalStore {
    /// Opens the store; a missing or empty file is an empty catalog
    pub fn open(path: impl Into<PathBuf>) -> CatalogResult<Self> {
        let path = path.into();
        let books = Self::read(&path)?;
        log::debug!("Opened {} with {} book(s)", path.display(), books.len());

        Ok(Self {
            path,
            books: MemoryStore::with_books(books),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> CatalogResult<Vec<CatalogBook>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|e| CatalogError::Corrupted {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn persist(&self) -> CatalogResult<()> {
        let io_error = |source: std::io::Error| CatalogError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(io_error)?;

        let json = serde_json::to_string_pretty(self.books.books())?;

        let mut temp_file = NamedTempFile::new_in(&dir).map_err(io_error)?;
        temp_file.write_all(json.as_bytes()).map_err(io_error)?;
        temp_file.flush().map_err(io_error)?;
        temp_file
            .persist(&self.path)
            .map_err(|e| io_error(e.error))?;

        Ok(())
    }
}

impl BookStore for LocalStore {
    fn list(&mut self) -> CatalogResult<Vec<CatalogBook>> {
        self.books.list()
    }

    fn get(&mut self, id: &BookId) -> CatalogResult<Option<CatalogBook>> {
        self.books.get(id)
    }

    fn create(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        self.books.create(book)?;
        self.persist()
    }

    fn update(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        self.books.update(book)?;
        self.persist()
    }

    fn delete(&mut self, id: &BookId) -> CatalogResult<()> {
        self.books.delete(id)?;
        self.persist()
    }

    fn replace_all(&mut self, books: &[CatalogBook]) -> CatalogResult<()> {
        self.books.replace_all(books)?;
        self.persist()
    }
}
