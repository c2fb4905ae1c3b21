//! Storage backends

mod local;
mod memory;
mod remote;
mod tiered;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use remote::{parse_books_snapshot, RemoteStore};
pub use tiered::TieredStore;

use crate::CatalogResult;
use shelfscan_core::{BookId, CatalogBook};
use std::fmt;

/// Health of a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    Online,
    /// Serving from a local fallback because the primary failed
    Degraded { reason: String },
}

impl StoreStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Degraded { reason } => write!(f, "degraded ({})", reason),
        }
    }
}

/// Persistence for catalog books, keyed by [`BookId`].
///
/// Every method takes `&mut self` so a store may change state on any call,
/// e.g. falling back to a cache after a failed read.
pub trait BookStore: Send {
    fn list(&mut self) -> CatalogResult<Vec<CatalogBook>>;

    fn get(&mut self, id: &BookId) -> CatalogResult<Option<CatalogBook>>;

    fn create(&mut self, book: &CatalogBook) -> CatalogResult<()>;

    /// Replaces a stored book with the same id
    fn update(&mut self, book: &CatalogBook) -> CatalogResult<()>;

    fn delete(&mut self, id: &BookId) -> CatalogResult<()>;

    /// Replaces the whole collection
    fn replace_all(&mut self, books: &[CatalogBook]) -> CatalogResult<()>;

    fn status(&self) -> StoreStatus {
        StoreStatus::Online
    }

    /// Tries to leave a degraded state; returns how many books were
    /// re-synchronized
    fn reconnect(&mut self) -> CatalogResult<usize> {
        Ok(0)
    }
}

impl<S: BookStore + ?Sized> BookStore for Box<S> {
    fn list(&mut self) -> CatalogResult<Vec<CatalogBook>> {
        (**self).list()
    }

    fn get(&mut self, id: &BookId) -> CatalogResult<Option<CatalogBook>> {
        (**self).get(id)
    }

    fn create(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        (**self).create(book)
    }

    fn update(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        (**self).update(book)
    }

    fn delete(&mut self, id: &BookId) -> CatalogResult<()> {
        (**self).delete(id)
    }

    fn replace_all(&mut self, books: &[CatalogBook]) -> CatalogResult<()> {
        (**self).replace_all(books)
    }

    fn status(&self) -> StoreStatus {
        (**self).status()
    }

    fn reconnect(&mut self) -> CatalogResult<usize> {
        (**self).reconnect()
    }
}
