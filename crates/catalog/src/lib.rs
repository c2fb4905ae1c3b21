//! ShelfScan catalog
//!
//! [`Catalog`] is the book collection users work with. It sits on any
//! [`BookStore`]:
//! - [`MemoryStore`] keeps books in process
//! - [`LocalStore`] keeps a JSON file on disk
//! - [`RemoteStore`] talks to a realtime database over REST
//! - [`TieredStore`] layers a remote store over a local cache and reports
//!   when it has fallen back to the cache
//!
//! Changes are broadcast to subscribers as [`CatalogEvent`]s.

mod catalog;
mod error;
pub mod export;
mod format;
pub mod import;
mod query;
pub mod store;

pub use catalog::{Catalog, CatalogEvent};
pub use error::{CatalogError, CatalogResult};
pub use format::DataFormat;
pub use import::ImportEntry;
pub use query::{BookQuery, SortOrder};
pub use store::{BookStore, LocalStore, MemoryStore, RemoteStore, StoreStatus, TieredStore};
