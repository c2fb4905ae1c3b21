//! Domain types for ShelfScan
//!
//! - `book`: book metadata records and cataloged books
//! - `common`: shared traits

mod book;
mod common;

pub use book::{BookId, BookRecord, CatalogBook};
pub use common::Validator;
