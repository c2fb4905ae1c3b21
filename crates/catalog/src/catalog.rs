//! The book collection

use crate::query::matches_search;
use crate::{BookQuery, BookStore, CatalogError, CatalogResult, ImportEntry, StoreStatus};
use crossbeam_channel::{unbounded, Receiver, Sender};
use shelfscan_core::{BookId, BookRecord, CatalogBook, Validator};
use std::collections::BTreeSet;

/// Change notification sent after a mutation has been stored
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    Added(CatalogBook),
    Updated(CatalogBook),
    Deleted(BookId),
}

pub struct Catalog<S> {
    store: S,
    default_location: String,
    subscribers: Vec<Sender<CatalogEvent>>,
}

impl<S: BookStore> Catalog<S> {
    pub fn new(store: S, default_location: impl Into<String>) -> Self {
        Self {
            store,
            default_location: default_location.into(),
            subscribers: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn status(&self) -> StoreStatus {
        self.store.status()
    }

    pub fn reconnect(&mut self) -> CatalogResult<usize> {
        self.store.reconnect()
    }

    /// Receives every event emitted after this call
    pub fn subscribe(&mut self) -> Receiver<CatalogEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Catalogs `record` at `location`.
    ///
    /// A blank location means the default location.
    pub fn add_book(&mut self, record: BookRecord, location: &str) -> CatalogResult<CatalogBook> {
        let book = CatalogBook::new(record, self.location_or_default(Some(location)));
        book.validate().map_err(CatalogError::Invalid)?;

        self.store.create(&book)?;
        log::info!("Added \"{}\" at {}", book.title(), book.location);
        self.emit(CatalogEvent::Added(book.clone()));
        Ok(book)
    }

    /// Applies `edit` to a stored book and stamps `updated_at`.
    ///
    /// The id and creation time cannot be changed by the edit.
    pub fn update_book<F>(&mut self, id: &BookId, edit: F) -> CatalogResult<CatalogBook>
    where
        F: FnOnce(&mut CatalogBook),
    {
        let original = self.require(id)?;
        let mut book = original.clone();
        edit(&mut book);
        book.id = original.id;
        book.added_at = original.added_at;
        book.touch();
        book.validate().map_err(CatalogError::Invalid)?;

        self.store.update(&book)?;
        log::info!("Updated \"{}\"", book.title());
        self.emit(CatalogEvent::Updated(book.clone()));
        Ok(book)
    }

    pub fn delete_book(&mut self, id: &BookId) -> CatalogResult<CatalogBook> {
        let book = self.require(id)?;
        self.store.delete(id)?;
        log::info!("Deleted \"{}\"", book.title());
        self.emit(CatalogEvent::Deleted(*id));
        Ok(book)
    }

    pub fn get_book(&mut self, id: &BookId) -> CatalogResult<Option<CatalogBook>> {
        self.store.get(id)
    }

    /// Every book in store order
    pub fn books(&mut self) -> CatalogResult<Vec<CatalogBook>> {
        self.store.list()
    }

    /// Case-insensitive match on title, author or ISBN; blank matches all
    pub fn search(&mut self, text: &str) -> CatalogResult<Vec<CatalogBook>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|b| matches_search(b, Some(text)))
            .collect())
    }

    pub fn query(&mut self, query: &BookQuery) -> CatalogResult<Vec<CatalogBook>> {
        Ok(query.apply(self.store.list()?))
    }

    /// Distinct non-blank locations, sorted
    pub fn locations(&mut self) -> CatalogResult<Vec<String>> {
        let locations: BTreeSet<String> = self
            .store
            .list()?
            .into_iter()
            .map(|b| b.location.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Ok(locations.into_iter().collect())
    }

    /// Distinct categories across all books, sorted
    pub fn categories(&mut self) -> CatalogResult<Vec<String>> {
        let categories: BTreeSet<String> = self
            .store
            .list()?
            .iter()
            .flat_map(|b| b.record.categories())
            .collect();
        Ok(categories.into_iter().collect())
    }

    /// Adds imported entries as new books.
    ///
    /// Every entry is validated before anything is stored, so a bad entry
    /// leaves the catalog unchanged.
    pub fn import_entries(&mut self, entries: Vec<ImportEntry>) -> CatalogResult<Vec<CatalogBook>> {
        let books = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let location = self.location_or_default(entry.location.as_deref());
                let book = CatalogBook::new(entry.record, location);
                book.validate().map_err(|errors| {
                    CatalogError::Import(format!("entry {}: {}", index + 1, errors.join("; ")))
                })?;
                Ok(book)
            })
            .collect::<CatalogResult<Vec<_>>>()?;

        for book in &books {
            self.store.create(book)?;
            self.emit(CatalogEvent::Added(book.clone()));
        }
        log::info!("Imported {} book(s)", books.len());
        Ok(books)
    }

    fn require(&mut self, id: &BookId) -> CatalogResult<CatalogBook> {
        self.store.get(id)?.ok_or(CatalogError::NotFound(*id))
    }

    fn location_or_default(&self, location: Option<&str>) -> String {
        match location.map(str::trim) {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => self.default_location.clone(),
        }
    }

    fn emit(&mut self, event: CatalogEvent) {
        // Drop subscribers whose receiver is gone
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
