use crate::{BookStore, CatalogError, CatalogResult};
use shelfscan_core::{BookId, CatalogBook};

/// Books held in insertion order, in process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    books: Vec<CatalogBook>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: Vec<CatalogBook>) -> Self {
        Self { books }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub(crate) fn books(&self) -> &[CatalogBook] {
        &self.books
    }

    fn position(&self, id: &BookId) -> Option<usize> {
        self.books.iter().position(|b| b.id == *id)
    }
}

impl BookStore for MemoryStore {
    fn list(&mut self) -> CatalogResult<Vec<CatalogBook>> {
        Ok(self.books.clone())
    }

    fn get(&mut self, id: &BookId) -> CatalogResult<Option<CatalogBook>> {
        Ok(self.position(id).map(|i| self.books[i].clone()))
    }

    /// Inserting an id that already exists replaces that book
    fn create(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        match self.position(&book.id) {
            Some(i) => self.books[i] = book.clone(),
            None => self.books.push(book.clone()),
        }
        Ok(())
    }

    fn update(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        let i = self
            .position(&book.id)
            .ok_or(CatalogError::NotFound(book.id))?;
        self.books[i] = book.clone();
        Ok(())
    }

    fn delete(&mut self, id: &BookId) -> CatalogResult<()> {
        let i = self.position(id).ok_or(CatalogError::NotFound(*id))?;
        self.books.remove(i);
        Ok(())
    }

    fn replace_all(&mut self, books: &[CatalogBook]) -> CatalogResult<()> {
        self.books = books.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_core::BookRecord;

    #[test]
    fn test_crud() {
        let mut store = MemoryStore::new();
        let mut book = CatalogBook::new(BookRecord::titled("こころ"), "Shelf A");

        store.create(&book).unwrap();
        assert_eq!(store.len(), 1);

        book.location = "Shelf B".to_string();
        store.update(&book).unwrap();
        assert_eq!(store.get(&book.id).unwrap().unwrap().location, "Shelf B");

        store.delete(&book.id).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.delete(&book.id),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_missing_book() {
        let mut store = MemoryStore::new();
        let book = CatalogBook::new(BookRecord::titled("x"), "A");
        assert!(matches!(store.update(&book), Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_create_same_id_replaces() {
        let mut store = MemoryStore::new();
        let mut book = CatalogBook::new(BookRecord::titled("x"), "A");
        store.create(&book).unwrap();
        book.location = "B".to_string();
        store.create(&book).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.books()[0].location, "B");
    }
}
