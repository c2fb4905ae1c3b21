use crate::{BookStore, CatalogError, CatalogResult, StoreStatus};
use shelfscan_core::{BookId, CatalogBook};

/// Remote primary with a local cache.
///
/// While online every read and write goes to the remote store and is
/// mirrored into the cache. The first remote failure switches the store to
/// [`StoreStatus::Degraded`]; from then on the cache serves everything until
/// [`reconnect`](BookStore::reconnect) succeeds.
///
/// Reconnecting uploads every cached book, so changes made while degraded
/// reach the remote store at least once. Deletions made while degraded are
/// not replayed.
pub struct TieredStore<R, L> {
    remote: R,
    local: L,
    status: StoreStatus,
}

impl<R: BookStore, L: BookStore> TieredStore<R, L> {
    pub fn new(remote: R, local: L) -> Self {
        Self {
            remote,
            local,
            status: StoreStatus::Online,
        }
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    fn degrade(&mut self, err: &CatalogError) {
        if self.status.is_online() {
            log::warn!("Remote store failed, using local catalog: {}", err);
        }
        self.status = StoreStatus::Degraded {
            reason: err.to_string(),
        };
    }

    /// Runs `op` against the remote store while online.
    ///
    /// Returns `None` when degraded, including when this call caused it.
    fn try_remote<T>(
        &mut self,
        op: impl FnOnce(&mut R) -> CatalogResult<T>,
    ) -> CatalogResult<Option<T>> {
        if !self.status.is_online() {
            return Ok(None);
        }

        match op(&mut self.remote) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_remote_failure() => {
                self.degrade(&e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl<R: BookStore, L: BookStore> BookStore for TieredStore<R, L> {
    fn list(&mut self) -> CatalogResult<Vec<CatalogBook>> {
        match self.try_remote(|r| r.list())? {
            Some(books) => {
                self.local.replace_all(&books)?;
                Ok(books)
            }
            None => self.local.list(),
        }
    }

    fn get(&mut self, id: &BookId) -> CatalogResult<Option<CatalogBook>> {
        match self.try_remote(|r| r.get(id))? {
            Some(book) => Ok(book),
            None => self.local.get(id),
        }
    }

    fn create(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        self.try_remote(|r| r.create(book))?;
        self.local.create(book)
    }

    fn update(&mut self, book: &CatalogBook) -> CatalogResult<()> {
        self.try_remote(|r| r.update(book))?;
        // The cache may not hold a book that only the remote listed so far
        match self.local.update(book) {
            Err(CatalogError::NotFound(_)) => self.local.create(book),
            other => other,
        }
    }

    fn delete(&mut self, id: &BookId) -> CatalogResult<()> {
        let deleted_remotely = self.try_remote(|r| r.delete(id))?.is_some();
        match self.local.delete(id) {
            Err(CatalogError::NotFound(_)) if deleted_remotely => Ok(()),
            other => other,
        }
    }

    fn replace_all(&mut self, books: &[CatalogBook]) -> CatalogResult<()> {
        self.try_remote(|r| r.replace_all(books))?;
        self.local.replace_all(books)
    }

    fn status(&self) -> StoreStatus {
        self.status.clone()
    }

    fn reconnect(&mut self) -> CatalogResult<usize> {
        let cached = self.local.list()?;

        let outcome = self.remote.list().and_then(|_| {
            for book in &cached {
                self.remote.create(book)?;
            }
            self.remote.list()
        });

        match outcome {
            Ok(books) => {
                self.local.replace_all(&books)?;
                self.status = StoreStatus::Online;
                log::info!(
                    "Remote store back online; uploaded {} cached book(s)",
                    cached.len()
                );
                Ok(cached.len())
            }
            Err(e) => {
                if e.is_remote_failure() {
                    self.degrade(&e);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use shelfscan_core::BookRecord;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Memory store whose availability can be switched off
    struct Flaky {
        inner: MemoryStore,
        down: Arc<AtomicBool>,
    }

    impl Flaky {
        fn check(&self) -> CatalogResult<()> {
            if self.down.load(Ordering::SeqCst) {
                Err(CatalogError::Remote("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl BookStore for Flaky {
        fn list(&mut self) -> CatalogResult<Vec<CatalogBook>> {
            self.check()?;
            self.inner.list()
        }

        fn get(&mut self, id: &BookId) -> CatalogResult<Option<CatalogBook>> {
            self.check()?;
            self.inner.get(id)
        }

        fn create(&mut self, book: &CatalogBook) -> CatalogResult<()> {
            self.check()?;
            self.inner.create(book)
        }

        fn update(&mut self, book: &CatalogBook) -> CatalogResult<()> {
            self.check()?;
            self.inner.create(book)
        }

        fn delete(&mut self, id: &BookId) -> CatalogResult<()> {
            self.check()?;
            self.inner.delete(id)
        }

        fn replace_all(&mut self, books: &[CatalogBook]) -> CatalogResult<()> {
            self.check()?;
            self.inner.replace_all(books)
        }
    }

    fn tiered() -> (TieredStore<Flaky, MemoryStore>, Arc<AtomicBool>) {
        let down = Arc::new(AtomicBool::new(false));
        let remote = Flaky {
            inner: MemoryStore::new(),
            down: Arc::clone(&down),
        };
        (TieredStore::new(remote, MemoryStore::new()), down)
    }

    fn book(title: &str) -> CatalogBook {
        CatalogBook::new(BookRecord::titled(title), "Shelf")
    }

    #[test]
    fn test_online_writes_are_mirrored() {
        let (mut store, _) = tiered();
        let b = book("草枕");
        store.create(&b).unwrap();

        assert_eq!(store.remote().inner.len(), 1);
        assert_eq!(store.local().len(), 1);
        assert_eq!(store.status(), StoreStatus::Online);
    }

    #[test]
    fn test_remote_failure_degrades_and_serves_cache() {
        let (mut store, down) = tiered();
        let first = book("三四郎");
        store.create(&first).unwrap();

        down.store(true, Ordering::SeqCst);
        let second = book("それから");
        store.create(&second).unwrap();

        assert!(matches!(store.status(), StoreStatus::Degraded { .. }));
        assert_eq!(store.list().unwrap().len(), 2);
        assert_eq!(store.remote().inner.len(), 1);
    }

    #[test]
    fn test_stays_degraded_until_reconnect() {
        let (mut store, down) = tiered();
        down.store(true, Ordering::SeqCst);
        store.list().unwrap();
        down.store(false, Ordering::SeqCst);

        // Remote is reachable again but nothing is sent until reconnect
        store.create(&book("門")).unwrap();
        assert_eq!(store.remote().inner.len(), 0);
        assert!(!store.status().is_online());
    }

    #[test]
    fn test_reconnect_uploads_cache() {
        let (mut store, down) = tiered();
        down.store(true, Ordering::SeqCst);
        store.create(&book("行人")).unwrap();
        store.create(&book("こころ")).unwrap();

        assert!(store.reconnect().is_err());
        assert!(!store.status().is_online());

        down.store(false, Ordering::SeqCst);
        assert_eq!(store.reconnect().unwrap(), 2);
        assert_eq!(store.status(), StoreStatus::Online);
        assert_eq!(store.remote().inner.len(), 2);
    }

    #[test]
    fn test_online_list_refreshes_cache() {
        let (mut store, _) = tiered();
        store
            .remote
            .inner
            .create(&book("明暗"))
            .unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.local().len(), 1);
    }

    #[test]
    fn test_non_remote_errors_do_not_degrade() {
        let (mut store, _) = tiered();
        let missing = BookId::new();
        assert!(matches!(
            store.remote.delete(&missing),
            Err(CatalogError::NotFound(_))
        ));
        assert!(store.delete(&missing).is_err());
        assert_eq!(store.status(), StoreStatus::Online);
    }
}
