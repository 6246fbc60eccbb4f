// FILE: crates/library/src/store.rs
//! Ordered list of scanned books
//!
//! The list is kept in recency order: index 0 is the book most recently
//! added or touched. Mutations are synchronous and commit atomically; each
//! committed change is published to subscribers and handed to a background
//! writer that persists the newest snapshot. Callers never wait for storage.

use crate::error::{LibraryError, LibraryResult};
use lepkehalo_core::{decode_books, encode_books, AppError, Book};
use lepkehalo_storage::{KeyValueStore, BOOKS_STORAGE_KEY};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Observable state of the book list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookListState {
    /// Books, most recent first
    pub books: Vec<Book>,
    /// True while the persisted list is being read
    pub is_loading: bool,
}

/// A book taken out of the list, with the position it held
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedBook {
    pub book: Book,
    pub index: usize,
}

/// List contents queued for the writer, numbered in commit order
#[derive(Debug, Clone, Default)]
struct Snapshot {
    seq: u64,
    books: Arc<Vec<Book>>,
}

struct Inner {
    state: watch::Sender<BookListState>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
    pending: watch::Sender<Snapshot>,
    written: watch::Receiver<u64>,
    hydration: Mutex<Option<watch::Receiver<bool>>>,
}

/// Handle to the book list
///
/// Clones share the same list. The writer task stops once the last clone
/// is dropped, after writing whatever is still queued.
#[derive(Clone)]
pub struct BookListStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for BookListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("BookListStore")
            .field("key", &self.inner.key)
            .field("len", &state.books.len())
            .field("is_loading", &state.is_loading)
            .finish()
    }
}

impl BookListStore {
    /// Creates an empty store persisting under [`BOOKS_STORAGE_KEY`]
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> LibraryResult<Self> {
        Self::with_key(storage, BOOKS_STORAGE_KEY)
    }

    /// Creates an empty store persisting under a custom key
    pub fn with_key(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> LibraryResult<Self> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| LibraryError::NoRuntime)?;
        let key = key.into();

        let (state, _) = watch::channel(BookListState::default());
        let (pending, queued) = watch::channel(Snapshot::default());
        let (written_tx, written) = watch::channel(0);

        runtime.spawn(run_writer(
            queued,
            Arc::clone(&storage),
            key.clone(),
            written_tx,
        ));

        Ok(Self {
            inner: Arc::new(Inner {
                state,
                storage,
                key,
                pending,
                written,
                hydration: Mutex::new(None),
            }),
        })
    }

    /// Storage key the list is persisted under
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Receiver notified on every committed change
    pub fn subscribe(&self) -> watch::Receiver<BookListState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> BookListState {
        self.inner.state.borrow().clone()
    }

    pub fn books(&self) -> Vec<Book> {
        self.inner.state.borrow().books.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().books.is_empty()
    }

    /// Returns the book with the given id
    pub fn get_book_by_id(&self, id: &str) -> Option<Book> {
        self.inner
            .state
            .borrow()
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    /// Returns the book with the given id, or `BookNotFound`
    pub fn require(&self, id: &str) -> LibraryResult<Book> {
        self.get_book_by_id(id)
            .ok_or_else(|| LibraryError::BookNotFound(id.to_string()))
    }

    pub fn has_book(&self, id: &str) -> bool {
        self.inner.state.borrow().books.iter().any(|b| b.id == id)
    }

    /// Returns the first book recorded with the given ISBN
    pub fn find_by_isbn(&self, isbn: &str) -> Option<Book> {
        self.inner
            .state
            .borrow()
            .books
            .iter()
            .find(|b| b.isbn.as_deref() == Some(isbn))
            .cloned()
    }

    /// Puts a book at the top of the list
    ///
    /// An entry with the same id is replaced by the incoming record.
    pub fn add_book(&self, book: Book) {
        log::debug!("Adding book {} ({})", book.id, book.title);
        self.mutate(|books| {
            books.retain(|b| b.id != book.id);
            books.insert(0, book);
            ((), true)
        });
    }

    /// Removes a book, returning it with its former index for undo
    pub fn remove_book(&self, id: &str) -> Option<RemovedBook> {
        let removed = self.mutate(|books| match books.iter().position(|b| b.id == id) {
            Some(index) => {
                let book = books.remove(index);
                books.retain(|b| b.id != id);
                (Some(RemovedBook { book, index }), true)
            }
            None => (None, false),
        });

        match removed {
            Some(ref r) => log::debug!("Removed book {} from index {}", id, r.index),
            None => log::debug!("Remove ignored, book {} is not in the list", id),
        }
        removed
    }

    /// Puts a book back at `index`, clamped to the list length
    ///
    /// An entry with the same id is removed first, so ids stay unique.
    pub fn restore_book(&self, book: Book, index: usize) {
        log::debug!("Restoring book {} at index {}", book.id, index);
        self.mutate(|books| {
            books.retain(|b| b.id != book.id);
            let at = index.min(books.len());
            books.insert(at, book);
            ((), true)
        });
    }

    /// Moves an existing book to the top, leaving its fields unchanged
    ///
    /// Returns the book, or `None` if it is not in the list. A book that is
    /// already first stays put and nothing is written.
    pub fn move_to_top(&self, id: &str) -> Option<Book> {
        self.mutate(|books| match books.iter().position(|b| b.id == id) {
            Some(0) => (Some(books[0].clone()), false),
            Some(index) => {
                let book = books.remove(index);
                books.retain(|b| b.id != id);
                books.insert(0, book.clone());
                (Some(book), true)
            }
            None => (None, false),
        })
    }

    /// Replaces the list with the persisted one
    ///
    /// Read failures and malformed data leave an empty list. Repeated ids
    /// keep only their first entry. A call made while another load is
    /// running waits for it instead of reading again.
    ///
    /// Loading never writes, unless a mutation was queued while the read
    /// was in flight: the loaded list replaces it in memory, so it is
    /// queued too and storage ends up matching memory again.
    pub async fn load_books(&self) {
        let role = {
            let mut slot = self
                .inner
                .hydration
                .lock()
                .unwrap_or_else(|e| e.into_inner());

            match slot.as_ref() {
                Some(in_flight) => Hydration::Follower(in_flight.clone()),
                None => {
                    let (done, in_flight) = watch::channel(false);
                    *slot = Some(in_flight);
                    self.inner
                        .state
                        .send_if_modified(|state| !std::mem::replace(&mut state.is_loading, true));
                    Hydration::Leader(HydrationGuard {
                        inner: &self.inner,
                        done,
                        started_at: self.inner.pending.borrow().seq,
                    })
                }
            }
        };

        let guard = match role {
            Hydration::Leader(guard) => guard,
            Hydration::Follower(mut in_flight) => {
                log::debug!("Book list load already running, waiting for it");
                let _ = in_flight.wait_for(|done| *done).await;
                return;
            }
        };

        let raw = match self.inner.storage.get(&self.inner.key).await {
            Ok(raw) => raw,
            Err(e) => {
                let err = AppError::from(e);
                log::warn!("{} [{}], starting empty: {}", err.user_message(), err.severity(), err);
                None
            }
        };

        let books = dedupe_by_id(decode_books(raw.as_deref()));
        log::info!("Loaded {} books", books.len());

        self.inner.state.send_modify(|state| {
            state.books = books;
            state.is_loading = false;

            self.inner.pending.send_if_modified(|snapshot| {
                if snapshot.seq == guard.started_at {
                    return false;
                }
                log::debug!("Load replaced changes made while reading, queueing loaded list");
                snapshot.seq += 1;
                snapshot.books = Arc::new(state.books.clone());
                true
            });
        });
        drop(guard);
    }

    /// Waits until every change committed so far has been handed to storage
    ///
    /// Write failures are logged by the writer and do not fail the flush.
    pub async fn flush(&self) {
        let target = self.inner.pending.borrow().seq;
        let mut written = self.inner.written.clone();
        if written.wait_for(|&seq| seq >= target).await.is_err() {
            log::warn!("Book list writer stopped before flushing");
        }
    }

    /// Runs `op` on the list under the state lock
    ///
    /// `op` reports whether it changed the list; only changes are
    /// published and queued for writing.
    fn mutate<R: Default>(&self, op: impl FnOnce(&mut Vec<Book>) -> (R, bool)) -> R {
        let mut outcome = R::default();
        self.inner.state.send_if_modified(|state| {
            let (result, modified) = op(&mut state.books);
            outcome = result;
            if modified {
                self.inner.pending.send_modify(|snapshot| {
                    snapshot.seq += 1;
                    snapshot.books = Arc::new(state.books.clone());
                });
            }
            modified
        });
        outcome
    }
}

/// Keeps the first entry of every id, preserving order
fn dedupe_by_id(books: Vec<Book>) -> Vec<Book> {
    let total = books.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<Book> = books
        .into_iter()
        .filter(|b| seen.insert(b.id.clone()))
        .collect();

    if unique.len() < total {
        log::warn!(
            "Dropped {} duplicate entries from stored book list",
            total - unique.len()
        );
    }
    unique
}

enum Hydration<'a> {
    Leader(HydrationGuard<'a>),
    Follower(watch::Receiver<bool>),
}

/// Ends a load, including one abandoned mid-read
struct HydrationGuard<'a> {
    inner: &'a Inner,
    done: watch::Sender<bool>,
    /// Writer sequence when the read started
    started_at: u64,
}

impl Drop for HydrationGuard<'_> {
    fn drop(&mut self) {
        *self
            .inner
            .hydration
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
        self.inner
            .state
            .send_if_modified(|state| std::mem::replace(&mut state.is_loading, false));
        self.done.send_replace(true);
    }
}

async fn run_writer(
    mut queued: watch::Receiver<Snapshot>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
    written: watch::Sender<u64>,
) {
    while queued.changed().await.is_ok() {
        let snapshot = queued.borrow_and_update().clone();
        persist(storage.as_ref(), &key, &snapshot.books).await;
        written.send_replace(snapshot.seq);
    }
    log::debug!("Book list writer for '{}' stopped", key);
}

async fn persist(storage: &dyn KeyValueStore, key: &str, books: &[Book]) {
    let encoded = match encode_books(books) {
        Ok(encoded) => encoded,
        Err(e) => {
            log::error!("Failed to encode book list: {}", e);
            return;
        }
    };

    match storage.set(key, &encoded).await {
        Ok(()) => log::debug!("Persisted {} books under '{}'", books.len(), key),
        Err(e) => {
            // Kept in memory; the next mutation writes the whole list again
            let err = AppError::from(e);
            log::error!("{} ({}): {}", err.user_message(), err.recovery_action(), err);
        }
    }
}
