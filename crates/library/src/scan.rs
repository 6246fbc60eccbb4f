// FILE: crates/library/src/scan.rs
//! Turns barcode scans into book list changes

use crate::store::BookListStore;
use lepkehalo_catalog::CatalogLookup;
use lepkehalo_core::Book;
use std::sync::Arc;

/// A barcode read by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    /// Barcode type as reported by the scanner, e.g. `EAN_13`
    pub symbology: String,
    /// Decoded barcode contents
    pub data: String,
}

impl ScanEvent {
    pub fn new(symbology: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            symbology: symbology.into(),
            data: data.into(),
        }
    }

    /// An EAN-13 scan, the symbology printed on books
    pub fn ean13(data: impl Into<String>) -> Self {
        Self::new("EAN_13", data)
    }
}

/// What a scan did to the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A new book was looked up and put at the top
    Added(Book),
    /// A book already in the list was moved to the top
    MovedToTop(Book),
    /// The catalog has no book with this ISBN
    NotFound { isbn: String },
    /// The catalog could not be asked; `network` is false for server errors
    Unavailable { isbn: String, network: bool },
    /// Nothing usable was scanned
    Ignored,
}

impl ScanOutcome {
    /// The message shown to the user after a failed scan
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            ScanOutcome::NotFound { .. } => Some("Az ISBN nem található a Moly-on"),
            ScanOutcome::Unavailable { .. } => Some("A moly.hu nem elérhető"),
            _ => None,
        }
    }

    /// The book that ended up at the top of the list, if any
    pub fn book(&self) -> Option<&Book> {
        match self {
            ScanOutcome::Added(book) | ScanOutcome::MovedToTop(book) => Some(book),
            _ => None,
        }
    }

    /// True if the list now starts with the scanned book
    pub fn is_success(&self) -> bool {
        self.book().is_some()
    }
}

/// Applies scans to a book list, consulting the catalog for unknown codes
#[derive(Clone)]
pub struct ScanOrchestrator {
    store: BookListStore,
    catalog: Arc<dyn CatalogLookup>,
}

impl ScanOrchestrator {
    pub fn new(store: BookListStore, catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { store, catalog }
    }

    pub fn store(&self) -> &BookListStore {
        &self.store
    }

    /// Handles one scan
    ///
    /// Codes already in the list, by id or by ISBN, are moved to the top
    /// without asking the catalog.
    pub async fn handle_scan(&self, event: &ScanEvent) -> ScanOutcome {
        let code = event.data.trim();
        if code.is_empty() {
            log::debug!("Ignoring empty {} scan", event.symbology);
            return ScanOutcome::Ignored;
        }

        log::info!("Scanned {} code {}", event.symbology, code);

        if let Some(book) = self.store.move_to_top(code) {
            return ScanOutcome::MovedToTop(book);
        }

        if let Some(known) = self.store.find_by_isbn(code) {
            if let Some(book) = self.store.move_to_top(known.id.as_str()) {
                return ScanOutcome::MovedToTop(book);
            }
        }

        match self.catalog.find_by_isbn(code).await {
            Ok(Some(found)) => {
                // The catalog id can differ from the scanned code
                if let Some(book) = self.store.move_to_top(found.id.as_str()) {
                    return ScanOutcome::MovedToTop(book);
                }
                self.store.add_book(found.clone());
                ScanOutcome::Added(found)
            }
            Ok(None) => ScanOutcome::NotFound {
                isbn: code.to_string(),
            },
            Err(e) => {
                log::error!("{} lookup for {} failed: {}", self.catalog.name(), code, e);
                ScanOutcome::Unavailable {
                    isbn: code.to_string(),
                    network: e.is_network_error(),
                }
            }
        }
    }
}
