//! Lepkehaló book list
//!
//! The recency-ordered list of scanned books and the flow that feeds it
//! from barcode scans.

pub mod error;
pub mod scan;
pub mod store;

pub use error::{LibraryError, LibraryResult};
pub use scan::{ScanEvent, ScanOrchestrator, ScanOutcome};
pub use store::{BookListState, BookListStore, RemovedBook};
