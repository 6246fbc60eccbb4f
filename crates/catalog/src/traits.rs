// FILE: crates/catalog/src/traits.rs

use crate::CatalogResult;
use async_trait::async_trait;
use lepkehalo_core::Book;

/// Looks books up by ISBN
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Finds the book for an ISBN
    ///
    /// `Ok(None)` means the catalog does not know the ISBN; that is an
    /// expected outcome, not an error.
    async fn find_by_isbn(&self, isbn: &str) -> CatalogResult<Option<Book>>;

    /// Name of the catalog, for logs
    fn name(&self) -> &str;
}
