//! Persistence adapters for Lepkehaló
//!
//! The book list store only needs a durable string key/value capability.
//! This crate defines that capability as the [`KeyValueStore`] trait and ships
//! two implementations:
//!
//! - [`MemoryStore`]: process-local map, with failure injection for tests
//! - [`FileStore`]: one file per key under a data directory, atomic writes
//!
//! Only single-key atomicity is guaranteed; there are no transactions.

mod error;
mod file;
mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Key under which the encoded book list is stored
pub const BOOKS_STORAGE_KEY: &str = "books";

/// Durable string key/value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value, `None` if the key was never written
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes a value; deleting a missing key succeeds
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Returns true if the key is safe to use as a storage name
///
/// Keys are limited to ASCII letters, digits, `_`, `-` and `.`, and may not
/// start with a dot.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key(BOOKS_STORAGE_KEY));
        assert!(is_valid_key("books-v2"));
        assert!(is_valid_key("my_books.backup"));
    }

    #[test]
    fn test_invalid_keys() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("../books"));
        assert!(!is_valid_key("a/b"));
        assert!(!is_valid_key(".hidden"));
        assert!(!is_valid_key("könyvek"));
    }

    #[test]
    fn test_all_stores_exported() {
        let _ = MemoryStore::new();
        let _ = FileStore::new(std::env::temp_dir());
    }
}
