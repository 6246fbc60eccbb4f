//! Storage configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the book list is persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory; the platform data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Storage key holding the encoded book list
    pub books_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            books_key: "books".to_string(),
        }
    }
}

impl ConfigSection for StorageConfig {
    const NAME: &'static str = "storage";

    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut validator = Validator::new(Self::NAME);
        validator.storage_key("books_key", &self.books_key);
        if let Some(ref dir) = self.data_dir {
            validator.directory("data_dir", dir);
        }
        validator.finish()
    }

    fn merge(&mut self, other: Self) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        self.books_key = other.books_key;
    }
}
