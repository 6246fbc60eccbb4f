//! File-backed key/value store
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a temporary file in the
//! same directory which is then atomically renamed over the target, so a
//! reader never sees a half-written value.

use crate::{is_valid_key, KeyValueStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stores each key in its own file under a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the data directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file a key is stored in
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No stored value for '{}' at {}", key, path.display());
                Ok(None)
            }
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        let key = key.to_string();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &key, &value))
            .await
            .map_err(|e| StorageError::Unavailable(format!("write task failed: {}", e)))?
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write {
                key: key.to_string(),
                source: e,
            }),
        }
    }
}

fn write_atomic(dir: &Path, path: &Path, key: &str, content: &str) -> StorageResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| StorageError::DirectoryCreation {
            path: dir.to_path_buf(),
            source: e,
        })?;
        log::info!("Created storage directory: {}", dir.display());
    }

    let write_err = |source| StorageError::Write {
        key: key.to_string(),
        source,
    };

    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(content.as_bytes()).map_err(write_err)?;
    temp_file.flush().map_err(write_err)?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    log::debug!("Stored '{}' ({} bytes) at {}", key, content.len(), path.display());
    Ok(())
}
