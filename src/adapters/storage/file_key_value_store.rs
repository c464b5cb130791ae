//! File-based Key-Value Store Adapter
//!
//! Stores each key as one JSON document under a base directory. Used for the
//! persistent scope so aggregate stats survive restarts.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{KeyValueStore, StorageError, StorageKey};

/// File-backed key/value scope
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileKeyValueStore::new("./data/storage");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File path for a key. Characters outside `[A-Za-z0-9._-]` are hex-escaped.
    fn file_path(&self, key: &StorageKey) -> PathBuf {
        let mut name = String::with_capacity(key.as_str().len());
        for b in key.as_str().bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'-' => name.push(b as char),
                _ => name.push_str(&format!("_{:02x}", b)),
            }
        }
        self.base_path.join(format!("{}.json", name))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<Value>, StorageError> {
        let file_path = self.file_path(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&file_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // An unparseable document is "not yet initialized"; the next
                // write replaces it.
                tracing::warn!(
                    key = %key,
                    path = %file_path.display(),
                    error = %e,
                    "Stored document is corrupt, treating as absent"
                );
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &StorageKey, value: Value) -> Result<(), StorageError> {
        self.ensure_dir().await?;

        let json = serde_json::to_string(&value)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;

        // Write-then-rename keeps the previous document intact on failure.
        let file_path = self.file_path(key);
        let tmp_path = file_path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &file_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        let file_path = self.file_path(key);

        if file_path.exists() {
            fs::remove_file(&file_path)
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?;
        }

        Ok(())
    }
}
