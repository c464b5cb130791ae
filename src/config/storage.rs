//! Client storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend for the persistent scope
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Prefix for every storage key
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

/// Persistent scope backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

impl StorageConfig {
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let ns_ok = !self.namespace.is_empty()
            && self
                .namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !ns_ok {
            return Err(ValidationError::InvalidStorageNamespace);
        }
        if self.backend == StorageBackend::File && self.directory.trim().is_empty() {
            return Err(ValidationError::MissingRequired("storage.directory"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            directory: default_directory(),
            namespace: default_namespace(),
        }
    }
}

fn default_directory() -> String {
    "./data/storage".to_string()
}

fn default_namespace() -> String {
    "odd".to_string()
}
