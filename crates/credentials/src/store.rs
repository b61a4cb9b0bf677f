//! Key-value persistence for slot assignments and the key pool

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use narrator_config::StoreConfig;
use thiserror::Error;
use tokio::sync::RwLock;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of strings
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A stored record could not be encoded or decoded
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value store with prefix listing
///
/// Keys are `/`-separated paths such as `slot/0/api_key` or `pool/<id>`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Write every entry in one operation; either all land or none do
    async fn set_all(&self, entries: Vec<(String, String)>) -> Result<(), StoreError>;

    /// Remove `key`, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// All entries whose key starts with `prefix`, in key order
    async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError>;
}

/// Build the store described by configuration
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    match config {
        StoreConfig::Memory => {
            tracing::debug!("using in-memory credential store");
            Ok(Arc::new(MemoryStore::default()))
        }
        StoreConfig::File { path } => {
            tracing::debug!(path = %path.display(), "using file credential store");
            Ok(Arc::new(JsonFileStore::open(path).await?))
        }
    }
}

fn list_prefix(entries: &BTreeMap<String, String>, prefix: &str) -> Vec<(String, String)> {
    entries
        .range(prefix.to_string()..)
        .take_while(|(key, _)| key.starts_with(prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Process-local store, lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn set_all(&self, entries: Vec<(String, String)>) -> Result<(), StoreError> {
        self.entries.write().await.extend(entries);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(list_prefix(&*self.entries.read().await, prefix))
    }
}

/// Store persisted as a single JSON object on disk
///
/// The whole document is held in memory. Every mutation rewrites the file
/// through a temporary sibling and a rename, so readers never see a
/// half-written document. The in-memory copy only changes once the new
/// document is on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let entries = match tokio::fs::read_to_string(path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let document = serde_json::to_vec_pretty(entries)?;
        let staging = self.path.with_extension("tmp");

        tokio::fs::write(&staging, document).await.map_err(io_error)?;
        tokio::fs::rename(&staging, &self.path).await.map_err(io_error)?;

        Ok(())
    }

    /// Persist a modified copy of the entries, then make it current
    async fn commit<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let mut entries = self.entries.write().await;

        let mut next = entries.clone();
        change(&mut next);
        self.persist(&next).await?;

        *entries = next;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.commit(|entries| {
            entries.insert(key.to_string(), value);
        })
        .await
    }

    async fn set_all(&self, entries: Vec<(String, String)>) -> Result<(), StoreError> {
        self.commit(|current| current.extend(entries)).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        if !self.entries.read().await.contains_key(key) {
            return Ok(false);
        }

        let mut removed = false;
        self.commit(|entries| removed = entries.remove(key).is_some()).await?;
        Ok(removed)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(list_prefix(&*self.entries.read().await, prefix))
    }
}
