use std::sync::Arc;

use async_trait::async_trait;
use narrator_config::CredentialsConfig;
use narrator_core::CredentialSelector;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{CredentialError, Result};
use crate::store::{KeyValueStore, StoreError};

const POOL_PREFIX: &str = "pool/";

/// Account details returned by a successful key validation
#[derive(Debug, Clone, Default)]
pub struct AccountInfo {
    pub email: Option<String>,
}

/// Why a key could not be validated
#[derive(Debug, thiserror::Error)]
pub enum KeyRejection {
    /// Upstream refused the key
    #[error("key rejected by upstream")]
    Invalid,
    /// Upstream could not be reached or answered unexpectedly
    #[error("{0}")]
    Unreachable(String),
}

/// Checks a raw key against the upstream account API
#[async_trait]
pub trait KeyValidator: Send + Sync {
    async fn validate(&self, api_key: &SecretString) -> std::result::Result<AccountInfo, KeyRejection>;
}

/// Public view of an account slot
#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub index: usize,
    pub label: String,
    pub active: bool,
}

/// A key in the admin-managed pool
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolKey {
    pub id: String,
    pub key: String,
    pub label: String,
    pub added_at: String,
    pub enabled: bool,
}

impl std::fmt::Debug for PoolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolKey")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("added_at", &self.added_at)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Partial update of a pool key
#[derive(Debug, Default, Deserialize)]
pub struct PoolKeyUpdate {
    pub enabled: Option<bool>,
    pub label: Option<String>,
}

struct SlotDefaults {
    label: String,
    api_key: Option<SecretString>,
}

/// Maps slot indices and pool ids to upstream API keys
///
/// Slot defaults come from configuration; admin assignments are written to
/// the store and take precedence over them.
pub struct CredentialRegistry {
    store: Arc<dyn KeyValueStore>,
    slots: Vec<SlotDefaults>,
}

impl CredentialRegistry {
    pub fn new(config: &CredentialsConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let slots = config
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| SlotDefaults {
                label: slot.label_or_default(index),
                api_key: slot.api_key.clone(),
            })
            .collect();

        Self { store, slots }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Labels and activity of every slot, in index order
    pub async fn slots(&self) -> Result<Vec<SlotSummary>> {
        let mut summaries = Vec::with_capacity(self.slots.len());

        for index in 0..self.slots.len() {
            summaries.push(SlotSummary {
                index,
                label: self.slot_label(index).await?,
                active: self.slot_key(index).await?.is_some(),
            });
        }

        Ok(summaries)
    }

    /// Resolve the upstream key a request should use
    ///
    /// Out-of-range slot indices fall back to slot 0. Disabled pool keys and
    /// empty slots resolve to `None`.
    pub async fn resolve(&self, selector: &CredentialSelector) -> Result<Option<SecretString>> {
        match selector {
            CredentialSelector::Direct(key) => Ok(Some(key.clone())),
            CredentialSelector::Pool(id) => Ok(self
                .pool_key(id)
                .await?
                .filter(|entry| entry.enabled && !entry.key.is_empty())
                .map(|entry| SecretString::from(entry.key))),
            CredentialSelector::Slot(index) => {
                let index = if *index < self.slots.len() { *index } else { 0 };
                self.slot_key(index).await
            }
        }
    }

    /// Assign `api_key` (and optionally a label) to a slot
    pub async fn assign(&self, slot_index: i64, api_key: &str, label: Option<&str>) -> Result<usize> {
        let index = usize::try_from(slot_index)
            .ok()
            .filter(|index| *index < self.slots.len())
            .ok_or(CredentialError::InvalidSlot(slot_index))?;

        let mut entries = vec![(slot_key_path(index), api_key.to_string())];
        if let Some(label) = label.filter(|label| !label.is_empty()) {
            entries.push((slot_label_path(index), label.to_string()));
        }

        self.store.set_all(entries).await?;

        tracing::info!(slot = index, "API key assigned to slot");

        Ok(index)
    }

    /// Every pool key, oldest first
    pub async fn pool(&self) -> Result<Vec<PoolKey>> {
        self.store
            .list(POOL_PREFIX)
            .await?
            .into_iter()
            .map(|(_, value)| decode_pool_key(&value))
            .collect()
    }

    /// Validate `key` upstream and add it to the pool
    ///
    /// Without an explicit label the account email is used, then "New Key".
    pub async fn add_to_pool(
        &self,
        validator: &dyn KeyValidator,
        key: String,
        label: Option<String>,
    ) -> Result<PoolKey> {
        let account = validator
            .validate(&SecretString::from(key.clone()))
            .await
            .map_err(|rejection| match rejection {
                KeyRejection::Invalid => CredentialError::InvalidKey,
                KeyRejection::Unreachable(reason) => CredentialError::ValidationUnavailable(reason),
            })?;

        let label = label
            .filter(|label| !label.is_empty())
            .or(account.email)
            .unwrap_or_else(|| "New Key".to_string());

        let entry = PoolKey {
            id: uuid::Uuid::now_v7().to_string(),
            key,
            label,
            added_at: jiff::Timestamp::now().to_string(),
            enabled: true,
        };

        self.save_pool_key(&entry).await?;
        tracing::info!(id = %entry.id, "key added to pool");

        Ok(entry)
    }

    pub async fn update_pool_key(&self, id: &str, update: PoolKeyUpdate) -> Result<PoolKey> {
        let mut entry = self
            .pool_key(id)
            .await?
            .ok_or_else(|| CredentialError::PoolKeyNotFound(id.to_string()))?;

        if let Some(enabled) = update.enabled {
            entry.enabled = enabled;
        }

        if let Some(label) = update.label {
            entry.label = label;
        }

        self.save_pool_key(&entry).await?;

        Ok(entry)
    }

    /// Remove a pool key, returning whether it existed
    pub async fn remove_from_pool(&self, id: &str) -> Result<bool> {
        let removed = self.store.remove(&pool_path(id)).await?;
        if removed {
            tracing::info!(%id, "key removed from pool");
        }
        Ok(removed)
    }

    async fn pool_key(&self, id: &str) -> Result<Option<PoolKey>> {
        self.store
            .get(&pool_path(id))
            .await?
            .map(|value| decode_pool_key(&value))
            .transpose()
    }

    async fn save_pool_key(&self, entry: &PoolKey) -> Result<()> {
        let value = serde_json::to_string(entry).map_err(StoreError::from)?;
        self.store.set(&pool_path(&entry.id), value).await?;
        Ok(())
    }

    async fn slot_key(&self, index: usize) -> Result<Option<SecretString>> {
        let stored = self.store.get(&slot_key_path(index)).await?.map(SecretString::from);

        let key = stored.or_else(|| self.slots.get(index).and_then(|slot| slot.api_key.clone()));

        Ok(key.filter(|key| !key.expose_secret().is_empty()))
    }

    async fn slot_label(&self, index: usize) -> Result<String> {
        if let Some(label) = self.store.get(&slot_label_path(index)).await? {
            return Ok(label);
        }

        Ok(self
            .slots
            .get(index)
            .map_or_else(|| narrator_config::default_slot_label(index), |slot| slot.label.clone()))
    }
}

fn decode_pool_key(value: &str) -> Result<PoolKey> {
    Ok(serde_json::from_str(value).map_err(StoreError::from)?)
}

fn pool_path(id: &str) -> String {
    format!("{POOL_PREFIX}{id}")
}

fn slot_key_path(index: usize) -> String {
    format!("slot/{index}/api_key")
}

fn slot_label_path(index: usize) -> String {
    format!("slot/{index}/label")
}
