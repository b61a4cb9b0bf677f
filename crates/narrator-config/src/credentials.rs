use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;

/// Labels given to the first slots when the config leaves them out
const DEFAULT_SLOT_LABELS: [&str; 5] = [
    "Main Account",
    "Secondary Account",
    "Third Account",
    "Fourth Account",
    "Fifth Account",
];

/// Account slots and the store that persists admin changes
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Where slot assignments and the key pool are persisted
    #[serde(default)]
    pub store: StoreConfig,
    /// Numbered account slots, selected with `x-account-index`
    #[serde(default = "default_slots")]
    pub slots: Vec<SlotConfig>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            slots: default_slots(),
        }
    }
}

/// Key-value store backend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Lost on restart
    #[default]
    Memory,
    /// JSON document on disk
    File { path: PathBuf },
}

/// A single account slot
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotConfig {
    /// Display label
    pub label: Option<String>,
    /// Upstream API key; empty means the slot is inactive
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

impl SlotConfig {
    /// Label for the slot at `index`, falling back to the built-in names
    pub fn label_or_default(&self, index: usize) -> String {
        self.label.clone().unwrap_or_else(|| default_slot_label(index))
    }
}

/// Built-in label for slot `index`
pub fn default_slot_label(index: usize) -> String {
    DEFAULT_SLOT_LABELS
        .get(index)
        .map_or_else(|| format!("Account {}", index + 1), |label| (*label).to_string())
}

fn default_slots() -> Vec<SlotConfig> {
    DEFAULT_SLOT_LABELS
        .iter()
        .map(|label| SlotConfig {
            label: Some((*label).to_string()),
            api_key: None,
        })
        .collect()
}
