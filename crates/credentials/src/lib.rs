#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod admin;
mod error;
mod registry;
mod store;

pub use admin::{AdminState, admin_router};
pub use error::{CredentialError, Result};
pub use registry::{
    AccountInfo, CredentialRegistry, KeyRejection, KeyValidator, PoolKey, PoolKeyUpdate, SlotSummary,
};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError, open_store};
