#![allow(clippy::must_use_candidate)]

mod credentials;
mod error;

pub use credentials::{ACCOUNT_INDEX_HEADER, API_KEY_HEADER, CredentialSelector, POOL_KEY_HEADER};
pub use error::{ErrorBody, HttpError};
