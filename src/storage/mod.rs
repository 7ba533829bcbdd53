//! Key/value storage for client state that must outlive the process.
//!
//! This is the storefront's stand-in for browser local storage: string keys mapped
//! to JSON blobs, no schema version. The session user and the cart are the only
//! values written. Two backends exist: [`MemoryStorage`] for a single process
//! lifetime and [`DatabaseStorage`], a `SQLite` table managed through `SeaORM`.

mod database;
mod memory;

pub use database::DatabaseStorage;
pub use memory::MemoryStorage;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{instrument, warn};

/// Key holding the serialized session user.
pub const SESSION_USER_KEY: &str = "petstore-user";
/// Key holding the serialized cart.
pub const CART_KEY: &str = "petstore-cart";

/// String-keyed blob storage.
#[async_trait]
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Returns the stored value, if any.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Deleting an absent key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// Reads and decodes the JSON value under `key`.
///
/// A value that no longer decodes is treated as corrupted: it is logged, removed,
/// and reported as absent.
#[instrument(skip(storage))]
pub async fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Result<Option<T>> {
    let Some(raw) = storage.get_item(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Discarding corrupted value stored under '{}': {}", key, e);
            storage.remove_item(key).await?;
            Ok(None)
        }
    }
}

/// Encodes `value` as JSON and stores it under `key`.
#[instrument(skip(storage, value))]
pub async fn save_json<T: Serialize + ?Sized + Sync>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    storage.set_item(key, &raw).await
}
