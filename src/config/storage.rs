//! Storage configuration module.
//!
//! Resolves which key/value backend holds the session and cart, opens the `SeaORM`
//! connection for the `SQLite` backend, and creates its table from the entity
//! definition so the schema always matches the Rust struct.

use crate::config::app::StorageConfig;
use crate::entities::StorageEntry;
use crate::errors::Result;
use crate::storage::{DatabaseStorage, MemoryStorage, Storage};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::sync::Arc;
use tracing::info;

/// Environment variable overriding the storage url.
pub const STORAGE_URL_ENV: &str = "STORAGE_URL";
/// Url selecting [`MemoryStorage`].
pub const MEMORY_URL: &str = "memory";

/// Gets the storage url from config, then `STORAGE_URL`, then memory.
#[must_use]
pub fn get_storage_url(config: &StorageConfig) -> String {
    config
        .url
        .clone()
        .or_else(|| std::env::var(STORAGE_URL_ENV).ok())
        .unwrap_or_else(|| MEMORY_URL.to_string())
}

/// Establishes a connection to the `SQLite` database at `url`.
pub async fn create_connection(url: &str) -> Result<DatabaseConnection> {
    Database::connect(url).await.map_err(Into::into)
}

/// Creates the `storage_entries` table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut storage_table = schema.create_table_from_entity(StorageEntry);
    storage_table.if_not_exists();

    db.execute(builder.build(&storage_table)).await?;

    Ok(())
}

/// Builds the configured storage backend.
pub async fn open_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>> {
    let url = get_storage_url(config);
    if url == MEMORY_URL {
        info!("Using in-memory storage for session and cart");
        return Ok(Arc::new(MemoryStorage::new()));
    }
    info!("Using database storage at {}", url);
    Ok(Arc::new(DatabaseStorage::connect(&url).await?))
}
