//! `SQLite` storage backend.
//!
//! Each key is one row of `storage_entries`; writes update the row in place when
//! the key already exists.

use super::Storage;
use crate::{
    entities::{StorageEntry, storage_entry},
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, Set, prelude::*};
use tracing::{debug, instrument};

/// Storage persisted in the `storage_entries` table.
#[derive(Debug, Clone)]
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    /// Wraps a connection whose tables already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connects to `url` and makes sure the table exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let db = crate::config::storage::create_connection(url).await?;
        crate::config::storage::create_tables(&db).await?;
        Ok(Self::new(db))
    }

    async fn find_entry(&self, key: &str) -> Result<Option<storage_entry::Model>> {
        StorageEntry::find()
            .filter(storage_entry::Column::Key.eq(key))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    #[instrument(skip(self))]
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self.find_entry(key).await?.map(|entry| entry.value);
        debug!("Storage lookup '{}': found = {}", key, value.is_some());
        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().naive_utc();

        if let Some(existing) = self.find_entry(key).await? {
            let mut entry: storage_entry::ActiveModel = existing.into();
            entry.value = Set(value.to_string());
            entry.updated_at = Set(now);
            entry.update(&self.db).await?;
        } else {
            let entry = storage_entry::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(now),
                ..Default::default()
            };
            entry.insert(&self.db).await?;
        }
        debug!("Stored {} bytes under '{}'", value.len(), key);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, key: &str) -> Result<()> {
        let result = StorageEntry::delete_many()
            .filter(storage_entry::Column::Key.eq(key))
            .exec(&self.db)
            .await?;
        debug!("Removed '{}' ({} rows)", key, result.rows_affected);
        Ok(())
    }
}
