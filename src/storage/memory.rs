use super::Storage;
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::trace;

/// Process-lifetime storage backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// An empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        trace!("memory storage: set '{}' ({} bytes)", key, value.len());
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        trace!("memory storage: remove '{}'", key);
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() -> Result<()> {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty().await);

        storage.set_item("k", "v1").await?;
        storage.set_item("k", "v2").await?;
        assert_eq!(storage.get_item("k").await?.as_deref(), Some("v2"));
        assert_eq!(storage.len().await, 1);

        storage.remove_item("k").await?;
        storage.remove_item("k").await?;
        assert!(storage.get_item("k").await?.is_none());
        Ok(())
    }
}
