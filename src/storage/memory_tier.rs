use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::storage::tier::StorageTier;

#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    expires_at: DateTime<Utc>,
}

/// The ephemeral tier: an in-process map, gone when the process exits.
#[derive(Clone, Default)]
pub struct MemoryTier {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry whose expiry is before `now`.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at >= now);
        before - entries.len()
    }

    /// Number of stored payloads.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl StorageTier for MemoryTier {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .map(|entry| entry.payload.clone()))
    }

    async fn set(&self, key: &str, payload: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                payload: payload.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn replace(
        &self,
        key: &str,
        expected: &str,
        payload: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if entry.payload == expected => {
                entry.payload = payload.to_string();
                entry.expires_at = expires_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
