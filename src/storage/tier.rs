use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// A key-value store holding serialized session payloads.
///
/// Implementations only move strings around; expiry is enforced by the
/// session store, `expires_at` merely lets a backend drop stale keys on its own.
#[async_trait]
pub trait StorageTier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Reads the payload stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `payload` under `key`, replacing any previous value.
    async fn set(&self, key: &str, payload: &str, expires_at: DateTime<Utc>) -> Result<()>;

    /// Stores `payload` under `key` only if the key still holds `expected`.
    ///
    /// # Returns
    ///
    /// `false` when the key is gone or holds something else; nothing is written.
    async fn replace(
        &self,
        key: &str,
        expected: &str,
        payload: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
