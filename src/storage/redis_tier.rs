use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::error::{AppError, Result};
use crate::storage::tier::StorageTier;

/// The durable tier: Redis, keys expire with their session.
#[derive(Clone)]
pub struct RedisTier {
    redis: ConnectionManager,
}

impl RedisTier {
    /// Connects to Redis at `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;
        tracing::info!("✅ Redis Connection Manager initialized (durable session tier)");
        Ok(Self { redis })
    }
}

/// Swaps the value only if it is still the one the caller read.
const COMPARE_AND_SET: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
    return 1
end
return 0
"#;

/// Seconds until `expires_at`, at least one so Redis accepts the TTL.
fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (expires_at - now).num_seconds().max(1) as u64
}

#[async_trait]
impl StorageTier for RedisTier {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut redis = self.redis.clone();
        let payload: Option<String> = redis.get(key).await?;
        Ok(payload)
    }

    async fn set(&self, key: &str, payload: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let mut redis = self.redis.clone();
        let _: () = redis
            .set_ex(key, payload, ttl_seconds(expires_at, Utc::now()))
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis set_ex failed: {}", e);
                AppError::Redis(e)
            })?;
        Ok(())
    }

    async fn replace(
        &self,
        key: &str,
        expected: &str,
        payload: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut redis = self.redis.clone();
        let swapped: i64 = redis::Script::new(COMPARE_AND_SET)
            .key(key)
            .arg(expected)
            .arg(payload)
            .arg(ttl_seconds(expires_at, Utc::now()))
            .invoke_async(&mut redis)
            .await?;
        Ok(swapped == 1)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let _: () = redis.del(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn ttl_tracks_remaining_lifetime() {
        let now = Utc::now();
        assert_eq!(ttl_seconds(now + Duration::hours(24), now), 86_400);
        assert_eq!(ttl_seconds(now - Duration::seconds(5), now), 1);
    }
}
