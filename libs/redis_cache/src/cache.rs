//! String values with an expiry, plus JSON helpers on top.

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::connection::Pool;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis pool unavailable: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] deadpool_redis::redis::RedisError),

    #[error("Cached value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache did not respond within {0:?}")]
    Timeout(std::time::Duration),
}

/// Key/value store used for read-through caching.
#[async_trait]
pub trait Cache: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_ex(
        &self,
        key: &str,
        value: String,
        ttl_seconds: u64,
    ) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

/// [`Cache`] backed by a deadpool-redis pool.
#[derive(Debug, Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.pool.get().await?;
        Ok(conn.get(key).await?)
    }

    async fn set_ex(
        &self,
        key: &str,
        value: String,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.ping().await?;
        Ok(())
    }
}

/// `Ok(None)` on a miss; an entry that no longer deserializes into `T` is an
/// error so callers can treat it as a miss and overwrite it.
pub async fn get_json<T: DeserializeOwned>(
    cache: &dyn Cache,
    key: &str,
) -> Result<Option<T>, CacheError> {
    match cache.get(key).await? {
        Some(json_str) => Ok(Some(serde_json::from_str(&json_str)?)),
        None => Ok(None),
    }
}

pub async fn set_json<T: Serialize>(
    cache: &dyn Cache,
    key: &str,
    value: &T,
    ttl_seconds: u64,
) -> Result<(), CacheError> {
    let json_str = serde_json::to_string(value)?;
    cache.set_ex(key, json_str, ttl_seconds).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use parking_lot::Mutex;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, (String, u64)>>,
    }

    #[async_trait]
    impl Cache for MapCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self.entries.lock().get(key).map(|(v, _)| v.clone()))
        }

        async fn set_ex(
            &self,
            key: &str,
            value: String,
            ttl_seconds: u64,
        ) -> Result<(), CacheError> {
            self.entries
                .lock()
                .insert(key.to_string(), (value, ttl_seconds));
            Ok(())
        }

        async fn ping(&self) -> Result<(), CacheError> {
            Ok(())
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Reading {
        city: String,
        temp: f64,
    }

    #[tokio::test]
    async fn json_values_round_trip_with_ttl() {
        let cache = MapCache::default();
        let reading = Reading {
            city: "Paris".to_string(),
            temp: 21.5,
        };

        assert_eq!(get_json::<Reading>(&cache, "k").await.unwrap(), None);
        set_json(&cache, "k", &reading, 300).await.unwrap();

        assert_eq!(get_json::<Reading>(&cache, "k").await.unwrap(), Some(reading));
        assert_eq!(cache.entries.lock()["k"].1, 300);
    }

    #[tokio::test]
    async fn unreadable_entries_are_errors() {
        let cache = MapCache::default();
        cache.set_ex("k", "not json".to_string(), 60).await.unwrap();

        assert!(matches!(
            get_json::<Reading>(&cache, "k").await,
            Err(CacheError::Json(_))
        ));
    }
}
