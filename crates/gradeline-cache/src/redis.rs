//! Redis cache client.
//!
//! Values are stored as JSON. Every key passed in is namespaced with the
//! configured prefix before it reaches Redis.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::CacheConfig;

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    prefix: String,
    default_ttl: Duration,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("prefix", &self.prefix)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RedisCache {
    /// Connects using the URL, prefix and TTL from `config`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Redis` if the URL is invalid or Redis is unreachable.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let client = Client::open(config.redis_url.as_str())?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            prefix: config.key_prefix.clone(),
            default_ttl: config.default_ttl(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Reads a cached value. `Ok(None)` is a miss; a value that no longer
    /// deserializes into `T` is also reported as a miss.
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let key = self.namespaced(key);
        let mut conn = self.conn.clone();

        let Some(raw) = conn.get::<_, Option<String>>(&key).await? else {
            debug!(cache.key = %key, "Cache miss");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(cache.key = %key, "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                debug!(cache.key = %key, error = %e, "Stale cache entry, treating as miss");
                Ok(None)
            }
        }
    }

    /// Stores a value for `ttl`. A zero `ttl` uses the configured default.
    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    pub async fn set_with_ttl<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let key = self.namespaced(key);
        let json = serde_json::to_string(value)?;
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(&key, json, ttl.as_secs().max(1))
            .await?;

        debug!(cache.key = %key, cache.ttl_secs = ttl.as_secs(), "Cache set");
        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let key = self.namespaced(key);
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(&key).await?;

        debug!(cache.key = %key, "Cache invalidated");
        Ok(())
    }

    /// Deletes every key matching a glob `pattern` (namespaced like any key).
    ///
    /// Walks the keyspace with SCAN, so it never blocks Redis, but it is
    /// proportional to the number of keys.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let pattern = self.namespaced(pattern);
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                deleted += conn.del::<_, u64>(&keys).await?;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(cache.pattern = %pattern, cache.deleted = deleted, "Pattern invalidation complete");
        Ok(deleted)
    }
}
