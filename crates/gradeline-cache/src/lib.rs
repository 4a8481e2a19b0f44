//! # Gradeline Cache
//!
//! Redis-based caching for computed results.
//!
//! This crate provides:
//! - Redis connection management
//! - Cache operations (get, set, delete, invalidate by pattern)
//! - Cache configuration from environment variables
//! - Cache keys for class rankings and their invalidation helpers
//!
//! # Example
//!
//! ```ignore
//! use gradeline_cache::{CacheConfig, RedisCache, keys};
//!
//! let config = CacheConfig::from_env();
//! let cache = RedisCache::connect(&config).await?;
//!
//! let key = keys::rankings::cohort(class_id, session_id, term);
//! cache.set_with_ttl(&key, &rankings, Duration::from_secs(3600)).await?;
//! let cached: Option<ClassRankings> = cache.get(&key).await?;
//! ```

pub mod config;
pub mod keys;
pub mod redis;

pub use config::CacheConfig;
pub use keys::invalidate;
pub use redis::{CacheError, RedisCache};
