//! Result computation settings.
//!
//! # Environment Variables
//!
//! - `CACHE_ENABLED`: Cache class rankings in Redis (default: `false`)
//! - `RANKINGS_CACHE_TTL_SECONDS`: TTL of a cached class ranking (default: `3600`)

use std::env;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsConfig {
    pub cache_enabled: bool,
    pub rankings_ttl_seconds: u64,
}

impl ResultsConfig {
    pub fn from_env() -> Self {
        Self {
            cache_enabled: env::var("CACHE_ENABLED")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false),
            rankings_ttl_seconds: env::var("RANKINGS_CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
        }
    }

    pub fn rankings_ttl(&self) -> Duration {
        Duration::from_secs(self.rankings_ttl_seconds)
    }
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            cache_enabled: false,
            rankings_ttl_seconds: 3600,
        }
    }
}
