use sqlx::PgPool;
use tracing::warn;

use gradeline_cache::{CacheConfig, RedisCache};
use gradeline_config::AppConfig;
use gradeline_db::init_db_pool;

use crate::modules::results::RankingsCache;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    /// `None` when caching is disabled or Redis could not be reached.
    pub cache: Option<RedisCache>,
    pub config: AppConfig,
}

impl AppState {
    pub fn rankings_cache(&self) -> RankingsCache<'_> {
        RankingsCache::new(self.cache.as_ref(), self.config.results.rankings_ttl())
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;
    let db = init_db_pool(&config.database).await?;

    let cache = if config.results.cache_enabled {
        match RedisCache::connect(&CacheConfig::from_env()).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, rankings will not be cached");
                None
            }
        }
    } else {
        None
    };

    Ok(AppState { db, cache, config })
}
