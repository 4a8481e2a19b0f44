//! # Gradeline DB
//!
//! PostgreSQL connection pool initialisation and the embedded migrator.
//!
//! # Example
//!
//! ```ignore
//! use gradeline_config::DatabaseConfig;
//! use gradeline_db::{MIGRATOR, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! MIGRATOR.run(&pool).await?;
//! ```

use gradeline_config::DatabaseConfig;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Migrations under `migrations/` at the workspace root.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Initializes a PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable; call this once at startup.
///
/// # Errors
///
/// Returns the driver error when the database cannot be reached.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");

    Ok(pool)
}

/// Applies every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Migrations applied");
    Ok(())
}
