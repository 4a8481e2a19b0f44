//! # Gradeline Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`database`]: PostgreSQL connection settings
//! - [`calendar`]: School-local calendar ("what day is it at the school")
//! - [`results`]: Result computation settings (ranking cache)
//!
//! # Example
//!
//! ```ignore
//! use gradeline_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! let today = config.calendar.today();
//! ```

pub mod calendar;
pub mod database;
pub mod results;

pub use calendar::CalendarConfig;
pub use database::DatabaseConfig;
pub use results::ResultsConfig;

/// All configuration needed by the operator CLI.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub calendar: CalendarConfig,
    pub results: ResultsConfig,
}

impl AppConfig {
    /// Load every section from the environment.
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` is missing.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            calendar: CalendarConfig::from_env(),
            results: ResultsConfig::from_env(),
        })
    }
}
