//! Gradeline Observability
//!
//! Provides:
//! - Console logging with `EnvFilter` (always available)
//! - Daily rolling JSON log files when `LOG_DIR` is set
//! - Business counters for promotions, period transitions and ranking caching,
//!   recorded by Prometheus and written to `METRICS_TEXTFILE` on exit
//!
//! Rolling files and counters are compiled in with the `observability` feature
//! (default). At runtime they can be switched off with
//! `OBSERVABILITY_ENABLED=false`. Without the feature every tracking function
//! is a no-op and [`init_logging`] only sets up console output.
//!
//! # Examples
//!
//! ```no_run
//! use gradeline_observability::{init_logging, track_promotion};
//!
//! init_logging();
//! track_promotion("promoted");
//! ```

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub use logging::init_logging;
#[cfg(feature = "observability")]
pub use metrics::{
    export_metrics, init_metrics, is_observability_enabled, track_period_transition,
    track_promotion, track_promotion_run, track_rankings_cache, write_metrics_textfile,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    pub fn is_observability_enabled() -> bool {
        false
    }

    /// Console logging only.
    pub fn init_logging() {
        super::init_basic_console_logging();
    }

    pub fn init_metrics() -> Option<()> {
        None
    }

    pub fn export_metrics() {}

    pub fn track_promotion(_outcome: &str) {}
    pub fn track_promotion_run(_result: &str) {}
    pub fn track_period_transition(_entity: &str, _change: &str) {}
    pub fn track_rankings_cache(_result: &str) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
