//! Business counters.
//!
//! Counters are emitted through the `metrics` facade. [`init_metrics`]
//! installs a Prometheus recorder; since the operator commands are short-lived
//! there is no scrape endpoint, and [`export_metrics`] writes the counters to
//! a textfile for node_exporter's textfile collector instead.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();
static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Check if observability is enabled via `OBSERVABILITY_ENABLED` (default on).
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder once per process.
/// Returns `None` if observability is disabled or another recorder won.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }
    if let Some(handle) = PROMETHEUS.get() {
        return Some(handle.clone());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(PROMETHEUS.get_or_init(|| handle).clone()),
        Err(e) => {
            warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// Writes the counters to `METRICS_TEXTFILE` when it is set.
pub fn export_metrics() {
    let Ok(path) = std::env::var("METRICS_TEXTFILE") else {
        return;
    };
    if let Err(e) = write_metrics_textfile(Path::new(&path)) {
        warn!(error = %e, path = %path, "Failed to write metrics textfile");
    }
}

/// Renders the installed recorder in the Prometheus text format to `path`.
/// Returns `Ok(false)` when no recorder is installed.
pub fn write_metrics_textfile(path: &Path) -> std::io::Result<bool> {
    let Some(handle) = PROMETHEUS.get() else {
        return Ok(false);
    };
    std::fs::write(path, handle.render())?;
    Ok(true)
}

/// One student's outcome in a promotion run.
pub fn track_promotion(outcome: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("gradeline_promotions_total", "outcome" => outcome.to_string()).increment(1);
}

/// A whole promotion run, `committed` or `failed`.
pub fn track_promotion_run(result: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("gradeline_promotion_runs_total", "result" => result.to_string()).increment(1);
}

/// A current-flag change made by the term state machine.
pub fn track_period_transition(entity: &str, change: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!(
        "gradeline_period_transitions_total",
        "entity" => entity.to_string(),
        "change" => change.to_string()
    )
    .increment(1);
}

/// Ranking cache lookups: `hit`, `miss` or `error`.
pub fn track_rankings_cache(result: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("gradeline_rankings_cache_total", "result" => result.to_string()).increment(1);
}
