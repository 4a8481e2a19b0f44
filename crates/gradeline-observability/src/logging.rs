use std::path::Path;

use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::basic_logging::{env_filter, init_basic_console_logging};
use crate::metrics::is_observability_enabled;

/// Initialize logging.
///
/// - Console: compact, filtered by `RUST_LOG` / `LOG_LEVEL`, written to stderr
///   so command output on stdout stays clean.
/// - File: when `LOG_DIR` is set, a daily rolling `gradeline.json` with
///   structured events at `info` and above.
///
/// Falls back to console-only logging when `OBSERVABILITY_ENABLED=false` or
/// the log directory cannot be created.
pub fn init_logging() {
    let log_dir = match std::env::var("LOG_DIR") {
        Ok(dir) if is_observability_enabled() => dir,
        _ => return init_basic_console_logging(),
    };

    if let Err(e) = std::fs::create_dir_all(Path::new(&log_dir)) {
        eprintln!("⚠️  Could not create log directory {}: {}. Logging to console only.", log_dir, e);
        return init_basic_console_logging();
    }

    let console_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let json_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "gradeline.json");

    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(json_layer)
        .try_init();

    info!(log_dir = %log_dir, "Logging initialized with rolling JSON file");
}
