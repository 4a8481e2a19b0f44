use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter shared by every logging setup.
///
/// `RUST_LOG` wins when set; otherwise `LOG_LEVEL` (default `info`) applies to
/// the gradeline crates and noisy dependencies are held at `warn`.
pub(crate) fn env_filter() -> EnvFilter {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "gradeline={level},gradeline_cli={level},gradeline_cache={level},gradeline_db={level},sqlx=warn,redis=warn",
            level = log_level
        ))
    })
}

/// Initialize console-only logging.
///
/// Compact format with file and line numbers. Used directly by the seeder and
/// as the fallback when the `observability` feature is off.
pub fn init_basic_console_logging() {
    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    // try_init: a second initialisation (tests, embedded use) is not an error
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
