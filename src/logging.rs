use crate::config::LoggingConfig;

/// Initialize structured logging with tracing.
/// Call once at startup; a second call is a no-op with a warning.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    // The two layer types differ, so each branch installs its own registry
    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };

    match installed {
        Ok(()) => tracing::debug!(json = config.json, level = %config.level, "Structured logging initialized"),
        Err(e) => tracing::warn!(error = %e, "Tracing subscriber already installed"),
    }
}

/// Log the outcome of one generation-service call
pub fn log_model_call(model: &str, stage: &str, success: bool, latency_ms: u64) {
    if success {
        tracing::info!(model = model, stage = stage, success = success, latency_ms = latency_ms, "Model call");
    } else {
        tracing::warn!(model = model, stage = stage, success = success, latency_ms = latency_ms, "Model call");
    }
}

/// Log a generation call that exceeded its deadline
pub fn log_timeout(model: &str, duration_secs: u64) {
    tracing::error!(model = model, duration_secs = duration_secs, "Timeout exceeded");
}

/// Log a persisted document write
pub fn log_persist(document: &str, user_id: &str, success: bool) {
    if success {
        tracing::debug!(document = document, user_id = user_id, "Document saved");
    } else {
        tracing::error!(document = document, user_id = user_id, "Document save failed");
    }
}
