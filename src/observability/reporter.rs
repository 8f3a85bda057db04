//! Side-channel error reporting.
//!
//! Problems inside the logging engine are reported as `tracing` events and
//! never returned to application code.

use std::fmt::Display;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const TARGET: &str = "dynlog::reporter";

/// A configuration value that could not be used; its default applies.
pub fn report_config_error(key: &str, error: &dyn Display) {
    tracing::error!(target: TARGET, key, error = %error, "Invalid logger configuration, using default");
}

/// A record could not be written to the sink.
pub fn report_write_failure(logger: &str, error: &dyn Display) {
    tracing::error!(target: TARGET, logger, error = %error, "Failed to write log record");
}

/// A record could not be encoded.
pub fn report_encode_failure(logger: &str, error: &dyn Display) {
    tracing::error!(target: TARGET, logger, error = %error, "Failed to encode log record");
}

/// Install a stderr subscriber for the reporter, honouring `RUST_LOG`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_stderr(default_directive: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
