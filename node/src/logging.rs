//! # Structured Logging
//!
//! Sets up the `tracing` subscriber for `reward-node`. The filter and the
//! output format come from [`NodeConfig`](crate::settings::NodeConfig)
//! (`log_level`, `log_format`). `RUST_LOG` takes precedence over the
//! configured filter.
//!
//! Logs always go to stderr, because stdout carries the JSON script report
//! and must stay parseable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines with source locations.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Reads the `log_format` config value. Anything other than `json`
    /// (case-insensitive) falls back to `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Builds the filter: `RUST_LOG` if set and valid, else `configured`.
fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
}

/// Installs the global subscriber. Must be called at most once per process.
pub fn init_logging(configured_filter: &str, format: LogFormat) {
    // Exactly one of the two layers is present; `Option<Layer>` is a no-op
    // layer when `None`.
    let pretty = (format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });
    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
    });

    tracing_subscriber::registry()
        .with(build_filter(configured_filter))
        .with(pretty)
        .with(json)
        .init();

    tracing::debug!(?format, filter = configured_filter, "logging ready");
}
