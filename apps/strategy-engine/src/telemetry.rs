//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the filter is
//! `strategy_engine=<observability.logging.level>`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strategy_engine::telemetry::init_tracing;
//!
//! init_tracing(&config.observability.logging)?;
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::LoggingConfig;

/// Error type for subscriber installation.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Unknown output format.
    #[error("unsupported log format '{0}'")]
    UnsupportedFormat(String),
    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Installation(String),
}

/// Filter used when `RUST_LOG` is unset.
#[must_use]
pub fn default_directive(level: &str) -> String {
    format!("strategy_engine={level}")
}

/// Install the global subscriber.
///
/// # Errors
///
/// [`TelemetryError::UnsupportedFormat`] for a format other than `json`,
/// `pretty` or `compact`; [`TelemetryError::Installation`] if a subscriber
/// is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));
    let span_events = if config.include_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let installed = match config.format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_current_span(config.include_spans)
            .with_span_list(config.include_spans)
            .try_init(),
        "pretty" => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(env_filter)
            .with_span_events(span_events)
            .try_init(),
        "compact" => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .with_span_events(span_events)
            .try_init(),
        other => return Err(TelemetryError::UnsupportedFormat(other.to_string())),
    };

    installed.map_err(|e| TelemetryError::Installation(e.to_string()))
}
