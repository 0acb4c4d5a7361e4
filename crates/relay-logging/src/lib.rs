//! # relay-logging
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (with `RUST_LOG`
//! taking precedence over the configured level) feeding either a JSON layer
//! or a human-readable one.

#![deny(unsafe_code)]

pub mod types;

pub use types::{LogFormat, LogLevel};

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Errors from subscriber setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A filter directive could not be parsed.
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        /// The rejected directive string.
        filter: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    /// A global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Subscriber configuration.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: LogLevel,
    /// Per-target overrides, e.g. `("tower_http", Warn)`.
    pub target_levels: Vec<(String, LogLevel)>,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            target_levels: vec![("tower_http".into(), LogLevel::Warn)],
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Filter directive string built from the level and target overrides.
    pub fn filter_directive(&self) -> String {
        let mut filter = self.level.as_filter_str().to_string();
        for (target, level) in &self.target_levels {
            filter.push(',');
            filter.push_str(target);
            filter.push('=');
            filter.push_str(level.as_filter_str());
        }
        filter
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let directive = self.filter_directive();
        EnvFilter::try_new(&directive).map_err(|source| LoggingError::Filter {
            filter: directive,
            source,
        })
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter()?;

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(fmt_layer).try_init()?;
    tracing::debug!(format = ?config.format, "logging initialized");
    Ok(())
}
