//! Structured logging for the graphlets CLI.
//!
//! Diagnostics go to stderr so the histogram on stdout stays machine
//! readable. `RUST_LOG` selects the filter (default `info`) and
//! `GRAPHLETS_LOG_FORMAT` selects `human` or `json` output. Events from the
//! `log` facade are bridged into `tracing`.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FORMAT_ENV: &str = "GRAPHLETS_LOG_FORMAT";
const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceLock<LogFormat> = OnceLock::new();

/// Output format of the log lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Plain text for terminals.
    #[default]
    Human,
    /// One JSON object per line, with the span stack.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }
}

impl LogFormat {
    /// Reads the format from `GRAPHLETS_LOG_FORMAT`, defaulting to human.
    ///
    /// # Errors
    /// Returns [`LoggingError`] when the variable is not Unicode or names an
    /// unknown format.
    pub fn from_env() -> Result<Self, LoggingError> {
        match env::var(LOG_FORMAT_ENV) {
            Ok(raw) => raw.parse(),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(source @ env::VarError::NotUnicode(_)) => Err(LoggingError::InvalidUnicode {
                name: LOG_FORMAT_ENV,
                source,
            }),
        }
    }
}

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// An environment variable held invalid UTF-8.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Variable name.
        name: &'static str,
        /// Underlying failure.
        #[source]
        source: env::VarError,
    },
    /// `GRAPHLETS_LOG_FORMAT` named an unknown format.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Value supplied by the user.
        provided: String,
    },
}

/// Installs the global subscriber once; later calls are no-ops.
///
/// A subscriber installed by someone else is left in place.
///
/// # Errors
/// Returns [`LoggingError`] when `GRAPHLETS_LOG_FORMAT` is invalid.
pub fn init_logging() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let format = LogFormat::from_env()?;
    install(format);
    let _ = INSTALLED.set(format);
    Ok(())
}

fn install(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let layer = match format {
        LogFormat::Human => layer.boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };
    // Another logger may already own the `log` slot.
    let _ = LogTracer::init();
    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed; keeping it");
    }
}
