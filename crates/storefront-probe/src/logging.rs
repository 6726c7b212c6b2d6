//! Structured logging setup.
//!
//! `RUST_LOG` always wins over the level passed in. CI runs switch to one
//! JSON object per line so log collectors can index journey and page fields.

use crate::result::{ProbeError, ProbeResult};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output shape of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Filter used when `RUST_LOG` is unset: `level` for this crate, the CDP
/// client kept at `warn` because it logs every websocket frame
#[must_use]
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,storefront_probe={level},storefront_probe_cli={level},chromiumoxide=warn")
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns [`ProbeError::Config`] when a subscriber is already installed or
/// `RUST_LOG` does not parse.
pub fn init(level: Level, format: LogFormat) -> ProbeResult<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(default_directives(level)),
    }
    .map_err(|e| ProbeError::Config {
        message: format!("invalid log filter: {e}"),
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.map_err(|e| ProbeError::Config {
        message: format!("logging already initialised: {e}"),
    })
}
