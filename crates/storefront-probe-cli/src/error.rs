//! Error types for the CLI

use storefront_probe::ProbeError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// One or more journeys failed
    #[error("Journey run failed: {message}")]
    JourneysFailed {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Library error
    #[error("{0}")]
    Probe(#[from] ProbeError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Command needs a cargo feature this build lacks
    #[error("{command} requires the `{feature}` feature; rebuild with --features {feature}")]
    FeatureDisabled {
        command: &'static str,
        feature: &'static str,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn journeys_failed(message: impl Into<String>) -> Self {
        Self::JourneysFailed {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code for this error: 1 when journeys failed, 2 otherwise
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::JourneysFailed { .. } => 1,
            _ => 2,
        }
    }
}
