//! Result and error types for storefront-probe.

use thiserror::Error;

/// Result type for storefront-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a journey
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error reported by the automation engine
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// A single suspension point exceeded its budget
    #[error("{operation} timed out after {ms}ms")]
    Timeout {
        /// What was being waited for
        operation: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The browser could not commit a navigation at all (DNS, refused connection)
    #[error("Navigation to {url} failed: {message}")]
    NavigationFailed {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// All navigation strategies exhausted across all retries
    #[error("Failed to navigate to {url} after {attempts} attempts. Last error: {last_error}")]
    Navigation {
        /// Target URL
        url: String,
        /// Outer attempts performed
        attempts: u32,
        /// Innermost failure of the final attempt
        last_error: String,
    },

    /// A page-specific landmark never appeared after a successful navigation
    #[error("{page} never became ready: landmark '{landmark}' not visible within {timeout_ms}ms")]
    Readiness {
        /// Page name
        page: String,
        /// Landmark name
        landmark: String,
        /// Landmark timeout in milliseconds
        timeout_ms: u64,
    },

    /// No element matched a selector when an action required one
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Storage state could not be captured, written or restored
    #[error("Storage state error: {message}")]
    StorageState {
        /// Error message
        message: String,
    },

    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Journey expectation failed
    #[error("Assertion failed: {message}")]
    Assertion {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            ms,
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// Whether this error is a timeout of a single wait
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error ends the current journey
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Navigation { .. } | Self::Readiness { .. })
    }
}

/// Fail the journey unless `condition` holds
pub fn ensure(condition: bool, message: impl Into<String>) -> ProbeResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ProbeError::assertion(message))
    }
}
