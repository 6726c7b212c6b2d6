//! Wait strategies and polling primitives.
//!
//! A [`WaitStrategy`] names the browser signal that counts as "page ready".
//! Strategies are ordered from strictest to weakest; navigation walks them in
//! that order and stops at the first one that is satisfied.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without new requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

// =============================================================================
// WAIT STRATEGY
// =============================================================================

/// Page load completion signal, strictest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitStrategy {
    /// The `load` event fired
    FullLoad,
    /// No network activity for [`NETWORK_IDLE_THRESHOLD_MS`]
    NetworkIdle,
    /// The DOM has been parsed
    DomContentLoaded,
}

impl WaitStrategy {
    /// All strategies in descending strictness
    pub const DESCENDING: [Self; 3] = [Self::FullLoad, Self::NetworkIdle, Self::DomContentLoaded];

    /// Higher is stricter
    #[must_use]
    pub const fn strictness(&self) -> u8 {
        match self {
            Self::FullLoad => 3,
            Self::NetworkIdle => 2,
            Self::DomContentLoaded => 1,
        }
    }

    /// Name of the browser signal, as the automation engine spells it
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::FullLoad => "load",
            Self::NetworkIdle => "networkidle",
            Self::DomContentLoaded => "domcontentloaded",
        }
    }

    /// Parse an engine signal name
    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "load" => Some(Self::FullLoad),
            "networkidle" => Some(Self::NetworkIdle),
            "domcontentloaded" => Some(Self::DomContentLoaded),
            _ => None,
        }
    }

    /// Whether satisfying `self` also implies `other`
    #[must_use]
    pub const fn implies(&self, other: Self) -> bool {
        self.strictness() >= other.strictness()
    }
}

impl Default for WaitStrategy {
    fn default() -> Self {
        Self::FullLoad
    }
}

impl std::fmt::Display for WaitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// ELEMENT STATE
// =============================================================================

/// Element state to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// Present in the DOM
    Attached,
    /// Present and rendered with a non-empty box
    Visible,
    /// Absent or not rendered
    Hidden,
}

impl ElementState {
    /// Short name for logs and errors
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attached => "attached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it yields `true` or `timeout` elapses.
///
/// Errors from `probe` are treated as "not yet" and retried; the deadline is
/// reported as [`ProbeError::Timeout`] naming `operation`.
pub async fn poll_until<F, Fut>(
    operation: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> ProbeResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<bool>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Ok(true) = probe().await {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(ProbeError::timeout(operation, timeout.as_millis() as u64));
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Run `future` but give up after `timeout`, reporting a [`ProbeError::Timeout`].
///
/// Drivers enforce their own budgets; this bounds a driver that never answers.
pub async fn bounded<T, Fut>(operation: &str, timeout: Duration, future: Fut) -> ProbeResult<T>
where
    Fut: Future<Output = ProbeResult<T>>,
{
    tokio::time::timeout(timeout, future)
        .await
        .unwrap_or_else(|_| Err(ProbeError::timeout(operation, timeout.as_millis() as u64)))
}
