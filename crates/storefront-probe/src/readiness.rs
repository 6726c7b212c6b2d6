//! Settle-and-wait.
//!
//! After a successful navigation, [`settle`] checks that the document is
//! usable. Generic signals (document parsed, `body`, any header or nav) are
//! best-effort and only logged when missing. Page landmarks are mandatory: the
//! first one that never becomes visible fails with
//! [`ProbeError::Readiness`].

use crate::driver::PageDriver;
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{bounded, ElementState, WaitStrategy};
use std::time::Duration;
use tracing::{debug, warn};

/// Budget for the document-parsed signal (10 seconds)
pub const DOCUMENT_SIGNAL_TIMEOUT_MS: u64 = 10_000;

/// Budget for the generic header/nav landmark (5 seconds)
pub const STRUCTURAL_LANDMARK_TIMEOUT_MS: u64 = 5_000;

/// Default budget for a page landmark (10 seconds)
pub const PAGE_LANDMARK_TIMEOUT_MS: u64 = 10_000;

/// Selector list for the generic structural landmark
pub const STRUCTURAL_LANDMARK_SELECTOR: &str = "header, nav, .navbar";

/// Timeouts and selectors for settle-and-wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub document_timeout: Duration,
    pub structural_selector: Selector,
    pub structural_timeout: Duration,
    pub landmark_timeout: Duration,
    /// Busy indicator that should be gone before interacting
    pub spinner: Option<Selector>,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            document_timeout: Duration::from_millis(DOCUMENT_SIGNAL_TIMEOUT_MS),
            structural_selector: Selector::css(STRUCTURAL_LANDMARK_SELECTOR),
            structural_timeout: Duration::from_millis(STRUCTURAL_LANDMARK_TIMEOUT_MS),
            landmark_timeout: Duration::from_millis(PAGE_LANDMARK_TIMEOUT_MS),
            spinner: Some(Selector::test_id("loading-spinner")),
        }
    }
}

impl ReadinessPolicy {
    #[must_use]
    pub const fn with_document_timeout(mut self, timeout: Duration) -> Self {
        self.document_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_structural_timeout(mut self, timeout: Duration) -> Self {
        self.structural_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_landmark_timeout(mut self, timeout: Duration) -> Self {
        self.landmark_timeout = timeout;
        self
    }

    #[must_use]
    pub fn without_spinner(mut self) -> Self {
        self.spinner = None;
        self
    }
}

/// An element whose visibility proves a page rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    pub name: String,
    pub selector: Selector,
    /// Overrides [`ReadinessPolicy::landmark_timeout`]
    pub timeout: Option<Duration>,
}

impl Landmark {
    #[must_use]
    pub fn new(name: impl Into<String>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            selector,
            timeout: None,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// What settle-and-wait observed; recomputed on every navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReadinessCheck {
    /// The document-parsed signal arrived in time
    pub basic_ready_signal: bool,
    /// A generic header/nav element appeared in time
    pub landmark_element_found: bool,
    /// Page landmarks confirmed visible, in order
    pub page_landmarks: Vec<String>,
}

/// Confirm the current document is ready for `page`
pub async fn settle(
    driver: &dyn PageDriver,
    policy: &ReadinessPolicy,
    page: &str,
    landmarks: &[Landmark],
) -> ProbeResult<PageReadinessCheck> {
    let mut check = PageReadinessCheck::default();

    let document = WaitStrategy::DomContentLoaded;
    match bounded(
        document.event_name(),
        policy.document_timeout,
        driver.wait_for_load_state(document, policy.document_timeout),
    )
    .await
    {
        Ok(()) => check.basic_ready_signal = true,
        Err(e) => warn!(page, error = %e, "document signal missing, continuing"),
    }

    let body = Selector::css("body");
    if let Err(e) = wait_bounded(driver, &body, ElementState::Attached, policy.document_timeout).await
    {
        warn!(page, error = %e, "body not attached, continuing");
    }

    match wait_bounded(
        driver,
        &policy.structural_selector,
        ElementState::Attached,
        policy.structural_timeout,
    )
    .await
    {
        Ok(()) => check.landmark_element_found = true,
        Err(e) => warn!(page, error = %e, "header/nav not found, continuing"),
    }

    if let Some(spinner) = &policy.spinner {
        if let Err(e) =
            wait_bounded(driver, spinner, ElementState::Hidden, policy.document_timeout).await
        {
            warn!(page, error = %e, "loading indicator still visible, continuing");
        }
    }

    for landmark in landmarks {
        let timeout = landmark.timeout.unwrap_or(policy.landmark_timeout);
        match wait_bounded(driver, &landmark.selector, ElementState::Visible, timeout).await {
            Ok(()) => {
                debug!(page, landmark = %landmark.name, "landmark visible");
                check.page_landmarks.push(landmark.name.clone());
            }
            Err(e) if e.is_timeout() => {
                return Err(ProbeError::Readiness {
                    page: page.to_string(),
                    landmark: landmark.name.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(check)
}

async fn wait_bounded(
    driver: &dyn PageDriver,
    selector: &Selector,
    state: ElementState,
    timeout: Duration,
) -> ProbeResult<()> {
    let operation = format!("waiting for {selector} to be {state}");
    bounded(
        &operation,
        timeout,
        driver.wait_for_selector(selector, state, timeout),
    )
    .await
}
