//! Journeys and the sequential runner.
//!
//! A [`Journey`] is one end-to-end scenario against the store: metadata for
//! the reports plus an async body over a [`JourneyContext`]. The body marks
//! its phases with [`JourneyContext::step`]; each step's timing and outcome
//! ends up in the JSON, HTML and Allure reports.

mod catalogue;
mod runner;

pub use catalogue::catalogue;
pub use runner::{preflight, JourneyFilter, RunSummary, SuiteRunner, DEFAULT_JOURNEY_TIMEOUT};

use crate::data::TestData;
use crate::fixture::{AuthenticatedSession, Session, SignInMethod};
use crate::locator::Selector;
use crate::page_object::{PageContext, SiteSettings};
use crate::reporter::{Severity, StepRecord, TestStatus};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, DEFAULT_POLL_INTERVAL_MS};
use chrono::Utc;
use futures::future::BoxFuture;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Budget for a single expectation (5 seconds)
pub const EXPECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Async body of a journey
pub type JourneyBody = for<'c> fn(&'c JourneyContext) -> BoxFuture<'c, ProbeResult<()>>;

/// One scripted user journey
#[derive(Clone)]
pub struct Journey {
    pub id: &'static str,
    pub title: &'static str,
    pub tags: &'static [&'static str],
    pub severity: Severity,
    pub feature: &'static str,
    pub story: &'static str,
    pub body: JourneyBody,
}

impl std::fmt::Debug for Journey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journey")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

impl Journey {
    /// Whether the journey carries `tag`, with or without the leading `@`
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim_start_matches('@');
        self.tags.iter().any(|t| t.trim_start_matches('@') == wanted)
    }

    /// `TC01 - Register User`
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.id, self.title)
    }
}

/// Everything a journey body can reach
#[derive(Debug)]
pub struct JourneyContext {
    session: Session,
    site: SiteSettings,
    data: Arc<TestData>,
    snapshot: Option<PathBuf>,
    steps: Mutex<Vec<StepRecord>>,
}

impl JourneyContext {
    #[must_use]
    pub fn new(
        session: Session,
        site: SiteSettings,
        data: Arc<TestData>,
        snapshot: Option<PathBuf>,
    ) -> Self {
        Self {
            session,
            site,
            data,
            snapshot,
            steps: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn ctx(&self) -> PageContext<'_> {
        self.session.context(&self.site)
    }

    #[must_use]
    pub fn data(&self) -> &TestData {
        &self.data
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn site(&self) -> &SiteSettings {
        &self.site
    }

    /// Run `fut` as a named step and record how it went
    pub async fn step<T, F>(&self, name: &str, fut: F) -> ProbeResult<T>
    where
        F: Future<Output = ProbeResult<T>>,
    {
        debug!(step = name, "step started");
        let started_at = Utc::now();
        let clock = Instant::now();
        let result = fut.await;
        let (status, error) = match &result {
            Ok(_) => (TestStatus::Passed, None),
            Err(e) => (TestStatus::Failed, Some(e.to_string())),
        };
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StepRecord {
                name: name.to_string(),
                status,
                started_at,
                duration: clock.elapsed(),
                error,
            });
        result
    }

    /// Steps recorded so far
    #[must_use]
    pub fn take_steps(&self) -> Vec<StepRecord> {
        std::mem::take(&mut *self.steps.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Sign the valid user in, from the snapshot when it is still accepted
    pub async fn sign_in(&self) -> ProbeResult<SignInMethod> {
        let auth = AuthenticatedSession::establish(
            self.session.clone(),
            self.site.clone(),
            &self.data.valid_user,
            self.snapshot.as_deref(),
        )
        .await?;
        info!(method = ?auth.method(), "journey signed in");
        Ok(auth.method())
    }

    /// Wait until `selector` is on screen
    pub async fn expect_visible(&self, selector: &Selector) -> ProbeResult<()> {
        self.ctx()
            .base()
            .wait_for_visible(selector, EXPECT_TIMEOUT)
            .await
            .map_err(|e| expectation(e, format!("expected {selector} to be visible")))
    }

    /// Wait until the text of `selector` contains `expected`
    pub async fn expect_text(&self, selector: &Selector, expected: &str) -> ProbeResult<()> {
        let driver = self.session.driver();
        poll_until(
            &format!("text of {selector}"),
            EXPECT_TIMEOUT,
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            || async move {
                Ok(driver
                    .text_content(selector)
                    .await?
                    .is_some_and(|text| text.contains(expected)))
            },
        )
        .await
        .map_err(|e| expectation(e, format!("expected {selector} to contain {expected:?}")))
    }

    /// Wait until the current URL contains `fragment`
    pub async fn expect_url_contains(&self, fragment: &str) -> ProbeResult<()> {
        let base = self.ctx().base();
        poll_until(
            "current url",
            EXPECT_TIMEOUT,
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            || async move { base.url_contains(fragment).await },
        )
        .await
        .map_err(|e| expectation(e, format!("expected url to contain {fragment:?}")))
    }
}

/// Timeouts of an expectation read as failed assertions
fn expectation(error: ProbeError, message: String) -> ProbeError {
    if error.is_timeout() {
        ProbeError::assertion(message)
    } else {
        error
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::data::UserCredentials;
    use crate::mock::{MockDriver, MockElement};

    fn context(driver: MockDriver) -> JourneyContext {
        JourneyContext::new(
            Session::new(Arc::new(driver)),
            SiteSettings::new("https://shop.test"),
            Arc::new(TestData::new(UserCredentials::new("me@example.com", "pw"))),
            None,
        )
    }

    fn noop(_: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
        Box::pin(async { Ok(()) })
    }

    mod journey_tests {
        use super::*;

        #[test]
        fn test_tags_match_with_or_without_at() {
            let journey = Journey {
                id: "TC01",
                title: "Register User",
                tags: &["@smoke"],
                severity: Severity::Critical,
                feature: "User Management",
                story: "User Registration",
                body: noop,
            };
            assert!(journey.has_tag("smoke"));
            assert!(journey.has_tag("@smoke"));
            assert!(!journey.has_tag("regression"));
            assert_eq!(journey.display_name(), "TC01 - Register User");
        }
    }

    mod step_tests {
        use super::*;

        #[tokio::test]
        async fn test_steps_are_recorded_in_order() {
            let j = context(MockDriver::new());
            j.step("first", async { Ok(()) }).await.unwrap();
            let err = j
                .step("second", async { Err::<(), _>(ProbeError::page("broken")) })
                .await
                .unwrap_err();
            assert!(err.to_string().contains("broken"));

            let steps = j.take_steps();
            assert_eq!(steps.len(), 2);
            assert_eq!(steps[0].status, TestStatus::Passed);
            assert_eq!(steps[1].name, "second");
            assert!(steps[1].error.as_deref().unwrap().contains("broken"));
            assert!(j.take_steps().is_empty());
        }
    }

    mod expectation_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_expect_visible_reports_assertion() {
            let j = context(MockDriver::new());
            let err = j.expect_visible(&Selector::css("#missing")).await.unwrap_err();
            assert!(matches!(err, ProbeError::Assertion { .. }));
            assert!(err.to_string().contains("css=#missing"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_expect_text_contains() {
            let driver = MockDriver::new();
            driver.add_element(&Selector::css("h2"), MockElement::text("Searched Products"));
            let j = context(driver);
            j.expect_text(&Selector::css("h2"), "Searched").await.unwrap();
            let err = j.expect_text(&Selector::css("h2"), "Nope").await.unwrap_err();
            assert!(err.to_string().contains("\"Nope\""));
        }

        #[tokio::test(start_paused = true)]
        async fn test_expect_url_contains() {
            let driver = MockDriver::new();
            driver.set_url("https://shop.test/test_cases");
            let j = context(driver);
            j.expect_url_contains("test_cases").await.unwrap();
            assert!(j.expect_url_contains("/cart").await.is_err());
        }
    }
}
