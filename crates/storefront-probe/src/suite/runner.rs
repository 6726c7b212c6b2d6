//! Sequential journey runner.

use super::{Journey, JourneyContext};
use crate::data::TestData;
use crate::fixture::SessionFactory;
use crate::page_object::{PageObject as _, SiteSettings};
use crate::pages::HomePage;
use crate::reporter::{Attachment, FailureMode, Reporter, TestResultEntry};
use crate::result::ProbeResult;
use crate::wait::bounded;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn, Instrument};

/// Budget for one whole journey (3 minutes)
pub const DEFAULT_JOURNEY_TIMEOUT: Duration = Duration::from_secs(180);

/// Which journeys to run; empty means all
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JourneyFilter {
    ids: Vec<String>,
    tags: Vec<String>,
}

impl JourneyFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// A journey is selected when its id or any of its tags is listed
    #[must_use]
    pub fn matches(&self, journey: &Journey) -> bool {
        if self.ids.is_empty() && self.tags.is_empty() {
            return true;
        }
        self.ids.iter().any(|id| id.eq_ignore_ascii_case(journey.id))
            || self.tags.iter().any(|tag| journey.has_tag(tag))
    }
}

/// Outcome of [`SuiteRunner::run`]
#[derive(Debug)]
pub struct RunSummary {
    reporter: Reporter,
    stopped_early: bool,
}

impl RunSummary {
    #[must_use]
    pub const fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    #[must_use]
    pub fn into_reporter(self) -> Reporter {
        self.reporter
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.reporter.all_passed()
    }

    /// Fail-fast cut the run short
    #[must_use]
    pub const fn stopped_early(&self) -> bool {
        self.stopped_early
    }
}

/// Runs journeys one after another, each in its own session
pub struct SuiteRunner {
    factory: Arc<dyn SessionFactory>,
    site: SiteSettings,
    data: Arc<TestData>,
    snapshot: Option<PathBuf>,
    filter: JourneyFilter,
    journey_timeout: Duration,
    failure_mode: FailureMode,
    environment: Vec<(String, String)>,
}

impl std::fmt::Debug for SuiteRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("base_url", &self.site.base_url)
            .field("filter", &self.filter)
            .field("journey_timeout", &self.journey_timeout)
            .field("failure_mode", &self.failure_mode)
            .finish_non_exhaustive()
    }
}

impl SuiteRunner {
    #[must_use]
    pub fn new(factory: Arc<dyn SessionFactory>, site: SiteSettings, data: TestData) -> Self {
        Self {
            factory,
            site,
            data: Arc::new(data),
            snapshot: None,
            filter: JourneyFilter::all(),
            journey_timeout: DEFAULT_JOURNEY_TIMEOUT,
            failure_mode: FailureMode::CollectAll,
            environment: Vec::new(),
        }
    }

    /// Authentication snapshot offered to journeys that sign in
    #[must_use]
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: JourneyFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub const fn with_journey_timeout(mut self, timeout: Duration) -> Self {
        self.journey_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Extra key/value for the report environment
    #[must_use]
    pub fn with_environment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push((key.into(), value.into()));
        self
    }

    /// Journeys the filter selects, in catalogue order
    #[must_use]
    pub fn selected<'j>(&self, journeys: &'j [Journey]) -> Vec<&'j Journey> {
        journeys.iter().filter(|j| self.filter.matches(j)).collect()
    }

    /// Run every selected journey. A failed journey never stops the run
    /// unless the failure mode is fail-fast; the rest are then skipped.
    pub async fn run(&self, journeys: &[Journey]) -> RunSummary {
        let mut reporter = Reporter::new()
            .with_failure_mode(self.failure_mode)
            .with_environment("base_url", self.site.base_url.clone());
        for (key, value) in &self.environment {
            reporter = reporter.with_environment(key.clone(), value.clone());
        }
        reporter.start();

        let selected = self.selected(journeys);
        info!(selected = selected.len(), total = journeys.len(), "suite started");

        let mut stopped_early = false;
        for journey in selected {
            if stopped_early {
                let _ = reporter.record(labelled(TestResultEntry::skipped(journey.title), journey));
                continue;
            }
            let entry = self
                .run_one(journey)
                .instrument(info_span!("journey", id = journey.id))
                .await;
            if let Err(e) = reporter.record(entry) {
                warn!(error = %e, "fail-fast");
                stopped_early = true;
            }
        }

        info!(summary = %reporter.summary(), "suite finished");
        RunSummary {
            reporter,
            stopped_early,
        }
    }

    async fn run_one(&self, journey: &Journey) -> TestResultEntry {
        info!(title = journey.title, "journey started");
        let started_at = Utc::now();
        let clock = Instant::now();

        let session = match self.factory.open().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "no session for journey");
                return labelled(
                    TestResultEntry::failed(
                        journey.title,
                        clock.elapsed(),
                        format!("session could not be opened: {e}"),
                    ),
                    journey,
                )
                .started_at(started_at);
            }
        };

        let context = JourneyContext::new(
            session.clone(),
            self.site.clone(),
            Arc::clone(&self.data),
            self.snapshot.clone(),
        );
        let outcome = bounded(
            &journey.display_name(),
            self.journey_timeout,
            (journey.body)(&context),
        )
        .await;
        let duration = clock.elapsed();
        let steps = context.take_steps();

        let entry = match outcome {
            Ok(()) => {
                info!(duration_ms = duration.as_millis() as u64, "journey passed");
                TestResultEntry::passed(journey.title, duration)
            }
            Err(e) => {
                warn!(error = %e, duration_ms = duration.as_millis() as u64, "journey failed");
                let failed = TestResultEntry::failed(journey.title, duration, e.to_string());
                match context
                    .ctx()
                    .base()
                    .try_screenshot(&format!("{}-failure", journey.id))
                    .await
                {
                    Some(path) => failed.with_attachment(Attachment::png("failure screenshot", path)),
                    None => failed,
                }
            }
        };

        drop(context);
        session.teardown().await;
        labelled(entry, journey)
            .with_steps(steps)
            .started_at(started_at)
    }
}

fn labelled(entry: TestResultEntry, journey: &Journey) -> TestResultEntry {
    entry
        .with_id(journey.id)
        .with_labels(journey.severity, journey.feature, journey.story, journey.tags)
}

/// Open the home page once to check the site answers before a long run
pub async fn preflight(factory: &dyn SessionFactory, site: &SiteSettings) -> ProbeResult<()> {
    let session = factory.open().await?;
    let home = HomePage::new(session.context(site));
    let result = home.open().await.map(|_| ());
    session.teardown().await;
    result
}
