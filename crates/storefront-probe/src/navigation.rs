//! Navigate-with-fallback.
//!
//! One outer attempt issues a single browser navigation and then listens for
//! progressively weaker completion signals on that same navigation:
//!
//! ```text
//! attempt 1:  goto(load) ──timeout──► networkidle ──timeout──► domcontentloaded ──timeout──┐
//!                │                        │                          │                       │
//!              ready                    ready                      ready                 backoff
//!                └────────────► outcome (first success wins) ◄───────┘                       │
//! attempt 2:  goto(load) ... ◄───────────────────────────────────────────────────────────────┘
//! ```
//!
//! A hard navigation error (nothing committed) ends the attempt at once. After
//! the last attempt the caller gets a single consolidated error.

use crate::driver::PageDriver;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{bounded, WaitStrategy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outer attempts when nothing else is configured
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pause between failed outer attempts (2 seconds)
pub const DEFAULT_BACKOFF_MS: u64 = 2_000;

/// Per-strategy budget for a responsive host (30 seconds)
pub const RESPONSIVE_STRATEGY_TIMEOUT_MS: u64 = 30_000;

/// Per-strategy budget for a slow or unreliable host (60 seconds)
pub const SLOW_HOST_STRATEGY_TIMEOUT_MS: u64 = 60_000;

/// How patient navigation should be with the target host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteProfile {
    /// The host normally answers quickly
    #[default]
    Responsive,
    /// The host is slow or drops requests
    SlowHost,
}

impl SiteProfile {
    /// Parse `responsive` or `slow`
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "responsive" | "fast" => Some(Self::Responsive),
            "slow" | "slow-host" | "slow_host" => Some(Self::SlowHost),
            _ => None,
        }
    }
}

impl std::fmt::Display for SiteProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Responsive => f.write_str("responsive"),
            Self::SlowHost => f.write_str("slow"),
        }
    }
}

/// Navigation tuning shared by every page object of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPolicy {
    strategies: Vec<WaitStrategy>,
    per_strategy_timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        Self::responsive()
    }
}

impl NavigationPolicy {
    /// 30 s per strategy, 3 attempts, 2 s backoff
    #[must_use]
    pub fn responsive() -> Self {
        Self {
            strategies: WaitStrategy::DESCENDING.to_vec(),
            per_strategy_timeout: Duration::from_millis(RESPONSIVE_STRATEGY_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }

    /// 60 s per strategy, 3 attempts, 2 s backoff
    #[must_use]
    pub fn slow_host() -> Self {
        Self {
            per_strategy_timeout: Duration::from_millis(SLOW_HOST_STRATEGY_TIMEOUT_MS),
            ..Self::responsive()
        }
    }

    /// Preset for a profile
    #[must_use]
    pub fn for_profile(profile: SiteProfile) -> Self {
        match profile {
            SiteProfile::Responsive => Self::responsive(),
            SiteProfile::SlowHost => Self::slow_host(),
        }
    }

    /// Restrict the strategies. They are always tried strictest first; an
    /// empty list keeps the current set.
    #[must_use]
    pub fn with_strategies(mut self, strategies: &[WaitStrategy]) -> Self {
        let mut ordered: Vec<WaitStrategy> = strategies.to_vec();
        ordered.sort_by(|a, b| b.strictness().cmp(&a.strictness()));
        ordered.dedup();
        if !ordered.is_empty() {
            self.strategies = ordered;
        }
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_strategy_timeout = timeout;
        self
    }

    /// Zero is treated as a single attempt
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn strategies(&self) -> &[WaitStrategy] {
        &self.strategies
    }

    #[must_use]
    pub const fn per_strategy_timeout(&self) -> Duration {
        self.per_strategy_timeout
    }

    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Outer attempts actually performed
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        if self.max_retries == 0 {
            1
        } else {
            self.max_retries
        }
    }
}

/// One navigation call, fixed at the moment it is issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub target_url: String,
    pub completion_strategies: Vec<WaitStrategy>,
    pub per_strategy_timeout: Duration,
    pub max_retries: u32,
}

impl NavigationRequest {
    #[must_use]
    pub fn new(target_url: impl Into<String>, policy: &NavigationPolicy) -> Self {
        Self {
            target_url: target_url.into(),
            completion_strategies: policy.strategies.clone(),
            per_strategy_timeout: policy.per_strategy_timeout,
            max_retries: policy.attempts(),
        }
    }
}

/// Result of one navigation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    pub target_url: String,
    /// Strategy that certified the page, `None` after exhausting every attempt
    pub succeeded_strategy: Option<WaitStrategy>,
    pub attempts_used: u32,
    /// Innermost failure of the final attempt, set exactly when nothing succeeded
    pub final_error: Option<String>,
    pub elapsed: Duration,
}

impl NavigationOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.succeeded_strategy.is_some()
    }

    /// Turn an exhausted outcome into the terminal navigation error
    pub fn into_result(self) -> ProbeResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ProbeError::Navigation {
                url: self.target_url,
                attempts: self.attempts_used,
                last_error: self
                    .final_error
                    .unwrap_or_else(|| "no completion signal".to_string()),
            })
        }
    }
}

/// Attempt counting and fixed backoff for the outer loop
#[derive(Debug, Clone)]
pub struct RetryBudget {
    max_attempts: u32,
    backoff: Duration,
    attempts: u32,
    last_failure: Option<String>,
    started: Instant,
}

impl RetryBudget {
    /// `max_retries` of zero still allows one attempt
    #[must_use]
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_retries.max(1),
            backoff,
            attempts: 0,
            last_failure: None,
            started: Instant::now(),
        }
    }

    /// Whether another attempt may start
    #[must_use]
    pub const fn has_remaining(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Count a new attempt and return its 1-based number
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.last_failure = Some(message.into());
    }

    /// Sleep the fixed backoff
    pub async fn wait_backoff(&self) {
        if !self.backoff.is_zero() {
            tokio::time::sleep(self.backoff).await;
        }
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Consolidated error once every attempt failed
    #[must_use]
    pub fn exhausted(&self, url: &str) -> ProbeError {
        ProbeError::Navigation {
            url: url.to_string(),
            attempts: self.attempts,
            last_error: self
                .last_failure
                .clone()
                .unwrap_or_else(|| "no completion signal".to_string()),
        }
    }
}

/// Join a relative target onto `base`; absolute URLs pass through
#[must_use]
pub fn resolve_url(base: &str, target: &str) -> String {
    let is_absolute = target.contains("://")
        || target.starts_with("about:")
        || target.starts_with("data:");
    if is_absolute || base.is_empty() {
        return target.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        target.trim_start_matches('/')
    )
}

/// Path of a URL without query or fragment (`/` for a bare host)
#[must_use]
pub fn url_path(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(url, |i| &url[i + 3..]);
    let path = after_scheme
        .find('/')
        .map_or("/", |i| &after_scheme[i..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Drives one page through navigate-with-fallback
pub struct Navigator<'a> {
    driver: &'a dyn PageDriver,
    policy: NavigationPolicy,
    base_url: String,
}

impl std::fmt::Debug for Navigator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("policy", &self.policy)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl<'a> Navigator<'a> {
    #[must_use]
    pub fn new(driver: &'a dyn PageDriver, policy: NavigationPolicy) -> Self {
        Self {
            driver,
            policy,
            base_url: String::new(),
        }
    }

    /// Resolve relative targets against `base_url`
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &NavigationPolicy {
        &self.policy
    }

    /// Navigate and report what happened, never failing
    pub async fn attempt(&self, target: &str) -> NavigationOutcome {
        let request = NavigationRequest::new(resolve_url(&self.base_url, target), &self.policy);
        self.run(&request).await
    }

    /// Navigate, failing with [`ProbeError::Navigation`] once every attempt is spent
    pub async fn navigate(&self, target: &str) -> ProbeResult<NavigationOutcome> {
        self.attempt(target).await.into_result()
    }

    /// Execute a prepared request
    pub async fn run(&self, request: &NavigationRequest) -> NavigationOutcome {
        let url = request.target_url.as_str();
        let mut budget = RetryBudget::new(request.max_retries, self.policy.backoff);

        while budget.has_remaining() {
            let attempt = budget.begin_attempt();
            info!(url, attempt, max = budget.max_attempts(), "navigating");

            match self.try_strategies(request).await {
                Ok(strategy) => {
                    info!(url, attempt, %strategy, "navigation settled");
                    return NavigationOutcome {
                        target_url: url.to_string(),
                        succeeded_strategy: Some(strategy),
                        attempts_used: attempt,
                        final_error: None,
                        elapsed: budget.elapsed(),
                    };
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "navigation attempt failed");
                    budget.record_failure(e.to_string());
                    if budget.has_remaining() {
                        budget.wait_backoff().await;
                    }
                }
            }
        }

        NavigationOutcome {
            target_url: url.to_string(),
            succeeded_strategy: None,
            attempts_used: budget.attempts(),
            final_error: budget.last_failure().map(str::to_string),
            elapsed: budget.elapsed(),
        }
    }

    /// One outer attempt: a single navigation, then weaker signals on it
    async fn try_strategies(&self, request: &NavigationRequest) -> ProbeResult<WaitStrategy> {
        let url = request.target_url.as_str();
        let timeout = request.per_strategy_timeout;
        let mut last_timeout = None;

        for (index, &strategy) in request.completion_strategies.iter().enumerate() {
            let call = async {
                if index == 0 {
                    self.driver.goto(url, strategy, timeout).await
                } else {
                    self.driver.wait_for_load_state(strategy, timeout).await
                }
            };
            match bounded(strategy.event_name(), timeout, call).await {
                Ok(()) => return Ok(strategy),
                Err(e) if e.is_timeout() => {
                    debug!(url, %strategy, "no completion signal, trying a weaker one");
                    last_timeout = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_timeout.unwrap_or_else(|| ProbeError::page("no completion strategies configured")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{AttemptScript, MockDriver, StrategyOutcome};
    use proptest::prelude::*;

    const URL: &str = "https://shop.test/";

    fn fast_policy() -> NavigationPolicy {
        NavigationPolicy::responsive()
            .with_timeout(Duration::from_secs(1))
            .with_backoff(Duration::from_millis(100))
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_presets() {
            let fast = NavigationPolicy::responsive();
            let slow = NavigationPolicy::slow_host();
            assert_eq!(fast.per_strategy_timeout(), Duration::from_secs(30));
            assert_eq!(slow.per_strategy_timeout(), Duration::from_secs(60));
            assert_eq!(fast.max_retries(), 3);
            assert_eq!(fast.backoff(), Duration::from_secs(2));
            assert_eq!(fast.strategies(), &WaitStrategy::DESCENDING);
        }

        #[test]
        fn test_zero_retries_is_one_attempt() {
            assert_eq!(NavigationPolicy::responsive().with_max_retries(0).attempts(), 1);
            assert_eq!(RetryBudget::new(0, Duration::ZERO).max_attempts(), 1);
        }

        #[test]
        fn test_strategies_are_reordered_strictest_first() {
            let policy = NavigationPolicy::responsive().with_strategies(&[
                WaitStrategy::DomContentLoaded,
                WaitStrategy::FullLoad,
                WaitStrategy::DomContentLoaded,
            ]);
            assert_eq!(
                policy.strategies(),
                &[WaitStrategy::FullLoad, WaitStrategy::DomContentLoaded]
            );
            let unchanged = NavigationPolicy::responsive().with_strategies(&[]);
            assert_eq!(unchanged.strategies().len(), 3);
        }

        #[test]
        fn test_profile_parse() {
            assert_eq!(SiteProfile::parse("SLOW"), Some(SiteProfile::SlowHost));
            assert_eq!(SiteProfile::parse("responsive"), Some(SiteProfile::Responsive));
            assert_eq!(SiteProfile::parse("glacial"), None);
            assert_eq!(
                NavigationPolicy::for_profile(SiteProfile::SlowHost),
                NavigationPolicy::slow_host()
            );
        }
    }

    mod url_tests {
        use super::*;

        #[test]
        fn test_resolve_relative() {
            assert_eq!(resolve_url("https://shop.test", "/login"), "https://shop.test/login");
            assert_eq!(resolve_url("https://shop.test/", "login"), "https://shop.test/login");
            assert_eq!(resolve_url("https://shop.test/", "/"), "https://shop.test/");
        }

        #[test]
        fn test_resolve_absolute_passthrough() {
            assert_eq!(resolve_url("https://shop.test", "https://other.test/x"), "https://other.test/x");
            assert_eq!(resolve_url("https://shop.test", "about:blank"), "about:blank");
            assert_eq!(resolve_url("", "/login"), "/login");
        }

        #[test]
        fn test_url_path() {
            assert_eq!(url_path("https://shop.test"), "/");
            assert_eq!(url_path("https://shop.test/products?search=top"), "/products");
            assert_eq!(url_path("https://shop.test/view_cart#top"), "/view_cart");
            assert_eq!(url_path("/login"), "/login");
        }
    }

    mod budget_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_budget_counts_and_consolidates() {
            let mut budget = RetryBudget::new(2, Duration::from_secs(2));
            assert_eq!(budget.begin_attempt(), 1);
            budget.record_failure("load timed out after 10ms");
            let before = Instant::now();
            budget.wait_backoff().await;
            assert_eq!(before.elapsed(), Duration::from_secs(2));
            assert_eq!(budget.begin_attempt(), 2);
            budget.record_failure("domcontentloaded timed out after 10ms");
            assert!(!budget.has_remaining());
            let text = budget.exhausted(URL).to_string();
            assert!(text.contains("after 2 attempts"));
            assert!(text.contains("domcontentloaded timed out"));
        }
    }

    mod navigator_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_full_load_success_stops_immediately() {
            let driver = MockDriver::new();
            let outcome = Navigator::new(&driver, fast_policy()).attempt(URL).await;
            assert_eq!(outcome.succeeded_strategy, Some(WaitStrategy::FullLoad));
            assert_eq!(outcome.attempts_used, 1);
            assert!(outcome.final_error.is_none());
            assert_eq!(driver.call_count("goto:"), 1);
            assert!(!driver.was_called("wait_for_load_state"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_load_never_fires_network_idle_wins() {
            let driver = MockDriver::new();
            driver.script_navigation(
                URL,
                vec![AttemptScript::ready().with(WaitStrategy::FullLoad, StrategyOutcome::Hang)],
            );
            let outcome = Navigator::new(&driver, fast_policy()).attempt(URL).await;
            assert_eq!(outcome.succeeded_strategy, Some(WaitStrategy::NetworkIdle));
            assert_eq!(outcome.attempts_used, 1);
            assert_eq!(
                driver.history(),
                vec![
                    format!("goto:{URL}:load"),
                    "wait_for_load_state:networkidle".to_string(),
                ]
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_weakest_strategy_as_last_resort() {
            let driver = MockDriver::new();
            driver.script_navigation(
                URL,
                vec![AttemptScript::all(StrategyOutcome::Timeout)
                    .with(WaitStrategy::DomContentLoaded, StrategyOutcome::Ready)],
            );
            let outcome = Navigator::new(&driver, fast_policy()).attempt(URL).await;
            assert_eq!(outcome.succeeded_strategy, Some(WaitStrategy::DomContentLoaded));
            assert_eq!(driver.call_count("goto:"), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_retry_restarts_full_strategy_list() {
            let driver = MockDriver::new();
            driver.script_navigation(
                URL,
                vec![AttemptScript::all(StrategyOutcome::Timeout), AttemptScript::ready()],
            );
            let outcome = Navigator::new(&driver, fast_policy()).attempt(URL).await;
            assert_eq!(outcome.succeeded_strategy, Some(WaitStrategy::FullLoad));
            assert_eq!(outcome.attempts_used, 2);
            assert_eq!(driver.call_count("goto:"), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_unreachable_host_uses_every_attempt_with_backoff() {
            let driver = MockDriver::new();
            driver.script_navigation(URL, vec![AttemptScript::unreachable()]);
            let policy = NavigationPolicy::responsive();
            let started = Instant::now();
            let err = Navigator::new(&driver, policy)
                .navigate(URL)
                .await
                .unwrap_err();
            match err {
                ProbeError::Navigation { url, attempts, last_error } => {
                    assert_eq!(url, URL);
                    assert_eq!(attempts, 3);
                    assert!(last_error.contains("ERR_NAME_NOT_RESOLVED"));
                }
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(started.elapsed(), Duration::from_secs(4));
            assert_eq!(driver.call_count("goto:"), 3);
            assert!(!driver.was_called("wait_for_load_state"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_exhausted_error_names_innermost_timeout() {
            let driver = MockDriver::new();
            driver.script_navigation(URL, vec![AttemptScript::all(StrategyOutcome::Hang)]);
            let err = Navigator::new(&driver, fast_policy().with_max_retries(2))
                .navigate(URL)
                .await
                .unwrap_err();
            let text = err.to_string();
            assert!(text.contains("after 2 attempts"));
            assert!(text.contains("domcontentloaded timed out after 1000ms"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_same_url_twice_reruns_strategies() {
            let driver = MockDriver::new();
            driver.script_navigation(
                URL,
                vec![AttemptScript::ready().with(WaitStrategy::FullLoad, StrategyOutcome::Timeout)],
            );
            let navigator = Navigator::new(&driver, fast_policy());
            let first = navigator.attempt(URL).await;
            let second = navigator.attempt(URL).await;
            assert_eq!(first.succeeded_strategy, Some(WaitStrategy::NetworkIdle));
            assert_eq!(second.succeeded_strategy, Some(WaitStrategy::NetworkIdle));
            assert_eq!(driver.call_count(&format!("goto:{URL}:load")), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_relative_target_uses_base_url() {
            let driver = MockDriver::new();
            let outcome = Navigator::new(&driver, fast_policy())
                .with_base_url("https://shop.test")
                .attempt("/products")
                .await;
            assert_eq!(outcome.target_url, "https://shop.test/products");
            assert_eq!(
                driver.current_url().await.unwrap(),
                "https://shop.test/products"
            );
        }
    }

    fn run_paused<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn prop_always_failing_target_uses_exactly_n_attempts(
            retries in 1u32..6,
            hard_failure in any::<bool>(),
        ) {
            let driver = MockDriver::new();
            let script = if hard_failure {
                AttemptScript::unreachable()
            } else {
                AttemptScript::all(StrategyOutcome::Timeout)
            };
            driver.script_navigation(URL, vec![script]);
            let policy = fast_policy().with_max_retries(retries);
            let outcome = run_paused(Navigator::new(&driver, policy).attempt(URL));
            prop_assert!(outcome.succeeded_strategy.is_none());
            prop_assert_eq!(outcome.attempts_used, retries);
            prop_assert!(outcome.final_error.is_some());
            prop_assert_eq!(driver.call_count("goto:"), retries as usize);
        }

        #[test]
        fn prop_no_weaker_strategy_after_success(
            succeed_at in 0usize..3,
            attempt in 0usize..3,
        ) {
            let driver = MockDriver::new();
            let mut winning = AttemptScript::all(StrategyOutcome::Timeout);
            winning = winning.with(WaitStrategy::DESCENDING[succeed_at], StrategyOutcome::Ready);
            let mut scripts = vec![AttemptScript::all(StrategyOutcome::Timeout); attempt];
            scripts.push(winning);
            driver.script_navigation(URL, scripts);

            let outcome = run_paused(Navigator::new(&driver, fast_policy()).attempt(URL));
            prop_assert_eq!(outcome.succeeded_strategy, Some(WaitStrategy::DESCENDING[succeed_at]));
            prop_assert_eq!(outcome.attempts_used as usize, attempt + 1);

            let history = driver.history();
            let tail_start = history
                .iter()
                .rposition(|c| c.starts_with("goto:"))
                .unwrap();
            let final_attempt = &history[tail_start..];
            prop_assert_eq!(final_attempt.len(), succeed_at + 1);
            for weaker in &WaitStrategy::DESCENDING[succeed_at + 1..] {
                let weaker_call = format!("wait_for_load_state:{weaker}");
                prop_assert!(!final_attempt.contains(&weaker_call));
            }
        }
    }
}
