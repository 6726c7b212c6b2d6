//! Page Object Model support.
//!
//! A page object names the elements of one screen and the actions a journey
//! performs on it. Opening a page always goes through navigate-with-fallback
//! followed by settle-and-wait, so every page gets the same resilience.

use crate::driver::PageDriver;
use crate::locator::Selector;
use crate::navigation::{resolve_url, url_path, NavigationOutcome, NavigationPolicy, Navigator};
use crate::readiness::{settle, Landmark, PageReadinessCheck, ReadinessPolicy};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{bounded, ElementState};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Default site under test
pub const DEFAULT_BASE_URL: &str = "https://automationexercise.com";

/// Default directory for page screenshots
pub const DEFAULT_SCREENSHOT_DIR: &str = "test-results/screenshots";

/// Where the site lives and how patient to be with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub base_url: String,
    pub navigation: NavigationPolicy,
    pub readiness: ReadinessPolicy,
    pub screenshot_dir: PathBuf,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SiteSettings {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            navigation: NavigationPolicy::default(),
            readiness: ReadinessPolicy::default(),
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
        }
    }

    #[must_use]
    pub fn with_navigation(mut self, policy: NavigationPolicy) -> Self {
        self.navigation = policy;
        self
    }

    #[must_use]
    pub fn with_readiness(mut self, policy: ReadinessPolicy) -> Self {
        self.readiness = policy;
        self
    }

    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Absolute URL for a site path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        resolve_url(&self.base_url, path)
    }
}

/// Driver plus site settings, handed to every page object
#[derive(Clone, Copy)]
pub struct PageContext<'a> {
    pub driver: &'a dyn PageDriver,
    pub site: &'a SiteSettings,
}

impl std::fmt::Debug for PageContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("base_url", &self.site.base_url)
            .finish_non_exhaustive()
    }
}

impl<'a> PageContext<'a> {
    #[must_use]
    pub const fn new(driver: &'a dyn PageDriver, site: &'a SiteSettings) -> Self {
        Self { driver, site }
    }

    /// Navigator configured from the site settings
    #[must_use]
    pub fn navigator(&self) -> Navigator<'a> {
        Navigator::new(self.driver, self.site.navigation.clone())
            .with_base_url(self.site.base_url.clone())
    }

    /// Helpers shared by every page
    #[must_use]
    pub const fn base(&self) -> BasePage<'a> {
        BasePage { ctx: *self }
    }
}

/// Navigation and readiness report of [`PageObject::open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageVisit {
    pub navigation: NavigationOutcome,
    pub readiness: PageReadinessCheck,
}

/// A screen of the site under test.
///
/// Implementors provide the path and the landmarks that prove the page
/// rendered; opening and readiness come for free.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Name used in logs and readiness errors
    fn name(&self) -> &'static str;

    /// Site path, possibly with `:param` or `*` segments
    fn path(&self) -> &str;

    /// Elements that must be visible before the page is usable
    fn landmarks(&self) -> Vec<Landmark>;

    fn context(&self) -> PageContext<'_>;

    /// Navigate to the page and wait for it to settle
    async fn open(&self) -> ProbeResult<PageVisit> {
        let ctx = self.context();
        let navigation = ctx.navigator().navigate(self.path()).await?;
        let readiness = self.wait_until_ready().await?;
        Ok(PageVisit {
            navigation,
            readiness,
        })
    }

    /// Settle-and-wait on whatever document is loaded now
    async fn wait_until_ready(&self) -> ProbeResult<PageReadinessCheck> {
        let ctx = self.context();
        settle(
            ctx.driver,
            &ctx.site.readiness,
            self.name(),
            &self.landmarks(),
        )
        .await
    }

    /// Whether the current URL matches [`PageObject::path`]
    async fn is_current(&self) -> ProbeResult<bool> {
        let url = self.context().driver.current_url().await?;
        Ok(UrlMatcher::new(self.path()).matches(url_path(&url)))
    }
}

/// Helpers every page shares
#[derive(Debug, Clone, Copy)]
pub struct BasePage<'a> {
    ctx: PageContext<'a>,
}

impl BasePage<'_> {
    pub async fn title(&self) -> ProbeResult<String> {
        self.ctx.driver.title().await
    }

    /// Text of the first `h1`
    pub async fn heading(&self) -> ProbeResult<Option<String>> {
        self.ctx
            .driver
            .text_content(&Selector::css("h1").first())
            .await
    }

    pub async fn current_url(&self) -> ProbeResult<String> {
        self.ctx.driver.current_url().await
    }

    pub async fn url_contains(&self, fragment: &str) -> ProbeResult<bool> {
        Ok(self.current_url().await?.contains(fragment))
    }

    /// Match the current URL against a regular expression
    pub async fn url_matches(&self, pattern: &str) -> ProbeResult<bool> {
        let re = Regex::new(pattern).map_err(|e| ProbeError::Config {
            message: format!("invalid URL pattern {pattern:?}: {e}"),
        })?;
        Ok(re.is_match(&self.current_url().await?))
    }

    /// First alert whose text mentions an error or failure
    pub async fn error_message(&self) -> ProbeResult<Option<String>> {
        self.alert_matching(r"(?i)error|failed").await
    }

    /// First alert whose text mentions success or completion
    pub async fn success_message(&self) -> ProbeResult<Option<String>> {
        self.alert_matching(r"(?i)success|completed").await
    }

    async fn alert_matching(&self, pattern: &str) -> ProbeResult<Option<String>> {
        let re = Regex::new(pattern).map_err(|e| ProbeError::Config {
            message: e.to_string(),
        })?;
        let alerts = self
            .ctx
            .driver
            .all_text_contents(&Selector::role("alert", None))
            .await?;
        Ok(alerts.into_iter().find(|text| re.is_match(text)))
    }

    pub async fn wait_for_visible(&self, selector: &Selector, timeout: Duration) -> ProbeResult<()> {
        self.wait_for(selector, ElementState::Visible, timeout).await
    }

    pub async fn wait_for_hidden(&self, selector: &Selector, timeout: Duration) -> ProbeResult<()> {
        self.wait_for(selector, ElementState::Hidden, timeout).await
    }

    async fn wait_for(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
    ) -> ProbeResult<()> {
        bounded(
            &format!("waiting for {selector} to be {state}"),
            timeout,
            self.ctx.driver.wait_for_selector(selector, state, timeout),
        )
        .await
    }

    /// The configured busy indicator is on screen
    pub async fn is_loading(&self) -> ProbeResult<bool> {
        match &self.ctx.site.readiness.spinner {
            Some(spinner) => self.ctx.driver.is_visible(spinner).await,
            None => Ok(false),
        }
    }

    /// Reload and settle
    pub async fn refresh(&self) -> ProbeResult<PageReadinessCheck> {
        self.ctx
            .driver
            .reload(self.ctx.site.navigation.per_strategy_timeout())
            .await?;
        self.settle_current().await
    }

    pub async fn go_back(&self) -> ProbeResult<PageReadinessCheck> {
        self.ctx
            .driver
            .go_back(self.ctx.site.navigation.per_strategy_timeout())
            .await?;
        self.settle_current().await
    }

    pub async fn go_forward(&self) -> ProbeResult<PageReadinessCheck> {
        self.ctx
            .driver
            .go_forward(self.ctx.site.navigation.per_strategy_timeout())
            .await?;
        self.settle_current().await
    }

    /// Settle-and-wait on the current document without page landmarks
    pub async fn settle_current(&self) -> ProbeResult<PageReadinessCheck> {
        settle(self.ctx.driver, &self.ctx.site.readiness, "current page", &[]).await
    }

    pub async fn scroll_to_bottom(&self) -> ProbeResult<()> {
        let _ = self
            .ctx
            .driver
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await?;
        Ok(())
    }

    pub async fn scroll_to_top(&self) -> ProbeResult<()> {
        let _ = self.ctx.driver.evaluate("window.scrollTo(0, 0)").await?;
        Ok(())
    }

    /// Vertical scroll offset in CSS pixels
    pub async fn scroll_offset(&self) -> ProbeResult<f64> {
        let value = self.ctx.driver.evaluate("window.scrollY").await?;
        Ok(value.as_f64().unwrap_or(0.0))
    }

    /// Answer every later `confirm()` with OK and silence `alert()`
    pub async fn accept_dialogs(&self) -> ProbeResult<()> {
        let _ = self
            .ctx
            .driver
            .evaluate("window.confirm = () => true; window.alert = () => {}; true")
            .await?;
        Ok(())
    }

    /// Save a PNG of the viewport as `<screenshot_dir>/<name>.png`
    pub async fn screenshot(&self, name: &str) -> ProbeResult<PathBuf> {
        let bytes = self.ctx.driver.screenshot().await?;
        let dir = &self.ctx.site.screenshot_dir;
        std::fs::create_dir_all(dir).map_err(|e| ProbeError::Screenshot {
            message: format!("cannot create {}: {e}", dir.display()),
        })?;
        let path = dir.join(format!("{}.png", sanitize_file_name(name)));
        std::fs::write(&path, bytes).map_err(|e| ProbeError::Screenshot {
            message: format!("cannot write {}: {e}", path.display()),
        })?;
        debug!(path = %path.display(), "screenshot saved");
        Ok(path)
    }

    /// Like [`BasePage::screenshot`] but only logs failures
    pub async fn try_screenshot(&self, name: &str) -> Option<PathBuf> {
        match self.screenshot(name).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(name, error = %e, "screenshot skipped");
                None
            }
        }
    }
}

/// Replace characters that are awkward in file names
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// URL pattern matcher for page paths
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Patterns support literal segments (`/login`), wildcards
    /// (`/category_products/*`) and named parameters (`/product_details/:id`)
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Wildcards and parameters each consume exactly one segment
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if path_segments.len() != self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(&path_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit == actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    #[must_use]
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.segments
            .iter()
            .zip(&path_segments)
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), (*value).to_string())),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
