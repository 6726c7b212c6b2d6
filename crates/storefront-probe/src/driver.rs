//! PageDriver - the browser automation seam
//!
//! Every browser interaction a journey performs is a suspension point on this
//! trait. Page objects, navigation and readiness only ever talk to a
//! `&dyn PageDriver`, so the same code runs against Chromium and against the
//! scripted [`MockDriver`](crate::mock::MockDriver).
//!
//! Implementations must report an exceeded wait as [`ProbeError::Timeout`];
//! navigation uses that classification to decide whether to fall back to a
//! weaker [`WaitStrategy`].
//!
//! [`ProbeError::Timeout`]: crate::result::ProbeError::Timeout

use crate::locator::Selector;
use crate::result::ProbeResult;
use crate::storage_state::StorageState;
use crate::wait::{ElementState, WaitStrategy};
use async_trait::async_trait;
use std::time::Duration;

/// Browser automation operations used by page objects
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Start a navigation to `url` and wait for `strategy`
    async fn goto(&self, url: &str, strategy: WaitStrategy, timeout: Duration) -> ProbeResult<()>;

    /// Wait for `strategy` on the navigation already in flight
    async fn wait_for_load_state(&self, strategy: WaitStrategy, timeout: Duration)
        -> ProbeResult<()>;

    /// Wait until the first match of `selector` reaches `state`
    async fn wait_for_selector(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
    ) -> ProbeResult<()>;

    /// Click the first match
    async fn click(&self, selector: &Selector) -> ProbeResult<()>;

    /// Replace the value of the first matching input
    async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<()>;

    /// Select an option by value or visible label
    async fn select_option(&self, selector: &Selector, value: &str) -> ProbeResult<()>;

    /// Check or uncheck a checkbox or radio
    async fn set_checked(&self, selector: &Selector, checked: bool) -> ProbeResult<()>;

    /// Move the pointer over the first match
    async fn hover(&self, selector: &Selector) -> ProbeResult<()>;

    /// Scroll the first match into view
    async fn scroll_into_view(&self, selector: &Selector) -> ProbeResult<()>;

    /// Text of the first match, `None` when nothing matches
    async fn text_content(&self, selector: &Selector) -> ProbeResult<Option<String>>;

    /// Text of every match
    async fn all_text_contents(&self, selector: &Selector) -> ProbeResult<Vec<String>>;

    /// Whether the first match is rendered
    async fn is_visible(&self, selector: &Selector) -> ProbeResult<bool>;

    /// Number of matches
    async fn count(&self, selector: &Selector) -> ProbeResult<usize>;

    /// Evaluate a script in the page
    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value>;

    /// Current document URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Current document title
    async fn title(&self) -> ProbeResult<String>;

    /// Reload and wait for `domcontentloaded`
    async fn reload(&self, timeout: Duration) -> ProbeResult<()>;

    /// History back
    async fn go_back(&self, timeout: Duration) -> ProbeResult<()>;

    /// History forward
    async fn go_forward(&self, timeout: Duration) -> ProbeResult<()>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Snapshot cookies and local storage
    async fn storage_state(&self) -> ProbeResult<StorageState>;

    /// Restore cookies and local storage
    async fn apply_storage_state(&self, state: &StorageState) -> ProbeResult<()>;

    /// Close the page and its browser
    async fn close(&self) -> ProbeResult<()>;
}

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// User agent string
    pub user_agent: Option<String>,
    /// Executable path override
    pub executable_path: Option<String>,
    /// Chromium sandbox (disabled in containers)
    pub sandbox: bool,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
    /// Extra command-line switches
    pub extra_args: Vec<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            user_agent: None,
            executable_path: None,
            sandbox: false,
            ignore_https_errors: true,
            extra_args: Vec::new(),
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the Chromium executable
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Enable or disable the Chromium sandbox
    #[must_use]
    pub const fn sandbox(mut self, enabled: bool) -> Self {
        self.sandbox = enabled;
        self
    }

    /// Accept or reject invalid certificates
    #[must_use]
    pub const fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }

    /// Append a command-line switch
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}
