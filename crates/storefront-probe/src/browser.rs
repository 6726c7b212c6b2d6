//! Chromium control over the Chrome `DevTools` Protocol.
//!
//! [`ChromiumBrowser`] owns one Chromium process for the whole run. Every
//! [`ChromiumPage`] lives in its own browser context, so cookies and storage
//! never leak between journeys. Element operations are compiled from
//! [`Selector`]s into page scripts; load states are observed by polling the
//! document.

use crate::driver::{DriverConfig, PageDriver};
use crate::fixture::{Session, SessionFactory};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::storage_state::{Cookie, OriginState, StorageEntry, StorageState};
use crate::wait::{
    poll_until, ElementState, WaitStrategy, DEFAULT_POLL_INTERVAL_MS, NETWORK_IDLE_THRESHOLD_MS,
};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::input::{DispatchMouseEventParams, DispatchMouseEventType};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetCookiesParams};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat, CaptureScreenshotParams,
    GetNavigationHistoryParams, NavigateParams, NavigateToHistoryEntryParams,
};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Default budget for an element action to find its target
const DEFAULT_ACTION_TIMEOUT_MS: u64 = 10_000;

fn launch_error(e: impl std::fmt::Display) -> ProbeError {
    let message = e.to_string();
    if message.contains("Could not auto detect") {
        ProbeError::BrowserNotFound
    } else {
        ProbeError::BrowserLaunch { message }
    }
}

fn page_error(e: impl std::fmt::Display) -> ProbeError {
    ProbeError::page(e.to_string())
}

/// Origin-qualified URL a saved cookie belongs to
fn cookie_url(cookie: &Cookie) -> String {
    let scheme = if cookie.secure { "https" } else { "http" };
    let host = cookie.domain.trim_start_matches('.');
    let path = if cookie.path.starts_with('/') {
        cookie.path.as_str()
    } else {
        "/"
    };
    format!("{scheme}://{host}{path}")
}

/// JSON-encoded string literal, valid in page scripts
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// A running Chromium process
#[derive(Debug)]
pub struct ChromiumBrowser {
    config: DriverConfig,
    inner: Arc<Mutex<Option<CdpBrowser>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launch Chromium and start driving its event handler
    pub async fn launch(config: DriverConfig) -> ProbeResult<Self> {
        debug!(?config, "launching chromium");
        let mut builder = CdpConfig::builder();

        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder
            .window_size(config.viewport_width, config.viewport_height)
            .arg("--disable-dev-shm-usage");
        if config.ignore_https_errors {
            builder = builder.arg("--ignore-certificate-errors");
        }

        // Separate profile per launch so parallel runs never share a singleton lock
        let user_data_dir =
            std::env::temp_dir().join(format!("storefront-probe-{}", uuid::Uuid::new_v4()));
        builder = builder.user_data_dir(user_data_dir);

        for arg in &config.extra_args {
            builder = builder.arg(arg.clone());
        }

        let cdp_config = builder.build().map_err(launch_error)?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(launch_error)?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser handler event error");
                }
            }
        });

        debug!("chromium launched");
        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(Some(browser))),
            handle,
        })
    }

    /// The launch configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Open a blank page in a fresh browser context
    pub async fn new_page(&self) -> ProbeResult<ChromiumPage> {
        let guard = self.inner.lock().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| ProbeError::page("browser already closed"))?;

        let context_id = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(page_error)?
            .result
            .browser_context_id;

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(page_error)?;
        let page = browser.new_page(target).await.map_err(page_error)?;
        drop(guard);

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(self.config.viewport_width),
            i64::from(self.config.viewport_height),
            1.0,
            false,
        ))
        .await
        .map_err(page_error)?;

        if let Some(ref ua) = self.config.user_agent {
            page.execute(SetUserAgentOverrideParams::new(ua.clone()))
                .await
                .map_err(page_error)?;
        }

        Ok(ChromiumPage {
            page,
            browser: Arc::clone(&self.inner),
            context_id,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            action_timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
        })
    }

    /// Close the browser process
    pub async fn close(&self) -> ProbeResult<()> {
        let mut guard = self.inner.lock().await;
        if let Some(mut browser) = guard.take() {
            debug!("closing chromium");
            browser.close().await.map_err(launch_error)?;
            let _ = browser.wait().await;
        }
        self.handle.abort();
        Ok(())
    }
}

/// One page in an isolated browser context
#[derive(Debug)]
pub struct ChromiumPage {
    page: CdpPage,
    browser: Arc<Mutex<Option<CdpBrowser>>>,
    context_id: BrowserContextId,
    poll_interval: Duration,
    action_timeout: Duration,
}

impl ChromiumPage {
    /// Override the budget an action waits for its element
    #[must_use]
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    async fn eval(&self, script: &str) -> ProbeResult<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ProbeError::Script {
                message: e.to_string(),
            })?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn eval_bool(&self, script: &str) -> ProbeResult<bool> {
        Ok(self.eval(script).await?.as_bool().unwrap_or(false))
    }

    async fn ready_state(&self) -> ProbeResult<String> {
        Ok(self
            .eval("document.readyState")
            .await?
            .as_str()
            .unwrap_or("loading")
            .to_string())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> ProbeResult<()> {
        let quiet = Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS);
        let deadline = tokio::time::Instant::now() + timeout;
        let mut last_count: Option<u64> = None;
        let mut quiet_since = tokio::time::Instant::now();

        loop {
            let probe = self
                .eval("document.readyState + ':' + performance.getEntriesByType('resource').length")
                .await;
            if let Ok(serde_json::Value::String(s)) = probe {
                let (state, count) = s.split_once(':').unwrap_or(("loading", "0"));
                let count = count.parse::<u64>().unwrap_or(0);
                if last_count == Some(count) {
                    if state != "loading" && quiet_since.elapsed() >= quiet {
                        return Ok(());
                    }
                } else {
                    last_count = Some(count);
                    quiet_since = tokio::time::Instant::now();
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ProbeError::timeout(
                    WaitStrategy::NetworkIdle.event_name(),
                    timeout.as_millis() as u64,
                ));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Run `body` against the first match once it is attached
    async fn act(&self, selector: &Selector, body: &str) -> ProbeResult<()> {
        self.wait_for_selector(selector, ElementState::Attached, self.action_timeout)
            .await
            .map_err(|_| ProbeError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; {body}; return true; }})()",
            selector.to_query()
        );
        if self.eval_bool(&script).await? {
            Ok(())
        } else {
            Err(ProbeError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn traverse_history(&self, delta: i64, timeout: Duration) -> ProbeResult<()> {
        let history = self
            .page
            .execute(GetNavigationHistoryParams::default())
            .await
            .map_err(page_error)?;
        let index = history.result.current_index + delta;
        let Some(entry) = usize::try_from(index)
            .ok()
            .and_then(|i| history.result.entries.get(i))
        else {
            return Ok(());
        };
        let target_url = entry.url.clone();
        self.page
            .execute(NavigateToHistoryEntryParams::new(entry.id))
            .await
            .map_err(page_error)?;

        let check = format!(
            "location.href === {} && document.readyState !== 'loading'",
            js_str(&target_url)
        );
        let check = check.as_str();
        poll_until("history navigation", timeout, self.poll_interval, move || {
            self.eval_bool(check)
        })
        .await
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn goto(&self, url: &str, strategy: WaitStrategy, timeout: Duration) -> ProbeResult<()> {
        debug!(url, %strategy, ?timeout, "goto");
        let started = tokio::time::Instant::now();
        let response = tokio::time::timeout(timeout, self.page.execute(NavigateParams::new(url)))
            .await
            .map_err(|_| ProbeError::timeout(strategy.event_name(), timeout.as_millis() as u64))?
            .map_err(|e| ProbeError::NavigationFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if let Some(error_text) = response.result.error_text.as_deref() {
            if !error_text.is_empty() {
                return Err(ProbeError::NavigationFailed {
                    url: url.to_string(),
                    message: error_text.to_string(),
                });
            }
        }

        let remaining = timeout.saturating_sub(started.elapsed());
        self.wait_for_load_state(strategy, remaining)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::timeout(strategy.event_name(), timeout.as_millis() as u64)
                } else {
                    e
                }
            })
    }

    async fn wait_for_load_state(
        &self,
        strategy: WaitStrategy,
        timeout: Duration,
    ) -> ProbeResult<()> {
        debug!(%strategy, ?timeout, "wait_for_load_state");
        match strategy {
            WaitStrategy::FullLoad => {
                poll_until(strategy.event_name(), timeout, self.poll_interval, move || async move {
                    Ok::<_, ProbeError>(self.ready_state().await? == "complete")
                })
                .await
            }
            WaitStrategy::DomContentLoaded => {
                poll_until(strategy.event_name(), timeout, self.poll_interval, move || async move {
                    Ok::<_, ProbeError>(self.ready_state().await? != "loading")
                })
                .await
            }
            WaitStrategy::NetworkIdle => self.wait_for_network_idle(timeout).await,
        }
    }

    async fn wait_for_selector(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
    ) -> ProbeResult<()> {
        let script = match state {
            ElementState::Attached => format!("({}) !== null", selector.to_query()),
            ElementState::Visible => selector.to_visible_query(),
            ElementState::Hidden => format!("!({})", selector.to_visible_query()),
        };
        let script = script.as_str();
        let operation = format!("waiting for {selector} to be {state}");
        poll_until(&operation, timeout, self.poll_interval, move || {
            self.eval_bool(script)
        })
        .await
    }

    async fn click(&self, selector: &Selector) -> ProbeResult<()> {
        debug!(%selector, "click");
        self.act(selector, "el.scrollIntoView({block: 'center'}); el.click()")
            .await
    }

    async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
        debug!(%selector, "fill");
        let body = format!(
            "el.focus(); \
             const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
             Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {}); \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}}))",
            js_str(value)
        );
        self.act(selector, &body).await
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
        debug!(%selector, value, "select_option");
        let body = format!(
            "const v = {}; \
             const opt = Array.from(el.options).find(o => o.value === v || o.text.trim() === v); \
             if (!opt) return false; \
             el.value = opt.value; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}}))",
            js_str(value)
        );
        self.act(selector, &body).await
    }

    async fn set_checked(&self, selector: &Selector, checked: bool) -> ProbeResult<()> {
        debug!(%selector, checked, "set_checked");
        let body = format!("if (el.checked !== {checked}) el.click()");
        self.act(selector, &body).await
    }

    async fn hover(&self, selector: &Selector) -> ProbeResult<()> {
        debug!(%selector, "hover");
        self.act(
            selector,
            "el.scrollIntoView({block: 'center'}); \
             el.dispatchEvent(new MouseEvent('mouseover', {bubbles: true})); \
             el.dispatchEvent(new MouseEvent('mouseenter', {bubbles: false}))",
        )
        .await?;

        let centre = format!(
            "(() => {{ const r = ({}).getBoundingClientRect(); return (r.left + r.width / 2) + ',' + (r.top + r.height / 2); }})()",
            selector.to_query()
        );
        if let serde_json::Value::String(point) = self.eval(&centre).await? {
            if let Some((x, y)) = point.split_once(',') {
                let x = x.parse::<f64>().unwrap_or(0.0);
                let y = y.parse::<f64>().unwrap_or(0.0);
                self.page
                    .execute(DispatchMouseEventParams::new(
                        DispatchMouseEventType::MouseMoved,
                        x,
                        y,
                    ))
                    .await
                    .map_err(page_error)?;
            }
        }
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &Selector) -> ProbeResult<()> {
        self.act(selector, "el.scrollIntoView({block: 'center'})")
            .await
    }

    async fn text_content(&self, selector: &Selector) -> ProbeResult<Option<String>> {
        let script = format!(
            "(() => {{ const el = {}; return el ? el.textContent : null; }})()",
            selector.to_query()
        );
        Ok(self.eval(&script).await?.as_str().map(str::to_string))
    }

    async fn all_text_contents(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
        let script = format!(
            "JSON.stringify(({}).map(el => el.textContent || ''))",
            selector.to_all_query()
        );
        match self.eval(&script).await? {
            serde_json::Value::String(json) => Ok(serde_json::from_str(&json)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn is_visible(&self, selector: &Selector) -> ProbeResult<bool> {
        self.eval_bool(&selector.to_visible_query()).await
    }

    async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
        let n = self.eval(&selector.to_count_query()).await?;
        Ok(n.as_u64().unwrap_or(0) as usize)
    }

    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value> {
        self.eval(script).await
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self
            .eval("location.href")
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn title(&self) -> ProbeResult<String> {
        Ok(self
            .eval("document.title")
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn reload(&self, timeout: Duration) -> ProbeResult<()> {
        debug!("reload");
        tokio::time::timeout(timeout, self.page.reload())
            .await
            .map_err(|_| ProbeError::timeout("reload", timeout.as_millis() as u64))?
            .map_err(page_error)?;
        self.wait_for_load_state(WaitStrategy::DomContentLoaded, timeout)
            .await
    }

    async fn go_back(&self, timeout: Duration) -> ProbeResult<()> {
        debug!("go_back");
        self.traverse_history(-1, timeout).await
    }

    async fn go_forward(&self, timeout: Duration) -> ProbeResult<()> {
        debug!("go_forward");
        self.traverse_history(1, timeout).await
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })?;

        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn storage_state(&self) -> ProbeResult<StorageState> {
        let storage_error = |e: chromiumoxide::error::CdpError| ProbeError::StorageState {
            message: e.to_string(),
        };
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(|c| Cookie {
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                expires: c.expires,
                http_only: c.http_only,
                secure: c.secure,
                same_site: c
                    .same_site
                    .map_or_else(|| "Lax".to_string(), |s| format!("{s:?}")),
            })
            .collect();

        let origin = self.eval("location.origin").await?;
        let entries = self
            .eval("JSON.stringify(Object.entries(localStorage))")
            .await
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .and_then(|json| serde_json::from_str::<Vec<(String, String)>>(&json).ok())
            .unwrap_or_default();

        let mut origins = Vec::new();
        if let Some(origin) = origin.as_str().filter(|o| o.starts_with("http")) {
            origins.push(OriginState {
                origin: origin.to_string(),
                local_storage: entries
                    .into_iter()
                    .map(|(name, value)| StorageEntry { name, value })
                    .collect(),
            });
        }

        Ok(StorageState { cookies, origins })
    }

    async fn apply_storage_state(&self, state: &StorageState) -> ProbeResult<()> {
        let cookies = state
            .cookies
            .iter()
            .map(|c| {
                CookieParam::builder()
                    .name(c.name.clone())
                    .value(c.value.clone())
                    .url(cookie_url(c))
                    .domain(c.domain.clone())
                    .path(c.path.clone())
                    .secure(c.secure)
                    .http_only(c.http_only)
                    .build()
                    .map_err(|message| ProbeError::StorageState { message })
            })
            .collect::<ProbeResult<Vec<_>>>()?;

        // Page::set_cookies scopes cookies to the current URL, which a fresh
        // about:blank page rejects. Each cookie carries its own url instead.
        if !cookies.is_empty() {
            self.page
                .execute(SetCookiesParams::new(cookies))
                .await
                .map_err(|e| ProbeError::StorageState {
                    message: e.to_string(),
                })?;
        }

        for origin in &state.origins {
            let items = serde_json::to_string(
                &origin
                    .local_storage
                    .iter()
                    .map(|e| (e.name.as_str(), e.value.as_str()))
                    .collect::<Vec<_>>(),
            )?;
            let script = format!(
                "if (location.origin === {}) {{ for (const [k, v] of {items}) localStorage.setItem(k, v); }}",
                js_str(&origin.origin)
            );
            self.page
                .execute(AddScriptToEvaluateOnNewDocumentParams::new(script))
                .await
                .map_err(|e| ProbeError::StorageState {
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    async fn close(&self) -> ProbeResult<()> {
        debug!("closing page context");
        let page_result = self.page.clone().close().await.map_err(page_error);
        let guard = self.browser.lock().await;
        if let Some(browser) = guard.as_ref() {
            browser
                .execute(DisposeBrowserContextParams::new(self.context_id.clone()))
                .await
                .map_err(page_error)?;
        }
        page_result
    }
}

/// Opens one isolated page per journey on a shared browser
#[derive(Debug, Clone)]
pub struct ChromiumSessionFactory {
    browser: Arc<ChromiumBrowser>,
}

impl ChromiumSessionFactory {
    /// Wrap a launched browser
    #[must_use]
    pub fn new(browser: Arc<ChromiumBrowser>) -> Self {
        Self { browser }
    }

    /// Shut the browser down, logging instead of failing
    pub async fn shutdown(&self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser shutdown failed");
        }
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn open(&self) -> ProbeResult<Session> {
        let page = self.browser.new_page().await?;
        Ok(Session::new(Arc::new(page)))
    }
}
