//! Scripted in-memory page for tests.
//!
//! [`MockDriver`] answers every [`PageDriver`] call from tables set up by the
//! test: navigation scripts decide how each wait strategy behaves on each
//! attempt, an element table decides what selectors match, and click
//! reactions change that table or the URL. Every call is recorded.

use crate::driver::PageDriver;
use crate::fixture::{Session, SessionFactory};
use crate::locator::Selector;
use crate::navigation::{resolve_url, url_path};
use crate::pages::{HomePage, LoginPage};
use crate::readiness::STRUCTURAL_LANDMARK_SELECTOR;
use crate::result::{ProbeError, ProbeResult};
use crate::storage_state::StorageState;
use crate::wait::{ElementState, WaitStrategy};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Scope key for elements present on every page
const ANY_PAGE: &str = "*";

/// Minimal PNG signature returned by [`MockDriver::screenshot`]
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// How a scripted wait strategy behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// The signal arrives immediately
    Ready,
    /// The driver reports a timeout once the budget elapses
    Timeout,
    /// The driver never answers
    Hang,
    /// The navigation cannot be committed (DNS failure, refused connection)
    Fail,
}

/// Behaviour of each strategy during one navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptScript {
    full_load: StrategyOutcome,
    network_idle: StrategyOutcome,
    dom_content_loaded: StrategyOutcome,
}

impl AttemptScript {
    /// Every strategy succeeds
    #[must_use]
    pub const fn ready() -> Self {
        Self::all(StrategyOutcome::Ready)
    }

    /// Every strategy behaves the same way
    #[must_use]
    pub const fn all(outcome: StrategyOutcome) -> Self {
        Self {
            full_load: outcome,
            network_idle: outcome,
            dom_content_loaded: outcome,
        }
    }

    /// The host cannot be reached at all
    #[must_use]
    pub const fn unreachable() -> Self {
        Self::all(StrategyOutcome::Fail)
    }

    /// Override one strategy
    #[must_use]
    pub const fn with(mut self, strategy: WaitStrategy, outcome: StrategyOutcome) -> Self {
        match strategy {
            WaitStrategy::FullLoad => self.full_load = outcome,
            WaitStrategy::NetworkIdle => self.network_idle = outcome,
            WaitStrategy::DomContentLoaded => self.dom_content_loaded = outcome,
        }
        self
    }

    /// Outcome scripted for `strategy`
    #[must_use]
    pub const fn outcome(&self, strategy: WaitStrategy) -> StrategyOutcome {
        match strategy {
            WaitStrategy::FullLoad => self.full_load,
            WaitStrategy::NetworkIdle => self.network_idle,
            WaitStrategy::DomContentLoaded => self.dom_content_loaded,
        }
    }
}

impl Default for AttemptScript {
    fn default() -> Self {
        Self::ready()
    }
}

/// An entry in the element table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    pub visible: bool,
    pub texts: Vec<String>,
}

impl MockElement {
    /// A single rendered element with no text
    #[must_use]
    pub fn visible() -> Self {
        Self {
            visible: true,
            texts: vec![String::new()],
        }
    }

    /// A single element in the DOM but not rendered
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            visible: false,
            texts: vec![String::new()],
        }
    }

    /// A single rendered element with `text`
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            visible: true,
            texts: vec![text.into()],
        }
    }

    /// One rendered element per text
    #[must_use]
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            visible: true,
            texts: texts.into_iter().map(Into::into).collect(),
        }
    }

    /// `n` rendered elements with no text
    #[must_use]
    pub fn repeated(n: usize) -> Self {
        Self {
            visible: true,
            texts: vec![String::new(); n],
        }
    }
}

/// What a click changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAction {
    /// Load another URL
    Navigate(String),
    /// Put an element on every page
    Reveal(Selector, MockElement),
    /// Take an element off every page
    Remove(Selector),
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    history: Vec<String>,
    history_index: usize,
    scripts: HashMap<String, Vec<AttemptScript>>,
    attempts: HashMap<String, usize>,
    in_flight: Option<AttemptScript>,
    document_signal: Option<StrategyOutcome>,
    elements: HashMap<String, HashMap<String, MockElement>>,
    reactions: HashMap<String, Vec<MockAction>>,
    values: HashMap<String, String>,
    titles: HashMap<String, String>,
    eval_results: VecDeque<serde_json::Value>,
    storage: StorageState,
    fail_close: bool,
    reject_storage_on_blank: bool,
    closed: bool,
    calls: Vec<String>,
}

impl MockState {
    /// Exact entry first; `nth`/`first` otherwise narrow the inner entry
    fn lookup(&self, selector: &Selector) -> Option<MockElement> {
        let key = selector.to_string();
        let path = url_path(&self.current_url);
        let exact = self
            .elements
            .get(path)
            .and_then(|table| table.get(&key))
            .or_else(|| self.elements.get(ANY_PAGE).and_then(|t| t.get(&key)));
        if let Some(element) = exact {
            return Some(element.clone());
        }
        let (inner, index) = match selector {
            Selector::Nth { inner, index } => (inner.as_ref(), *index),
            Selector::First(inner) => (inner.as_ref(), 0),
            _ => return None,
        };
        let all = self.lookup(inner)?;
        all.texts.get(index).map(|text| MockElement {
            visible: all.visible,
            texts: vec![text.clone()],
        })
    }

    fn script_for(&self, url: &str) -> Option<&Vec<AttemptScript>> {
        self.scripts
            .get(url)
            .or_else(|| self.scripts.get(url_path(url)))
    }

    fn commit(&mut self, url: &str) {
        self.history.truncate(self.history_index + usize::from(!self.history.is_empty()));
        self.history.push(url.to_string());
        self.history_index = self.history.len() - 1;
        self.current_url = url.to_string();
    }

    fn apply(&mut self, action: MockAction) {
        match action {
            MockAction::Navigate(url) => {
                self.commit(&url);
                self.in_flight = None;
            }
            MockAction::Reveal(selector, element) => {
                let _ = self
                    .elements
                    .entry(ANY_PAGE.to_string())
                    .or_default()
                    .insert(selector.to_string(), element);
            }
            MockAction::Remove(selector) => {
                let key = selector.to_string();
                for table in self.elements.values_mut() {
                    let _ = table.remove(&key);
                }
            }
        }
    }

    fn require(&self, selector: &Selector) -> ProbeResult<()> {
        match self.lookup(selector) {
            Some(el) if !el.texts.is_empty() => Ok(()),
            _ => Err(ProbeError::ElementNotFound {
                selector: selector.to_string(),
            }),
        }
    }
}

/// Resolve a scripted outcome into a driver result
async fn play(outcome: StrategyOutcome, strategy: WaitStrategy, url: &str, timeout: Duration) -> ProbeResult<()> {
    match outcome {
        StrategyOutcome::Ready => Ok(()),
        StrategyOutcome::Timeout => {
            tokio::time::sleep(timeout).await;
            Err(ProbeError::timeout(
                strategy.event_name(),
                timeout.as_millis() as u64,
            ))
        }
        StrategyOutcome::Hang => std::future::pending().await,
        StrategyOutcome::Fail => Err(ProbeError::NavigationFailed {
            url: url.to_string(),
            message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        }),
    }
}

/// Scripted page
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// A blank page where every navigation succeeds
    #[must_use]
    pub fn new() -> Self {
        let driver = Self::default();
        driver.state().current_url = "about:blank".to_string();
        driver
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String) {
        self.state().calls.push(call);
    }

    /// Script consecutive navigation attempts to `url` (absolute or path).
    /// Attempts past the end repeat the last script.
    pub fn script_navigation(&self, url: &str, attempts: Vec<AttemptScript>) {
        let _ = self.state().scripts.insert(url.to_string(), attempts);
    }

    /// How the load-state signal behaves when no navigation is in flight
    pub fn set_document_signal(&self, outcome: StrategyOutcome) {
        self.state().document_signal = Some(outcome);
    }

    /// Add an element present on every page
    pub fn add_element(&self, selector: &Selector, element: MockElement) {
        self.add_page_element(ANY_PAGE, selector, element);
    }

    /// Add an element present only while the URL path equals `path`
    pub fn add_page_element(&self, path: &str, selector: &Selector, element: MockElement) {
        let _ = self
            .state()
            .elements
            .entry(path.to_string())
            .or_default()
            .insert(selector.to_string(), element);
    }

    /// Remove an element from every page
    pub fn remove_element(&self, selector: &Selector) {
        self.state().apply(MockAction::Remove(selector.clone()));
    }

    /// Run `actions` whenever `selector` is clicked
    pub fn on_click(&self, selector: &Selector, actions: Vec<MockAction>) {
        self.state()
            .reactions
            .entry(selector.to_string())
            .or_default()
            .extend(actions);
    }

    /// Title reported while on `path`
    pub fn set_title(&self, path: &str, title: &str) {
        let _ = self
            .state()
            .titles
            .insert(path.to_string(), title.to_string());
    }

    /// Queue a result for the next `evaluate`
    pub fn push_eval_result(&self, value: serde_json::Value) {
        self.state().eval_results.push_back(value);
    }

    /// Make `close()` fail
    pub fn fail_on_close(&self) {
        self.state().fail_close = true;
    }

    /// Make `apply_storage_state` fail while the page is still `about:blank`
    pub fn reject_storage_on_blank(&self) {
        self.state().reject_storage_on_blank = true;
    }

    /// Jump to `url` without a navigation
    pub fn set_url(&self, url: &str) {
        self.state().commit(url);
    }

    /// Cookies and storage the page currently holds
    #[must_use]
    pub fn stored_state(&self) -> StorageState {
        self.state().storage.clone()
    }

    /// Replace the cookies and storage the page holds
    pub fn set_stored_state(&self, state: StorageState) {
        self.state().storage = state;
    }

    /// Value last filled into `selector`
    #[must_use]
    pub fn filled_value(&self, selector: &Selector) -> Option<String> {
        self.state().values.get(&selector.to_string()).cloned()
    }

    /// Recorded calls, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Whether any recorded call starts with `prefix`
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state().calls.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Whether `close()` completed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str, strategy: WaitStrategy, timeout: Duration) -> ProbeResult<()> {
        let outcome = {
            let mut state = self.state();
            state.calls.push(format!("goto:{url}:{strategy}"));
            let index = {
                let counter = state.attempts.entry(url.to_string()).or_insert(0);
                let index = *counter;
                *counter += 1;
                index
            };
            let script = state
                .script_for(url)
                .and_then(|s| s.get(index).or_else(|| s.last()).copied())
                .unwrap_or_default();
            let outcome = script.outcome(strategy);
            if outcome == StrategyOutcome::Fail {
                state.in_flight = None;
            } else {
                state.commit(url);
                state.in_flight = (outcome != StrategyOutcome::Ready).then_some(script);
            }
            outcome
        };
        play(outcome, strategy, url, timeout).await
    }

    async fn wait_for_load_state(
        &self,
        strategy: WaitStrategy,
        timeout: Duration,
    ) -> ProbeResult<()> {
        let (outcome, url) = {
            let mut state = self.state();
            state.calls.push(format!("wait_for_load_state:{strategy}"));
            let outcome = match state.in_flight {
                Some(script) => script.outcome(strategy),
                None => state.document_signal.unwrap_or(StrategyOutcome::Ready),
            };
            if outcome == StrategyOutcome::Ready {
                state.in_flight = None;
            }
            (outcome, state.current_url.clone())
        };
        play(outcome, strategy, &url, timeout).await
    }

    async fn wait_for_selector(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
    ) -> ProbeResult<()> {
        let satisfied = {
            let mut guard = self.state();
            guard
                .calls
                .push(format!("wait_for_selector:{selector}:{state}"));
            let element = guard.lookup(selector);
            let present = element.as_ref().is_some_and(|e| !e.texts.is_empty());
            let visible = present && element.as_ref().is_some_and(|e| e.visible);
            match state {
                ElementState::Attached => present,
                ElementState::Visible => visible,
                ElementState::Hidden => !visible,
            }
        };
        if satisfied {
            return Ok(());
        }
        tokio::time::sleep(timeout).await;
        Err(ProbeError::timeout(
            format!("waiting for {selector} to be {state}"),
            timeout.as_millis() as u64,
        ))
    }

    async fn click(&self, selector: &Selector) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push(format!("click:{selector}"));
        state.require(selector)?;
        let actions = state
            .reactions
            .get(&selector.to_string())
            .cloned()
            .unwrap_or_default();
        for action in actions {
            state.apply(action);
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push(format!("fill:{selector}:{value}"));
        state.require(selector)?;
        let _ = state.values.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push(format!("select_option:{selector}:{value}"));
        state.require(selector)?;
        let _ = state.values.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn set_checked(&self, selector: &Selector, checked: bool) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push(format!("set_checked:{selector}:{checked}"));
        state.require(selector)?;
        let _ = state
            .values
            .insert(selector.to_string(), checked.to_string());
        Ok(())
    }

    async fn hover(&self, selector: &Selector) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push(format!("hover:{selector}"));
        state.require(selector)
    }

    async fn scroll_into_view(&self, selector: &Selector) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push(format!("scroll_into_view:{selector}"));
        state.require(selector)
    }

    async fn text_content(&self, selector: &Selector) -> ProbeResult<Option<String>> {
        let mut state = self.state();
        state.calls.push(format!("text_content:{selector}"));
        Ok(state
            .lookup(selector)
            .and_then(|e| e.texts.into_iter().next()))
    }

    async fn all_text_contents(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
        let mut state = self.state();
        state.calls.push(format!("all_text_contents:{selector}"));
        Ok(state
            .lookup(selector)
            .map(|e| e.texts)
            .unwrap_or_default())
    }

    async fn is_visible(&self, selector: &Selector) -> ProbeResult<bool> {
        let mut state = self.state();
        state.calls.push(format!("is_visible:{selector}"));
        Ok(state
            .lookup(selector)
            .is_some_and(|e| e.visible && !e.texts.is_empty()))
    }

    async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
        let mut state = self.state();
        state.calls.push(format!("count:{selector}"));
        Ok(state.lookup(selector).map_or(0, |e| e.texts.len()))
    }

    async fn evaluate(&self, _script: &str) -> ProbeResult<serde_json::Value> {
        let mut state = self.state();
        state.calls.push("evaluate".to_string());
        Ok(state
            .eval_results
            .pop_front()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.state().current_url.clone())
    }

    async fn title(&self) -> ProbeResult<String> {
        let state = self.state();
        let path = url_path(&state.current_url);
        Ok(state
            .titles
            .get(path)
            .or_else(|| state.titles.get(ANY_PAGE))
            .cloned()
            .unwrap_or_default())
    }

    async fn reload(&self, _timeout: Duration) -> ProbeResult<()> {
        self.record("reload".to_string());
        Ok(())
    }

    async fn go_back(&self, _timeout: Duration) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push("go_back".to_string());
        if state.history_index > 0 {
            state.history_index -= 1;
            state.current_url = state.history[state.history_index].clone();
        }
        Ok(())
    }

    async fn go_forward(&self, _timeout: Duration) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push("go_forward".to_string());
        if state.history_index + 1 < state.history.len() {
            state.history_index += 1;
            state.current_url = state.history[state.history_index].clone();
        }
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.record("screenshot".to_string());
        Ok(PNG_SIGNATURE.to_vec())
    }

    async fn storage_state(&self) -> ProbeResult<StorageState> {
        let mut state = self.state();
        state.calls.push("storage_state".to_string());
        Ok(state.storage.clone())
    }

    async fn apply_storage_state(&self, storage: &StorageState) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push("apply_storage_state".to_string());
        if state.reject_storage_on_blank && state.current_url == "about:blank" {
            return Err(ProbeError::StorageState {
                message: "Blank page can not have cookie".to_string(),
            });
        }
        state.storage = storage.clone();
        Ok(())
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut state = self.state();
        state.calls.push("close".to_string());
        if state.fail_close {
            return Err(ProbeError::page("browser disconnected during close"));
        }
        state.closed = true;
        Ok(())
    }
}

/// Builds a fresh scripted page per session and keeps a handle to each
pub struct MockSessionFactory {
    build: Box<dyn Fn() -> MockDriver + Send + Sync>,
    opened: Mutex<Vec<Arc<MockDriver>>>,
}

impl std::fmt::Debug for MockSessionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSessionFactory")
            .field("opened", &self.opened().len())
            .finish()
    }
}

impl MockSessionFactory {
    /// Use `build` to script every new page
    pub fn new(build: impl Fn() -> MockDriver + Send + Sync + 'static) -> Self {
        Self {
            build: Box::new(build),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Pages opened so far, oldest first
    #[must_use]
    pub fn opened(&self) -> Vec<Arc<MockDriver>> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn open(&self) -> ProbeResult<Session> {
        let driver = Arc::new((self.build)());
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&driver));
        Ok(Session::new(driver))
    }
}

/// A signed-out store: `/login` with both forms, the home carousel, and a
/// login button that lands on `/` signed in as `name`. Logging out returns
/// to `/login`.
#[must_use]
pub fn scripted_login_flow(base_url: &str, name: &str) -> MockDriver {
    let driver = MockDriver::new();
    driver.add_element(&Selector::css("body"), MockElement::visible());
    driver.add_element(&Selector::css(STRUCTURAL_LANDMARK_SELECTOR), MockElement::visible());
    for selector in [
        LoginPage::new_user_signup_title(),
        LoginPage::login_title(),
        LoginPage::login_email(),
        LoginPage::login_password(),
        LoginPage::login_button(),
        LoginPage::signup_name(),
        LoginPage::signup_email(),
        LoginPage::signup_button(),
    ] {
        driver.add_page_element("/login", &selector, MockElement::visible());
    }
    driver.add_page_element("/", &HomePage::carousel(), MockElement::visible());
    driver.on_click(
        &LoginPage::login_button(),
        vec![
            MockAction::Navigate(resolve_url(base_url, "/")),
            MockAction::Reveal(
                HomePage::logged_in_as(),
                MockElement::text(format!("Logged in as {name}")),
            ),
            MockAction::Reveal(HomePage::logout_link(), MockElement::visible()),
        ],
    );
    driver.on_click(
        &HomePage::logout_link(),
        vec![
            MockAction::Remove(HomePage::logged_in_as()),
            MockAction::Remove(HomePage::logout_link()),
            MockAction::Navigate(resolve_url(base_url, "/login")),
        ],
    );
    driver
}
