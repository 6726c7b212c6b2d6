//! Sessions and suite-level fixtures.
//!
//! Every journey gets its own [`Session`] from a [`SessionFactory`]; the
//! session owns the browser page and closing it never fails the journey.
//! Resources that live for the whole run (output directories, the
//! authentication snapshot) are synchronous [`Fixture`]s driven by a
//! [`FixtureManager`]: set up by priority, torn down in reverse, with
//! teardown errors collected instead of raised.

use crate::data::UserCredentials;
use crate::driver::PageDriver;
use crate::page_object::{PageContext, PageObject, SiteSettings};
use crate::pages::{HomePage, LoginPage};
use crate::result::{ProbeError, ProbeResult};
use crate::storage_state::StorageState;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

// =============================================================================
// SESSIONS
// =============================================================================

/// One isolated browser page owned by one journey
#[derive(Clone)]
pub struct Session {
    driver: Arc<dyn PageDriver>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }

    #[must_use]
    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// Another handle to the same page
    #[must_use]
    pub fn shared(&self) -> Arc<dyn PageDriver> {
        Arc::clone(&self.driver)
    }

    #[must_use]
    pub fn context<'a>(&'a self, site: &'a SiteSettings) -> PageContext<'a> {
        PageContext::new(self.driver(), site)
    }

    /// Close the page. Errors are logged and swallowed.
    pub async fn teardown(self) {
        match self.driver.close().await {
            Ok(()) => debug!("session closed"),
            Err(e) => warn!(error = %e, "session teardown failed, ignoring"),
        }
    }
}

/// Produces a fresh, isolated session per journey
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> ProbeResult<Session>;
}

/// How an [`AuthenticatedSession`] got signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInMethod {
    /// A saved snapshot was applied and accepted by the site
    StorageState,
    /// The login form was filled in
    LoginForm,
}

/// A session that starts signed in and signs out when torn down
#[derive(Debug)]
pub struct AuthenticatedSession {
    session: Session,
    site: SiteSettings,
    method: SignInMethod,
}

impl AuthenticatedSession {
    /// Sign `session` in, preferring the snapshot at `snapshot` when one is
    /// given and the site still honours it.
    pub async fn establish(
        session: Session,
        site: SiteSettings,
        credentials: &UserCredentials,
        snapshot: Option<&Path>,
    ) -> ProbeResult<Self> {
        let mut method = None;
        if let Some(path) = snapshot {
            match StorageState::load(path) {
                Ok(state) if !state.is_empty() => {
                    match resume(&session, &site, &state).await {
                        Ok(true) => method = Some(SignInMethod::StorageState),
                        Ok(false) => {
                            info!(path = %path.display(), "stored session rejected, logging in");
                        }
                        Err(e) => {
                            info!(path = %path.display(), error = %e, "stored session rejected, logging in");
                        }
                    }
                }
                Ok(_) => info!(path = %path.display(), "stored session is empty, logging in"),
                Err(e) => info!(error = %e, "no usable stored session, logging in"),
            }
        }

        let method = match method {
            Some(method) => method,
            None => {
                sign_in(session.context(&site), credentials).await?;
                SignInMethod::LoginForm
            }
        };
        info!(user = %credentials.email, ?method, "session signed in");
        Ok(Self {
            session,
            site,
            method,
        })
    }

    #[must_use]
    pub const fn method(&self) -> SignInMethod {
        self.method
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn context(&self) -> PageContext<'_> {
        self.session.context(&self.site)
    }

    /// Best-effort logout, then close the page
    pub async fn teardown(self) {
        let home = HomePage::new(self.context());
        match home.is_user_logged_in().await {
            Ok(true) => {
                if let Err(e) = home.click_logout().await {
                    warn!(error = %e, "logout during teardown failed, ignoring");
                }
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "cannot tell whether still signed in, ignoring"),
        }
        self.session.teardown().await;
    }
}

/// Apply `state`, open the home page and report whether it shows a signed-in user
async fn resume(session: &Session, site: &SiteSettings, state: &StorageState) -> ProbeResult<bool> {
    session.driver().apply_storage_state(state).await?;
    let home = HomePage::new(session.context(site));
    home.open().await?;
    home.is_user_logged_in().await
}

async fn sign_in(ctx: PageContext<'_>, credentials: &UserCredentials) -> ProbeResult<()> {
    let login = LoginPage::new(ctx);
    login.open().await?;
    login.login(&credentials.email, &credentials.password).await?;
    let home = HomePage::new(ctx);
    home.wait_until_ready().await?;
    if home.is_user_logged_in().await? {
        Ok(())
    } else {
        Err(ProbeError::Fixture {
            message: format!("login as {} did not reach a signed-in page", credentials.email),
        })
    }
}

// =============================================================================
// SUITE FIXTURES
// =============================================================================

/// A resource set up once before the journeys and torn down after them
pub trait Fixture: Send {
    /// # Errors
    ///
    /// Returns an error if the resource cannot be prepared.
    fn setup(&mut self) -> ProbeResult<()>;

    /// # Errors
    ///
    /// Returns an error if cleanup fails; the manager records it and moves on.
    fn teardown(&mut self) -> ProbeResult<()>;

    fn name(&self) -> &str;

    /// Higher is set up first and torn down last
    fn priority(&self) -> i32 {
        0
    }
}

/// State of a fixture in the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    Registered,
    SetUp,
    TornDown,
    Failed,
}

struct FixtureEntry {
    fixture: Box<dyn Fixture>,
    state: FixtureState,
}

/// Runs suite fixtures in priority order.
#[derive(Default)]
pub struct FixtureManager {
    entries: Vec<FixtureEntry>,
    setup_order: Vec<usize>,
}

impl std::fmt::Debug for FixtureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureManager")
            .field("fixtures", &self.list())
            .field("set_up", &self.setup_order.len())
            .finish()
    }
}

impl FixtureManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, fixture: impl Fixture + 'static) {
        self.entries.push(FixtureEntry {
            fixture: Box::new(fixture),
            state: FixtureState::Registered,
        });
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Names in registration order
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.fixture.name()).collect()
    }

    #[must_use]
    pub fn state(&self, name: &str) -> Option<FixtureState> {
        self.entries
            .iter()
            .find(|e| e.fixture.name() == name)
            .map(|e| e.state)
    }

    /// Set up every fixture, highest priority first (ties keep registration
    /// order). On failure the fixtures already set up are torn down again.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Fixture`] naming the fixture that failed.
    pub fn setup_all(&mut self) -> ProbeResult<()> {
        let mut ordered: Vec<usize> = (0..self.entries.len()).collect();
        ordered.sort_by_key(|&i| std::cmp::Reverse(self.entries[i].fixture.priority()));

        for index in ordered {
            let entry = &mut self.entries[index];
            if entry.state == FixtureState::SetUp {
                continue;
            }
            if let Err(e) = entry.fixture.setup() {
                entry.state = FixtureState::Failed;
                let message = format!("fixture '{}' setup failed: {e}", entry.fixture.name());
                for error in self.teardown_all() {
                    warn!(error = %error, "teardown after failed setup");
                }
                return Err(ProbeError::Fixture { message });
            }
            debug!(fixture = entry.fixture.name(), "fixture set up");
            entry.state = FixtureState::SetUp;
            self.setup_order.push(index);
        }
        Ok(())
    }

    /// Tear down in reverse setup order. Every fixture gets its turn; the
    /// errors are returned for reporting.
    pub fn teardown_all(&mut self) -> Vec<ProbeError> {
        let mut errors = Vec::new();
        while let Some(index) = self.setup_order.pop() {
            let entry = &mut self.entries[index];
            match entry.fixture.teardown() {
                Ok(()) => entry.state = FixtureState::TornDown,
                Err(e) => {
                    warn!(fixture = entry.fixture.name(), error = %e, "fixture teardown failed");
                    entry.state = FixtureState::Failed;
                    errors.push(ProbeError::Fixture {
                        message: format!("fixture '{}' teardown failed: {e}", entry.fixture.name()),
                    });
                }
            }
        }
        errors
    }
}

/// Directories the report writers and screenshots land in
#[derive(Debug, Clone)]
pub struct OutputDirs {
    root: PathBuf,
}

impl OutputDirs {
    pub const TEST_RESULTS: &'static str = "test-results";
    pub const SCREENSHOTS: &'static str = "test-results/screenshots";
    pub const HTML_REPORT: &'static str = "playwright-report";
    pub const ALLURE_RESULTS: &'static str = "allure-results";

    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn test_results(&self) -> PathBuf {
        self.root.join(Self::TEST_RESULTS)
    }

    #[must_use]
    pub fn screenshots(&self) -> PathBuf {
        self.root.join(Self::SCREENSHOTS)
    }

    #[must_use]
    pub fn html_report(&self) -> PathBuf {
        self.root.join(Self::HTML_REPORT)
    }

    #[must_use]
    pub fn allure_results(&self) -> PathBuf {
        self.root.join(Self::ALLURE_RESULTS)
    }

    fn all(&self) -> [PathBuf; 4] {
        [
            self.test_results(),
            self.screenshots(),
            self.html_report(),
            self.allure_results(),
        ]
    }
}

impl Fixture for OutputDirs {
    fn setup(&mut self) -> ProbeResult<()> {
        for dir in self.all() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Artifacts outlive the run
    fn teardown(&mut self) -> ProbeResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "output-dirs"
    }

    fn priority(&self) -> i32 {
        100
    }
}

/// Checks the authentication snapshot before any journey runs. Journeys
/// read the file themselves through [`AuthenticatedSession::establish`].
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    path: PathBuf,
    required: bool,
}

impl AuthSnapshot {
    /// Check `path` if present; journeys fall back to the login form otherwise
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: false,
        }
    }

    /// Fail setup when the snapshot is missing or empty
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Fixture for AuthSnapshot {
    fn setup(&mut self) -> ProbeResult<()> {
        match StorageState::load(&self.path) {
            Ok(state) if !state.is_empty() => {
                info!(path = %self.path.display(), cookies = state.cookies.len(), "auth snapshot found");
                Ok(())
            }
            Ok(_) if self.required => Err(ProbeError::StorageState {
                message: format!("{} holds no cookies or storage", self.path.display()),
            }),
            Err(e) if self.required => Err(e),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "no auth snapshot, journeys will log in");
                Ok(())
            }
        }
    }

    fn teardown(&mut self) -> ProbeResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "auth-snapshot"
    }

    fn priority(&self) -> i32 {
        50
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{scripted_login_flow, MockDriver, MockSessionFactory};
    use crate::storage_state::Cookie;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    const BASE: &str = "https://shop.test";

    fn credentials() -> UserCredentials {
        UserCredentials::new("user@example.com", "secret")
    }

    fn snapshot_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("user.json");
        StorageState {
            cookies: vec![Cookie {
                name: "sessionid".to_string(),
                value: "abc".to_string(),
                domain: "shop.test".to_string(),
                path: "/".to_string(),
                expires: -1.0,
                http_only: true,
                secure: true,
                same_site: "Lax".to_string(),
            }],
            origins: Vec::new(),
        }
        .save(&path)
        .unwrap();
        path
    }

    mod session_tests {
        use super::*;

        #[tokio::test]
        async fn test_teardown_swallows_close_errors() {
            let factory = MockSessionFactory::new(|| {
                let driver = MockDriver::new();
                driver.fail_on_close();
                driver
            });
            let session = factory.open().await.unwrap();
            session.teardown().await;
            let driver = &factory.opened()[0];
            assert!(driver.was_called("close"));
            assert!(!driver.is_closed());
        }

        #[tokio::test]
        async fn test_each_open_is_isolated() {
            let factory = MockSessionFactory::new(MockDriver::new);
            let a = factory.open().await.unwrap();
            let b = factory.open().await.unwrap();
            a.driver()
                .goto(
                    "https://shop.test/a",
                    crate::wait::WaitStrategy::FullLoad,
                    std::time::Duration::from_secs(1),
                )
                .await
                .unwrap();
            assert_eq!(b.driver().current_url().await.unwrap(), "about:blank");
            a.teardown().await;
            assert!(factory.opened()[0].is_closed());
            assert!(!factory.opened()[1].is_closed());
        }
    }

    mod authenticated_session_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_login_form_when_no_snapshot() {
            let factory = MockSessionFactory::new(|| scripted_login_flow(BASE, "Test User"));
            let session = factory.open().await.unwrap();
            let auth = AuthenticatedSession::establish(
                session,
                SiteSettings::new(BASE),
                &credentials(),
                None,
            )
            .await
            .unwrap();
            assert_eq!(auth.method(), SignInMethod::LoginForm);
            let driver = Arc::clone(&factory.opened()[0]);
            assert_eq!(
                driver
                    .filled_value(&LoginPage::login_email())
                    .as_deref(),
                Some("user@example.com")
            );

            auth.teardown().await;
            assert!(driver.was_called("click:css=a[href=\"/logout\"]"));
            assert!(driver.is_closed());
        }

        #[tokio::test(start_paused = true)]
        async fn test_snapshot_skips_login_form() {
            let dir = TempDir::new().unwrap();
            let path = snapshot_file(&dir);
            let factory = MockSessionFactory::new(|| {
                let driver = scripted_login_flow(BASE, "Test User");
                driver.add_element(
                    &HomePage::logged_in_as(),
                    crate::mock::MockElement::text("Logged in as Test User"),
                );
                driver
            });
            let session = factory.open().await.unwrap();
            let auth = AuthenticatedSession::establish(
                session,
                SiteSettings::new(BASE),
                &credentials(),
                Some(&path),
            )
            .await
            .unwrap();
            assert_eq!(auth.method(), SignInMethod::StorageState);
            let driver = &factory.opened()[0];
            assert!(driver.was_called("apply_storage_state"));
            assert!(!driver.was_called("fill:"));
            assert_eq!(driver.stored_state().cookie("sessionid").unwrap().value, "abc");
        }

        #[tokio::test(start_paused = true)]
        async fn test_rejected_snapshot_falls_back_to_login() {
            let dir = TempDir::new().unwrap();
            let path = snapshot_file(&dir);
            let factory = MockSessionFactory::new(|| scripted_login_flow(BASE, "Test User"));
            let session = factory.open().await.unwrap();
            let auth = AuthenticatedSession::establish(
                session,
                SiteSettings::new(BASE),
                &credentials(),
                Some(&path),
            )
            .await
            .unwrap();
            assert_eq!(auth.method(), SignInMethod::LoginForm);
        }

        #[tokio::test(start_paused = true)]
        async fn test_snapshot_apply_error_falls_back_to_login() {
            let dir = TempDir::new().unwrap();
            let path = snapshot_file(&dir);
            let factory = MockSessionFactory::new(|| {
                let driver = scripted_login_flow(BASE, "Test User");
                driver.reject_storage_on_blank();
                driver
            });
            let session = factory.open().await.unwrap();
            let auth = AuthenticatedSession::establish(
                session,
                SiteSettings::new(BASE),
                &credentials(),
                Some(&path),
            )
            .await
            .unwrap();
            assert_eq!(auth.method(), SignInMethod::LoginForm);
            let driver = &factory.opened()[0];
            assert!(driver.was_called("apply_storage_state"));
            assert_eq!(
                driver.filled_value(&LoginPage::login_email()).as_deref(),
                Some("user@example.com")
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_failed_login_is_fixture_error() {
            let factory = MockSessionFactory::new(|| {
                let driver = scripted_login_flow(BASE, "Test User");
                driver.remove_element(&HomePage::logged_in_as());
                driver.on_click(
                    &LoginPage::login_button(),
                    vec![crate::mock::MockAction::Remove(HomePage::logged_in_as())],
                );
                driver
            });
            let session = factory.open().await.unwrap();
            let err = AuthenticatedSession::establish(
                session,
                SiteSettings::new(BASE),
                &credentials(),
                None,
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ProbeError::Fixture { .. }));
        }
    }

    mod manager_tests {
        use super::*;

        struct Recording {
            name: &'static str,
            priority: i32,
            fail_setup: bool,
            fail_teardown: bool,
            log: Arc<Mutex<Vec<String>>>,
        }

        impl Recording {
            fn new(name: &'static str, priority: i32, log: &Arc<Mutex<Vec<String>>>) -> Self {
                Self {
                    name,
                    priority,
                    fail_setup: false,
                    fail_teardown: false,
                    log: Arc::clone(log),
                }
            }
        }

        impl Fixture for Recording {
            fn setup(&mut self) -> ProbeResult<()> {
                self.log.lock().unwrap().push(format!("setup:{}", self.name));
                if self.fail_setup {
                    return Err(ProbeError::page("boom"));
                }
                Ok(())
            }

            fn teardown(&mut self) -> ProbeResult<()> {
                self.log.lock().unwrap().push(format!("teardown:{}", self.name));
                if self.fail_teardown {
                    return Err(ProbeError::page("stuck"));
                }
                Ok(())
            }

            fn name(&self) -> &str {
                self.name
            }

            fn priority(&self) -> i32 {
                self.priority
            }
        }

        #[test]
        fn test_priority_order_and_reverse_teardown() {
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut manager = FixtureManager::new();
            manager.register(Recording::new("low", 1, &log));
            manager.register(Recording::new("high", 10, &log));
            manager.register(Recording::new("mid", 5, &log));
            manager.setup_all().unwrap();
            assert!(manager.teardown_all().is_empty());
            assert_eq!(
                *log.lock().unwrap(),
                vec![
                    "setup:high",
                    "setup:mid",
                    "setup:low",
                    "teardown:low",
                    "teardown:mid",
                    "teardown:high"
                ]
            );
            assert_eq!(manager.state("mid"), Some(FixtureState::TornDown));
        }

        #[test]
        fn test_failed_setup_unwinds() {
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut manager = FixtureManager::new();
            manager.register(Recording::new("first", 2, &log));
            let mut broken = Recording::new("broken", 1, &log);
            broken.fail_setup = true;
            manager.register(broken);
            manager.register(Recording::new("never", 0, &log));

            let err = manager.setup_all().unwrap_err();
            assert!(err.to_string().contains("broken"));
            assert_eq!(
                *log.lock().unwrap(),
                vec!["setup:first", "setup:broken", "teardown:first"]
            );
            assert_eq!(manager.state("broken"), Some(FixtureState::Failed));
            assert_eq!(manager.state("never"), Some(FixtureState::Registered));
        }

        #[test]
        fn test_teardown_errors_are_collected() {
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut manager = FixtureManager::new();
            let mut stuck = Recording::new("stuck", 2, &log);
            stuck.fail_teardown = true;
            manager.register(stuck);
            manager.register(Recording::new("fine", 1, &log));
            manager.setup_all().unwrap();
            let errors = manager.teardown_all();
            assert_eq!(errors.len(), 1);
            assert!(log.lock().unwrap().contains(&"teardown:stuck".to_string()));
            assert_eq!(manager.state("fine"), Some(FixtureState::TornDown));
        }

        #[test]
        fn test_setup_twice_is_idempotent() {
            let counter = Arc::new(AtomicU32::new(0));
            struct Counting(Arc<AtomicU32>);
            impl Fixture for Counting {
                fn setup(&mut self) -> ProbeResult<()> {
                    let _ = self.0.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
                fn teardown(&mut self) -> ProbeResult<()> {
                    Ok(())
                }
                fn name(&self) -> &str {
                    "counting"
                }
            }
            let mut manager = FixtureManager::new();
            manager.register(Counting(Arc::clone(&counter)));
            manager.setup_all().unwrap();
            manager.setup_all().unwrap();
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    mod builtin_fixture_tests {
        use super::*;

        #[test]
        fn test_output_dirs_created() {
            let dir = TempDir::new().unwrap();
            let mut outputs = OutputDirs::new(dir.path());
            outputs.setup().unwrap();
            assert!(outputs.screenshots().is_dir());
            assert!(outputs.html_report().is_dir());
            assert!(outputs.allure_results().is_dir());
            assert!(dir.path().join("test-results").is_dir());
        }

        #[test]
        fn test_optional_snapshot_may_be_missing() {
            let dir = TempDir::new().unwrap();
            let mut snapshot = AuthSnapshot::new(dir.path().join("missing.json"));
            snapshot.setup().unwrap();
            snapshot.teardown().unwrap();
        }

        #[test]
        fn test_required_snapshot_must_exist() {
            let dir = TempDir::new().unwrap();
            let mut snapshot = AuthSnapshot::new(dir.path().join("missing.json")).required();
            assert!(snapshot.setup().is_err());

            let empty = dir.path().join("empty.json");
            StorageState::default().save(&empty).unwrap();
            let mut snapshot = AuthSnapshot::new(&empty).required();
            assert!(matches!(
                snapshot.setup().unwrap_err(),
                ProbeError::StorageState { .. }
            ));
        }

        #[test]
        fn test_required_snapshot_accepts_saved_session() {
            let dir = TempDir::new().unwrap();
            let path = snapshot_file(&dir);
            let mut snapshot = AuthSnapshot::new(&path).required();
            snapshot.setup().unwrap();
            assert_eq!(snapshot.path(), path.as_path());
            snapshot.teardown().unwrap();
        }
    }
}
