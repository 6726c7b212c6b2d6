//! Pages of a generic web application with test-id instrumented markup.

use crate::locator::Selector;
use crate::navigation::url_path;
use crate::page_object::{PageContext, PageObject};
use crate::readiness::Landmark;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, DEFAULT_POLL_INTERVAL_MS};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a submitted login may take to redirect or complain
const LOGIN_OUTCOME_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a successful login lands
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Username-based credentials of the generic site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

impl LoginCredentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    #[must_use]
    pub const fn remember(mut self) -> Self {
        self.remember_me = true;
        self
    }
}

/// What happened after submitting the login form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResult {
    pub success: bool,
    pub error_message: Option<String>,
    pub redirect_url: Option<String>,
}

/// Which fields of the login form hold a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormValidation {
    pub username: bool,
    pub password: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct GenericLoginPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> GenericLoginPage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn username() -> Selector {
        Selector::label("Username")
    }

    #[must_use]
    pub fn password() -> Selector {
        Selector::label("Password")
    }

    #[must_use]
    pub fn remember_me() -> Selector {
        Selector::label("Remember me")
    }

    #[must_use]
    pub fn sign_in_button() -> Selector {
        Selector::role("button", Some("Sign in"))
    }

    #[must_use]
    pub fn forgot_password_link() -> Selector {
        Selector::role("link", Some("Forgot password?"))
    }

    #[must_use]
    pub fn signup_link() -> Selector {
        Selector::role("link", Some("Sign up"))
    }

    #[must_use]
    pub fn error_message() -> Selector {
        Selector::test_id("login-error-message")
    }

    #[must_use]
    pub fn success_message() -> Selector {
        Selector::test_id("login-success-message")
    }

    #[must_use]
    pub fn login_form() -> Selector {
        Selector::test_id("login-form")
    }

    #[must_use]
    pub fn show_password_button() -> Selector {
        Selector::test_id("show-password-button")
    }

    #[must_use]
    pub fn social_login_buttons() -> Selector {
        Selector::test_id("social-login-buttons")
    }

    #[must_use]
    pub fn social_button(provider: &str) -> Selector {
        Selector::role("button", Some(&format!("Sign in with {provider}")))
    }

    #[must_use]
    pub fn heading() -> Selector {
        Selector::role("heading", Some("Sign In"))
    }

    /// Submit the form and wait for a redirect to the dashboard or an error.
    ///
    /// Never fails: problems are reported in the [`LoginResult`].
    pub async fn login(&self, credentials: &LoginCredentials) -> LoginResult {
        match self.try_login(credentials).await {
            Ok(result) => result,
            Err(e) => LoginResult {
                success: false,
                error_message: Some(format!("Login failed: {e}")),
                redirect_url: None,
            },
        }
    }

    async fn try_login(&self, credentials: &LoginCredentials) -> ProbeResult<LoginResult> {
        let driver = self.ctx.driver;
        driver.fill(&Self::username(), &credentials.username).await?;
        driver.fill(&Self::password(), &credentials.password).await?;
        if credentials.remember_me {
            driver.set_checked(&Self::remember_me(), true).await?;
        }
        driver.click(&Self::sign_in_button()).await?;

        poll_until(
            "login outcome",
            LOGIN_OUTCOME_TIMEOUT,
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            move || async move {
                let url = driver.current_url().await?;
                Ok::<_, ProbeError>(
                    url_path(&url) == DASHBOARD_PATH
                        || driver.is_visible(&Self::error_message()).await?,
                )
            },
        )
        .await?;

        if let Some(error) = self.login_error().await? {
            return Ok(LoginResult {
                success: false,
                error_message: Some(error),
                redirect_url: None,
            });
        }
        Ok(LoginResult {
            success: true,
            error_message: None,
            redirect_url: Some(driver.current_url().await?),
        })
    }

    /// Fill and submit without waiting for the outcome
    pub async fn quick_login(&self, username: &str, password: &str) -> ProbeResult<()> {
        self.ctx.driver.fill(&Self::username(), username).await?;
        self.ctx.driver.fill(&Self::password(), password).await?;
        self.ctx.driver.click(&Self::sign_in_button()).await
    }

    pub async fn login_error(&self) -> ProbeResult<Option<String>> {
        super::login::visible_text(self.ctx, &Self::error_message()).await
    }

    pub async fn login_success(&self) -> ProbeResult<Option<String>> {
        super::login::visible_text(self.ctx, &Self::success_message()).await
    }

    pub async fn click_forgot_password(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::forgot_password_link()).await
    }

    pub async fn click_signup(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::signup_link()).await
    }

    pub async fn toggle_password_visibility(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::show_password_button()).await
    }

    /// Start an OAuth login with `provider` (`Google`, `Facebook`)
    pub async fn login_with(&self, provider: &str) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::social_button(provider)).await
    }

    pub async fn are_social_logins_available(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::social_login_buttons()).await
    }

    pub async fn clear_form(&self) -> ProbeResult<()> {
        self.ctx.driver.fill(&Self::username(), "").await?;
        self.ctx.driver.fill(&Self::password(), "").await?;
        self.ctx
            .driver
            .set_checked(&Self::remember_me(), false)
            .await
    }

    pub async fn validate_form(&self) -> ProbeResult<FormValidation> {
        let value = |selector: Selector| async move {
            let script = format!(
                "(() => {{ const el = {}; return el ? el.value : ''; }})()",
                selector.to_query()
            );
            let value = self.ctx.driver.evaluate(&script).await?;
            Ok::<_, ProbeError>(value.as_str().is_some_and(|v| !v.is_empty()))
        };
        Ok(FormValidation {
            username: value(Self::username()).await?,
            password: value(Self::password()).await?,
        })
    }
}

#[async_trait]
impl PageObject for GenericLoginPage<'_> {
    fn name(&self) -> &'static str {
        "GenericLoginPage"
    }

    fn path(&self) -> &str {
        "/login"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![
            Landmark::new("login form", Self::login_form()),
            Landmark::new("sign in heading", Self::heading()),
        ]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GenericHomePage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> GenericHomePage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn section(test_id: &str) -> Selector {
        Selector::test_id(test_id)
    }

    #[must_use]
    pub fn button(name: &str) -> Selector {
        Selector::role("button", Some(name))
    }

    async fn text(&self, test_id: &str) -> ProbeResult<String> {
        Ok(self
            .ctx
            .driver
            .text_content(&Self::section(test_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn welcome_message(&self) -> ProbeResult<String> {
        self.text("welcome-message").await
    }

    pub async fn hero_title(&self) -> ProbeResult<String> {
        self.text("hero-title").await
    }

    pub async fn hero_subtitle(&self) -> ProbeResult<String> {
        self.text("hero-subtitle").await
    }

    pub async fn click_get_started(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::button("Get Started")).await
    }

    pub async fn click_learn_more(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::button("Learn More")).await
    }

    pub async fn click_contact_us(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::button("Contact Us")).await
    }

    pub async fn feature_card_count(&self) -> ProbeResult<usize> {
        self.ctx.driver.count(&Self::section("feature-card")).await
    }

    pub async fn feature_card_text(&self, index: usize) -> ProbeResult<String> {
        Ok(self
            .ctx
            .driver
            .text_content(&Self::section("feature-card").nth(index))
            .await?
            .unwrap_or_default())
    }

    pub async fn click_feature_card(&self, index: usize) -> ProbeResult<()> {
        self.ctx
            .driver
            .click(&Self::section("feature-card").nth(index))
            .await
    }

    pub async fn testimonial_count(&self) -> ProbeResult<usize> {
        self.ctx.driver.count(&Self::section("testimonial-item")).await
    }

    pub async fn testimonial_text(&self, index: usize) -> ProbeResult<String> {
        Ok(self
            .ctx
            .driver
            .text_content(&Self::section("testimonial-item").nth(index))
            .await?
            .unwrap_or_default())
    }

    pub async fn news_article_count(&self) -> ProbeResult<usize> {
        self.ctx.driver.count(&Self::section("news-article")).await
    }

    pub async fn click_news_article(&self, index: usize) -> ProbeResult<()> {
        self.ctx
            .driver
            .click(&Self::section("news-article").nth(index))
            .await
    }

    /// Whether the section with `test_id` is on screen
    pub async fn is_section_visible(&self, test_id: &str) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::section(test_id)).await
    }

    pub async fn scroll_to_section(&self, test_id: &str) -> ProbeResult<()> {
        self.ctx
            .driver
            .scroll_into_view(&Self::section(test_id))
            .await
    }

    pub async fn search(&self, query: &str) -> ProbeResult<()> {
        let input = Selector::placeholder("Search...");
        self.scroll_to_section("search-section").await?;
        self.ctx.driver.fill(&input, query).await?;
        self.ctx
            .driver
            .click(&Selector::role("button", Some("Search")))
            .await
    }
}

#[async_trait]
impl PageObject for GenericHomePage<'_> {
    fn name(&self) -> &'static str {
        "GenericHomePage"
    }

    fn path(&self) -> &str {
        "/"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("hero section", Self::section("hero-section"))]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}
