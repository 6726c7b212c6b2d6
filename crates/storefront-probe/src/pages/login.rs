//! Combined signup and login screen of the store.

use crate::locator::Selector;
use crate::page_object::{PageContext, PageObject};
use crate::readiness::Landmark;
use crate::result::ProbeResult;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> LoginPage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn new_user_signup_title() -> Selector {
        Selector::css_with_text("h2", "New User Signup!")
    }

    #[must_use]
    pub fn login_title() -> Selector {
        Selector::css_with_text("h2", "Login to your account")
    }

    #[must_use]
    pub fn signup_name() -> Selector {
        Selector::css(r#"input[data-qa="signup-name"]"#)
    }

    #[must_use]
    pub fn signup_email() -> Selector {
        Selector::css(r#"input[data-qa="signup-email"]"#)
    }

    #[must_use]
    pub fn signup_button() -> Selector {
        Selector::css(r#"button[data-qa="signup-button"]"#)
    }

    #[must_use]
    pub fn login_email() -> Selector {
        Selector::css(r#"input[data-qa="login-email"]"#)
    }

    #[must_use]
    pub fn login_password() -> Selector {
        Selector::css(r#"input[data-qa="login-password"]"#)
    }

    #[must_use]
    pub fn login_button() -> Selector {
        Selector::css(r#"button[data-qa="login-button"]"#)
    }

    #[must_use]
    pub fn login_error() -> Selector {
        Selector::css_with_text("p", "Your email or password is incorrect!")
    }

    #[must_use]
    pub fn signup_error() -> Selector {
        Selector::css_with_text("p", "Email Address already exist!")
    }

    /// Start a registration; the store continues on the signup page
    pub async fn signup(&self, name: &str, email: &str) -> ProbeResult<()> {
        self.ctx.driver.fill(&Self::signup_name(), name).await?;
        self.ctx.driver.fill(&Self::signup_email(), email).await?;
        self.ctx.driver.click(&Self::signup_button()).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ProbeResult<()> {
        self.ctx.driver.fill(&Self::login_email(), email).await?;
        self.ctx
            .driver
            .fill(&Self::login_password(), password)
            .await?;
        self.ctx.driver.click(&Self::login_button()).await
    }

    pub async fn is_login_form_visible(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::login_title()).await
    }

    pub async fn login_error_message(&self) -> ProbeResult<Option<String>> {
        visible_text(self.ctx, &Self::login_error()).await
    }

    pub async fn signup_error_message(&self) -> ProbeResult<Option<String>> {
        visible_text(self.ctx, &Self::signup_error()).await
    }
}

/// Text of `selector` when it is on screen
pub(crate) async fn visible_text(
    ctx: PageContext<'_>,
    selector: &Selector,
) -> ProbeResult<Option<String>> {
    if ctx.driver.is_visible(selector).await? {
        ctx.driver.text_content(selector).await
    } else {
        Ok(None)
    }
}

#[async_trait]
impl PageObject for LoginPage<'_> {
    fn name(&self) -> &'static str {
        "LoginPage"
    }

    fn path(&self) -> &str {
        "/login"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("new user signup title", Self::new_user_signup_title())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}
