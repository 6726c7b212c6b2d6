//! Contact form.

use crate::data::ContactMessage;
use crate::locator::Selector;
use crate::page_object::{PageContext, PageObject};
use crate::pages::login::visible_text;
use crate::readiness::Landmark;
use crate::result::ProbeResult;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// How long the confirmation banner may take after submitting
const SUCCESS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct ContactUsPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> ContactUsPage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn get_in_touch_title() -> Selector {
        Selector::css_with_text("h2", "Get In Touch")
    }

    /// Form control tagged with `data-qa`
    #[must_use]
    pub fn input(qa: &str) -> Selector {
        Selector::css(format!(r#"input[data-qa="{qa}"]"#))
    }

    #[must_use]
    pub fn message_input() -> Selector {
        Selector::css(r#"textarea[data-qa="message"]"#)
    }

    #[must_use]
    pub fn upload_input() -> Selector {
        Selector::css(r#"input[name="upload_file"]"#)
    }

    #[must_use]
    pub fn submit_button() -> Selector {
        Self::input("submit-button")
    }

    #[must_use]
    pub fn success_message() -> Selector {
        Selector::css(".status.alert.alert-success")
    }

    #[must_use]
    pub fn home_button() -> Selector {
        Selector::css_with_text("a", "Home").first()
    }

    pub async fn fill_form(&self, message: &ContactMessage) -> ProbeResult<()> {
        let driver = self.ctx.driver;
        driver.fill(&Self::input("name"), &message.name).await?;
        driver.fill(&Self::input("email"), &message.email).await?;
        driver.fill(&Self::input("subject"), &message.subject).await?;
        driver.fill(&Self::message_input(), &message.message).await
    }

    /// Record the attachment name; the page script cannot read local files
    pub async fn attach_file(&self, path: &Path) -> ProbeResult<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(file = %name, "attaching file");
        self.ctx.driver.fill(&Self::upload_input(), &name).await
    }

    /// Submit, answering the confirmation dialog with OK
    pub async fn submit(&self) -> ProbeResult<()> {
        self.ctx.base().accept_dialogs().await?;
        self.ctx.driver.click(&Self::submit_button()).await
    }

    /// Wait for the confirmation banner and return its text
    pub async fn wait_for_success(&self) -> ProbeResult<String> {
        self.ctx
            .base()
            .wait_for_visible(&Self::success_message(), SUCCESS_TIMEOUT)
            .await?;
        Ok(visible_text(self.ctx, &Self::success_message())
            .await?
            .unwrap_or_default())
    }

    pub async fn click_home(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::home_button()).await
    }
}

#[async_trait]
impl PageObject for ContactUsPage<'_> {
    fn name(&self) -> &'static str {
        "ContactUsPage"
    }

    fn path(&self) -> &str {
        "/contact_us"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("get in touch title", Self::get_in_touch_title())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}
