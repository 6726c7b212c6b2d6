//! Account information form shown after starting a registration.

use crate::data::{Address, RegistrationProfile, Title};
use crate::locator::Selector;
use crate::page_object::{PageContext, PageObject};
use crate::readiness::Landmark;
use crate::result::ProbeResult;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy)]
pub struct SignupPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> SignupPage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn account_info_title() -> Selector {
        Selector::css_with_text("h2", "Enter Account Information")
    }

    #[must_use]
    pub fn title_radio(title: Title) -> Selector {
        match title {
            Title::Mr => Selector::css("#id_gender1"),
            Title::Mrs => Selector::css("#id_gender2"),
        }
    }

    #[must_use]
    pub fn field(id: &str) -> Selector {
        Selector::css(format!("#{id}"))
    }

    #[must_use]
    pub fn create_account_button() -> Selector {
        Selector::css(r#"button[data-qa="create-account"]"#)
    }

    #[must_use]
    pub fn account_created_title() -> Selector {
        Selector::css(r#"h2[data-qa="account-created"]"#)
    }

    #[must_use]
    pub fn continue_button() -> Selector {
        Selector::css(r#"a[data-qa="continue-button"]"#)
    }

    #[must_use]
    pub fn account_deleted_title() -> Selector {
        Selector::css(r#"h2[data-qa="account-deleted"]"#)
    }

    /// Title, password, birth date and mailing preferences
    pub async fn fill_account_information(&self, profile: &RegistrationProfile) -> ProbeResult<()> {
        let driver = self.ctx.driver;
        driver
            .set_checked(&Self::title_radio(profile.title), true)
            .await?;
        driver
            .fill(&Self::field("password"), &profile.password)
            .await?;
        driver
            .select_option(&Self::field("days"), &profile.day)
            .await?;
        driver
            .select_option(&Self::field("months"), &profile.month)
            .await?;
        driver
            .select_option(&Self::field("years"), &profile.year)
            .await?;
        if profile.newsletter {
            driver.set_checked(&Self::field("newsletter"), true).await?;
        }
        if profile.offers {
            driver.set_checked(&Self::field("optin"), true).await?;
        }
        Ok(())
    }

    pub async fn fill_address_information(&self, address: &Address) -> ProbeResult<()> {
        let driver = self.ctx.driver;
        driver
            .fill(&Self::field("first_name"), &address.first_name)
            .await?;
        driver
            .fill(&Self::field("last_name"), &address.last_name)
            .await?;
        driver
            .fill(&Self::field("company"), &address.company)
            .await?;
        driver
            .fill(&Self::field("address1"), &address.address1)
            .await?;
        if let Some(address2) = &address.address2 {
            driver.fill(&Self::field("address2"), address2).await?;
        }
        driver
            .select_option(&Self::field("country"), &address.country)
            .await?;
        driver.fill(&Self::field("state"), &address.state).await?;
        driver.fill(&Self::field("city"), &address.city).await?;
        driver
            .fill(&Self::field("zipcode"), &address.zipcode)
            .await?;
        driver
            .fill(&Self::field("mobile_number"), &address.mobile_number)
            .await
    }

    pub async fn click_create_account(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::create_account_button()).await
    }

    pub async fn is_account_created(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::account_created_title()).await
    }

    pub async fn is_account_deleted(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::account_deleted_title()).await
    }

    pub async fn click_continue(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::continue_button()).await
    }
}

#[async_trait]
impl PageObject for SignupPage<'_> {
    fn name(&self) -> &'static str {
        "SignupPage"
    }

    fn path(&self) -> &str {
        "/signup"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("account information title", Self::account_info_title())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}
