//! Store front page.

use crate::locator::Selector;
use crate::page_object::{PageContext, PageObject};
use crate::readiness::Landmark;
use crate::result::ProbeResult;
use async_trait::async_trait;

/// Landing page with header links, carousel, sidebar and footer
#[derive(Debug, Clone, Copy)]
pub struct HomePage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> HomePage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn signup_login_link() -> Selector {
        Selector::css(r#"a[href="/login"]"#).first()
    }

    #[must_use]
    pub fn contact_us_link() -> Selector {
        Selector::css(r#"a[href="/contact_us"]"#).first()
    }

    #[must_use]
    pub fn test_cases_link() -> Selector {
        Selector::css(r#"a[href="/test_cases"]"#).first()
    }

    #[must_use]
    pub fn products_link() -> Selector {
        Selector::css(r#"a[href="/products"]"#).first()
    }

    #[must_use]
    pub fn cart_link() -> Selector {
        Selector::css(r#"a[href="/view_cart"]"#).first()
    }

    #[must_use]
    pub fn logout_link() -> Selector {
        Selector::css(r#"a[href="/logout"]"#)
    }

    #[must_use]
    pub fn delete_account_link() -> Selector {
        Selector::css(r#"a[href="/delete_account"]"#)
    }

    /// "Logged in as <name>" entry of the header
    #[must_use]
    pub fn logged_in_as() -> Selector {
        Selector::css_with_text("li", "Logged in as")
    }

    #[must_use]
    pub fn carousel() -> Selector {
        Selector::css("#slider-carousel")
    }

    #[must_use]
    pub fn features_items() -> Selector {
        Selector::css(".features_items")
    }

    #[must_use]
    pub fn subscription_section() -> Selector {
        Selector::css("#footer")
    }

    #[must_use]
    pub fn subscription_title() -> Selector {
        Selector::css_with_text("h2", "Subscription")
    }

    #[must_use]
    pub fn subscription_email() -> Selector {
        Selector::css("#susbscribe_email")
    }

    #[must_use]
    pub fn subscription_submit() -> Selector {
        Selector::css("#subscribe")
    }

    #[must_use]
    pub fn subscription_success() -> Selector {
        Selector::css(".alert-success")
    }

    #[must_use]
    pub fn recommended_items_title() -> Selector {
        Selector::css_with_text("h2", "recommended items")
    }

    #[must_use]
    pub fn recommended_add_to_cart(index: usize) -> Selector {
        Selector::css(".recommended_items .btn-default").nth(index)
    }

    #[must_use]
    pub fn scroll_up_button() -> Selector {
        Selector::css("#scrollUp")
    }

    #[must_use]
    pub fn full_fledged_text() -> Selector {
        Selector::css_with_text("h2", "Full-Fledged practice website for Automation Engineers").first()
    }

    #[must_use]
    pub fn categories_sidebar() -> Selector {
        Selector::css(".left-sidebar .panel-group")
    }

    #[must_use]
    pub fn women_category() -> Selector {
        Selector::css(r##"a[href="#Women"]"##)
    }

    #[must_use]
    pub fn men_category() -> Selector {
        Selector::css(r##"a[href="#Men"]"##)
    }

    #[must_use]
    pub fn brands_sidebar() -> Selector {
        Selector::css(".brands_products")
    }

    pub async fn click_signup_login(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::signup_login_link()).await
    }

    pub async fn click_contact_us(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::contact_us_link()).await
    }

    pub async fn click_test_cases(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::test_cases_link()).await
    }

    pub async fn click_products(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::products_link()).await
    }

    pub async fn click_cart(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::cart_link()).await
    }

    pub async fn click_logout(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::logout_link()).await
    }

    pub async fn click_delete_account(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::delete_account_link()).await
    }

    pub async fn is_user_logged_in(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::logged_in_as()).await
    }

    /// Header text naming the signed-in user, empty when signed out
    pub async fn logged_in_username(&self) -> ProbeResult<String> {
        Ok(self
            .ctx
            .driver
            .text_content(&Self::logged_in_as())
            .await?
            .unwrap_or_default())
    }

    pub async fn subscribe_to_newsletter(&self, email: &str) -> ProbeResult<()> {
        self.ctx
            .driver
            .scroll_into_view(&Self::subscription_section())
            .await?;
        self.ctx.driver.fill(&Self::subscription_email(), email).await?;
        self.ctx.driver.click(&Self::subscription_submit()).await
    }

    pub async fn subscription_message(&self) -> ProbeResult<Option<String>> {
        self.ctx
            .driver
            .text_content(&Self::subscription_success())
            .await
    }

    pub async fn add_recommended_item_to_cart(&self, index: usize) -> ProbeResult<()> {
        self.ctx
            .driver
            .click(&Self::recommended_add_to_cart(index))
            .await
    }

    /// Bring the footer into view
    pub async fn scroll_to_bottom(&self) -> ProbeResult<()> {
        self.ctx
            .driver
            .scroll_into_view(&Self::subscription_section())
            .await
    }

    pub async fn scroll_to_top(&self) -> ProbeResult<()> {
        self.ctx.base().scroll_to_top().await
    }

    pub async fn click_scroll_up(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::scroll_up_button()).await
    }

    pub async fn click_women_subcategory(&self, subcategory: &str) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::women_category()).await?;
        let link = Selector::css_with_text(r#"#Women a[href*="/category_products/"]"#, subcategory);
        self.ctx.driver.click(&link).await
    }

    pub async fn click_men_subcategory(&self, subcategory: &str) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::men_category()).await?;
        let link = Selector::css_with_text(r#"#Men a[href*="/category_products/"]"#, subcategory);
        self.ctx.driver.click(&link).await
    }

    pub async fn click_brand(&self, brand: &str) -> ProbeResult<()> {
        let link = Selector::css_with_text(".brands_products a", brand);
        self.ctx.driver.click(&link).await
    }
}

#[async_trait]
impl PageObject for HomePage<'_> {
    fn name(&self) -> &'static str {
        "HomePage"
    }

    fn path(&self) -> &str {
        "/"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("carousel", Self::carousel())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}
