//! Shopping cart.

use crate::locator::Selector;
use crate::page_object::{PageContext, PageObject};
use crate::pages::home::HomePage;
use crate::readiness::Landmark;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, DEFAULT_POLL_INTERVAL_MS};
use async_trait::async_trait;
use std::time::Duration;

/// How long a removed row may linger
const ROW_REMOVAL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct CartPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> CartPage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn cart_table() -> Selector {
        Selector::css("#cart_info_table")
    }

    #[must_use]
    pub fn rows() -> Selector {
        Selector::css("#cart_info_table tbody tr")
    }

    #[must_use]
    pub fn product_names() -> Selector {
        Selector::css(".cart_description h4 a")
    }

    #[must_use]
    pub fn product_prices() -> Selector {
        Selector::css(".cart_price p")
    }

    #[must_use]
    pub fn product_quantities() -> Selector {
        Selector::css(".cart_quantity button")
    }

    #[must_use]
    pub fn product_totals() -> Selector {
        Selector::css(".cart_total_price")
    }

    #[must_use]
    pub fn remove_button(index: usize) -> Selector {
        Selector::css(".cart_quantity_delete").nth(index)
    }

    #[must_use]
    pub fn proceed_to_checkout() -> Selector {
        Selector::css_with_text("a", "Proceed To Checkout")
    }

    #[must_use]
    pub fn register_login() -> Selector {
        Selector::css_with_text("u", "Register / Login")
    }

    pub async fn item_count(&self) -> ProbeResult<usize> {
        self.ctx.driver.count(&Self::rows()).await
    }

    async fn texts(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
        Ok(self
            .ctx
            .driver
            .all_text_contents(selector)
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect())
    }

    pub async fn product_name_texts(&self) -> ProbeResult<Vec<String>> {
        self.texts(&Self::product_names()).await
    }

    pub async fn price_texts(&self) -> ProbeResult<Vec<String>> {
        self.texts(&Self::product_prices()).await
    }

    pub async fn total_texts(&self) -> ProbeResult<Vec<String>> {
        self.texts(&Self::product_totals()).await
    }

    /// Quantity of each row; a non-numeric cell is an error
    pub async fn quantities(&self) -> ProbeResult<Vec<u32>> {
        self.texts(&Self::product_quantities())
            .await?
            .into_iter()
            .map(|text| {
                text.parse().map_err(|_| {
                    ProbeError::assertion(format!("cart quantity {text:?} is not a number"))
                })
            })
            .collect()
    }

    pub async fn contains_product(&self, name: &str) -> ProbeResult<bool> {
        Ok(self
            .product_name_texts()
            .await?
            .iter()
            .any(|n| n.contains(name)))
    }

    /// Delete row `index` and wait until the table has one row less
    pub async fn remove_product(&self, index: usize) -> ProbeResult<()> {
        let before = self.item_count().await?;
        self.ctx.driver.click(&Self::remove_button(index)).await?;
        let expected = before.saturating_sub(1);
        let driver = self.ctx.driver;
        poll_until(
            "cart row removal",
            ROW_REMOVAL_TIMEOUT,
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            move || async move { Ok::<_, ProbeError>(driver.count(&Self::rows()).await? == expected) },
        )
        .await
    }

    pub async fn click_proceed_to_checkout(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::proceed_to_checkout()).await
    }

    pub async fn click_register_login(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::register_login()).await
    }

    /// The footer form is shared with the home page
    pub async fn subscribe_to_newsletter(&self, email: &str) -> ProbeResult<()> {
        HomePage::new(self.ctx).subscribe_to_newsletter(email).await
    }
}

#[async_trait]
impl PageObject for CartPage<'_> {
    fn name(&self) -> &'static str {
        "CartPage"
    }

    fn path(&self) -> &str {
        "/view_cart"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("cart table", Self::cart_table())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}
