//! Product listing and search.

use crate::locator::Selector;
use crate::page_object::{PageContext, PageObject};
use crate::readiness::Landmark;
use crate::result::ProbeResult;
use async_trait::async_trait;
use std::time::Duration;

/// How long the add-to-cart modal may take to appear
const CART_MODAL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct ProductsPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> ProductsPage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn all_products_title() -> Selector {
        Selector::css_with_text("h2", "All Products")
    }

    #[must_use]
    pub fn products_list() -> Selector {
        Selector::css(".features_items")
    }

    #[must_use]
    pub fn view_product_link(index: usize) -> Selector {
        Selector::css_with_text("a", "View Product").nth(index)
    }

    #[must_use]
    pub fn search_input() -> Selector {
        Selector::css("#search_product")
    }

    #[must_use]
    pub fn search_button() -> Selector {
        Selector::css("#submit_search")
    }

    #[must_use]
    pub fn searched_products_title() -> Selector {
        Selector::css_with_text("h2", "Searched Products")
    }

    /// Product cards in the listing
    #[must_use]
    pub fn product_cards() -> Selector {
        Selector::css(".features_items .product-image-wrapper")
    }

    /// Add-to-cart button revealed by hovering card `index`
    #[must_use]
    pub fn overlay_add_to_cart(index: usize) -> Selector {
        Selector::css(".features_items .overlay-content .add-to-cart").nth(index)
    }

    #[must_use]
    pub fn continue_shopping() -> Selector {
        Selector::css_with_text("button", "Continue Shopping")
    }

    #[must_use]
    pub fn view_cart() -> Selector {
        Selector::css_with_text("a", "View Cart")
    }

    #[must_use]
    pub fn category_section() -> Selector {
        Selector::css(".category-tab")
    }

    #[must_use]
    pub fn brands_section() -> Selector {
        Selector::css(".brands_products")
    }

    pub async fn click_view_product(&self, index: usize) -> ProbeResult<()> {
        self.ctx
            .driver
            .click(&Self::view_product_link(index))
            .await
    }

    pub async fn search(&self, term: &str) -> ProbeResult<()> {
        self.ctx.driver.fill(&Self::search_input(), term).await?;
        self.ctx.driver.click(&Self::search_button()).await
    }

    pub async fn result_count(&self) -> ProbeResult<usize> {
        self.ctx.driver.count(&Self::product_cards()).await
    }

    /// Hover a card, add it to the cart and wait for the confirmation modal
    pub async fn hover_and_add_to_cart(&self, index: usize) -> ProbeResult<()> {
        self.ctx
            .driver
            .hover(&Self::product_cards().nth(index))
            .await?;
        self.ctx
            .driver
            .click(&Self::overlay_add_to_cart(index))
            .await?;
        self.ctx
            .base()
            .wait_for_visible(&Self::continue_shopping(), CART_MODAL_TIMEOUT)
            .await
    }

    pub async fn click_continue_shopping(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::continue_shopping()).await
    }

    pub async fn click_view_cart(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::view_cart()).await
    }

    /// Add the first `limit` results (all when `None`) one after another
    pub async fn add_results_to_cart(&self, limit: Option<usize>) -> ProbeResult<usize> {
        let available = self.result_count().await?;
        let wanted = limit.map_or(available, |n| n.min(available));
        for index in 0..wanted {
            self.hover_and_add_to_cart(index).await?;
            self.click_continue_shopping().await?;
        }
        Ok(wanted)
    }
}

#[async_trait]
impl PageObject for ProductsPage<'_> {
    fn name(&self) -> &'static str {
        "ProductsPage"
    }

    fn path(&self) -> &str {
        "/products"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("all products title", Self::all_products_title())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}
