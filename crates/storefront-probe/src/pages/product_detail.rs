//! Single product view with the review form.

use crate::data::ReviewInput;
use crate::locator::Selector;
use crate::page_object::{PageContext, PageObject, PageVisit};
use crate::readiness::Landmark;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;

const DETAIL_PATTERN: &str = "/product_details/:id";

/// A product page. Built with [`ProductDetailPage::new`] it matches any
/// product and is reached by clicking through a listing; built with
/// [`ProductDetailPage::for_product`] it can also be opened directly.
#[derive(Debug, Clone)]
pub struct ProductDetailPage<'a> {
    ctx: PageContext<'a>,
    path: String,
}

/// Visibility of each detail field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailVisibility {
    pub name: bool,
    pub category: bool,
    pub price: bool,
    pub availability: bool,
    pub condition: bool,
    pub brand: bool,
}

impl DetailVisibility {
    #[must_use]
    pub const fn all(&self) -> bool {
        self.name
            && self.category
            && self.price
            && self.availability
            && self.condition
            && self.brand
    }
}

impl<'a> ProductDetailPage<'a> {
    #[must_use]
    pub fn new(ctx: PageContext<'a>) -> Self {
        Self {
            ctx,
            path: DETAIL_PATTERN.to_string(),
        }
    }

    /// The page of product `id`
    #[must_use]
    pub fn for_product(ctx: PageContext<'a>, id: u32) -> Self {
        Self {
            ctx,
            path: format!("/product_details/{id}"),
        }
    }

    /// Product id when the page is bound to one
    #[must_use]
    pub fn product_id(&self) -> Option<u32> {
        self.path.rsplit('/').next().and_then(|s| s.parse().ok())
    }

    #[must_use]
    pub fn product_name() -> Selector {
        Selector::css(".product-information h2")
    }

    #[must_use]
    pub fn product_price() -> Selector {
        Selector::css(".product-information span span")
    }

    /// Paragraph of the information box starting with `label`
    #[must_use]
    pub fn info_line(label: &str) -> Selector {
        Selector::css_with_text(".product-information p", format!("{label}:"))
    }

    #[must_use]
    pub fn quantity_input() -> Selector {
        Selector::css("#quantity")
    }

    #[must_use]
    pub fn add_to_cart_button() -> Selector {
        Selector::css(".btn.btn-default.cart")
    }

    #[must_use]
    pub fn write_review_link() -> Selector {
        Selector::css_with_text("a", "Write Your Review")
    }

    #[must_use]
    pub fn review_section() -> Selector {
        Selector::css("#reviews")
    }

    #[must_use]
    pub fn review_name() -> Selector {
        Selector::css("#name")
    }

    #[must_use]
    pub fn review_email() -> Selector {
        Selector::css("#email")
    }

    #[must_use]
    pub fn review_text() -> Selector {
        Selector::css("#review")
    }

    #[must_use]
    pub fn review_submit() -> Selector {
        Selector::css("#button-review")
    }

    #[must_use]
    pub fn review_success() -> Selector {
        Selector::css_with_text("span", "Thank you for your review.")
    }

    async fn text(&self, selector: &Selector) -> ProbeResult<String> {
        Ok(self
            .ctx
            .driver
            .text_content(selector)
            .await?
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    pub async fn name_text(&self) -> ProbeResult<String> {
        self.text(&Self::product_name()).await
    }

    pub async fn price_text(&self) -> ProbeResult<String> {
        self.text(&Self::product_price()).await
    }

    pub async fn category_text(&self) -> ProbeResult<String> {
        self.text(&Self::info_line("Category")).await
    }

    pub async fn detail_visibility(&self) -> ProbeResult<DetailVisibility> {
        let driver = self.ctx.driver;
        Ok(DetailVisibility {
            name: driver.is_visible(&Self::product_name()).await?,
            category: driver.is_visible(&Self::info_line("Category")).await?,
            price: driver.is_visible(&Self::product_price()).await?,
            availability: driver.is_visible(&Self::info_line("Availability")).await?,
            condition: driver.is_visible(&Self::info_line("Condition")).await?,
            brand: driver.is_visible(&Self::info_line("Brand")).await?,
        })
    }

    pub async fn set_quantity(&self, quantity: u32) -> ProbeResult<()> {
        self.ctx
            .driver
            .fill(&Self::quantity_input(), &quantity.to_string())
            .await
    }

    pub async fn add_to_cart(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::add_to_cart_button()).await
    }

    /// Scroll to the review form and open it
    pub async fn open_review_form(&self) -> ProbeResult<()> {
        self.ctx.driver.scroll_into_view(&Self::review_section()).await?;
        self.ctx.driver.click(&Self::write_review_link()).await
    }

    pub async fn write_review(&self, review: &ReviewInput) -> ProbeResult<()> {
        self.ctx.driver.fill(&Self::review_name(), &review.name).await?;
        self.ctx
            .driver
            .fill(&Self::review_email(), &review.email)
            .await?;
        self.ctx
            .driver
            .fill(&Self::review_text(), &review.review)
            .await?;
        self.ctx.driver.click(&Self::review_submit()).await
    }

    pub async fn is_review_accepted(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::review_success()).await
    }
}

#[async_trait]
impl PageObject for ProductDetailPage<'_> {
    fn name(&self) -> &'static str {
        "ProductDetailPage"
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("product name", Self::product_name())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }

    async fn open(&self) -> ProbeResult<PageVisit> {
        if self.product_id().is_none() {
            return Err(ProbeError::page(
                "ProductDetailPage has no product id; use for_product or click through a listing",
            ));
        }
        let navigation = self.ctx.navigator().navigate(&self.path).await?;
        let readiness = self.wait_until_ready().await?;
        Ok(PageVisit {
            navigation,
            readiness,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use crate::driver::PageDriver;
    use crate::page_object::SiteSettings;

    #[tokio::test]
    async fn test_detail_visibility() {
        let driver = MockDriver::new();
        driver.add_element(&ProductDetailPage::product_name(), MockElement::text(" Blue Top "));
        driver.add_element(&ProductDetailPage::product_price(), MockElement::text("Rs. 500"));
        for label in ["Category", "Availability", "Condition"] {
            driver.add_element(&ProductDetailPage::info_line(label), MockElement::visible());
        }
        let site = SiteSettings::new("https://shop.test");
        let page = ProductDetailPage::new(PageContext::new(&driver, &site));

        let seen = page.detail_visibility().await.unwrap();
        assert!(seen.name && seen.price && seen.condition);
        assert!(!seen.brand);
        assert!(!seen.all());
        assert_eq!(page.name_text().await.unwrap(), "Blue Top");

        driver.add_element(&ProductDetailPage::info_line("Brand"), MockElement::visible());
        assert!(page.detail_visibility().await.unwrap().all());
    }

    #[tokio::test]
    async fn test_quantity_is_written_as_text() {
        let driver = MockDriver::new();
        driver.add_element(&ProductDetailPage::quantity_input(), MockElement::visible());
        let site = SiteSettings::new("https://shop.test");
        let page = ProductDetailPage::new(PageContext::new(&driver, &site));
        page.set_quantity(4).await.unwrap();
        assert_eq!(
            driver.filled_value(&ProductDetailPage::quantity_input()).as_deref(),
            Some("4")
        );
    }

    #[test]
    fn test_matches_any_product_id() {
        let driver = MockDriver::new();
        let site = SiteSettings::default();
        let page = ProductDetailPage::new(PageContext::new(&driver, &site));
        let matcher = crate::page_object::UrlMatcher::new(page.path());
        assert!(matcher.matches("/product_details/30"));
        assert_eq!(page.product_id(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_navigates_to_bound_product() {
        let driver = MockDriver::new();
        driver.add_element(&Selector::css("body"), MockElement::visible());
        driver.add_element(
            &Selector::css(crate::readiness::STRUCTURAL_LANDMARK_SELECTOR),
            MockElement::visible(),
        );
        driver.add_element(&ProductDetailPage::product_name(), MockElement::text("Blue Top"));
        let site = SiteSettings::new("https://shop.test");
        let page = ProductDetailPage::for_product(PageContext::new(&driver, &site), 1);
        assert_eq!(page.product_id(), Some(1));

        page.open().await.unwrap();
        assert_eq!(
            driver.current_url().await.unwrap(),
            "https://shop.test/product_details/1"
        );
        assert!(page.is_current().await.unwrap());
        assert!(!driver.was_called("goto:https://shop.test/product_details/:id"));
    }

    #[tokio::test]
    async fn test_open_without_id_is_refused() {
        let driver = MockDriver::new();
        let site = SiteSettings::new("https://shop.test");
        let page = ProductDetailPage::new(PageContext::new(&driver, &site));
        let err = page.open().await.unwrap_err();
        assert!(err.to_string().contains("product id"));
        assert!(!driver.was_called("goto"));
    }
}
