//! Checkout review and card payment.

use crate::data::{Address, PaymentCard};
use crate::locator::Selector;
use crate::page_object::{PageContext, PageObject};
use crate::readiness::Landmark;
use crate::result::ProbeResult;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy)]
pub struct CheckoutPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> CheckoutPage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn address_details_title() -> Selector {
        Selector::css_with_text("h2", "Address Details")
    }

    #[must_use]
    pub fn review_order_title() -> Selector {
        Selector::css_with_text("h2", "Review Your Order")
    }

    #[must_use]
    pub fn delivery_address() -> Selector {
        Selector::css("#address_delivery")
    }

    #[must_use]
    pub fn invoice_address() -> Selector {
        Selector::css("#address_invoice")
    }

    #[must_use]
    pub fn comment() -> Selector {
        Selector::css(r#"textarea[name="message"]"#)
    }

    #[must_use]
    pub fn place_order() -> Selector {
        Selector::css(r#"a[href="/payment"]"#)
    }

    async fn box_text(&self, selector: &Selector) -> ProbeResult<String> {
        Ok(self
            .ctx
            .driver
            .text_content(selector)
            .await?
            .unwrap_or_default())
    }

    pub async fn delivery_address_text(&self) -> ProbeResult<String> {
        self.box_text(&Self::delivery_address()).await
    }

    pub async fn invoice_address_text(&self) -> ProbeResult<String> {
        self.box_text(&Self::invoice_address()).await
    }

    /// Whether the delivery box shows every line of `address`
    pub async fn shows_delivery_address(&self, address: &Address) -> ProbeResult<bool> {
        Ok(shows_address(&self.delivery_address_text().await?, address))
    }

    /// Whether the billing box shows every line of `address`
    pub async fn shows_invoice_address(&self, address: &Address) -> ProbeResult<bool> {
        Ok(shows_address(&self.invoice_address_text().await?, address))
    }

    pub async fn add_comment(&self, comment: &str) -> ProbeResult<()> {
        self.ctx.driver.fill(&Self::comment(), comment).await
    }

    pub async fn click_place_order(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::place_order()).await
    }
}

fn shows_address(text: &str, address: &Address) -> bool {
    let mut expected = vec![
        address.first_name.as_str(),
        address.last_name.as_str(),
        address.company.as_str(),
        address.address1.as_str(),
        address.city.as_str(),
        address.state.as_str(),
        address.zipcode.as_str(),
        address.country.as_str(),
        address.mobile_number.as_str(),
    ];
    if let Some(line) = &address.address2 {
        expected.push(line.as_str());
    }
    expected.iter().all(|part| text.contains(part))
}

#[async_trait]
impl PageObject for CheckoutPage<'_> {
    fn name(&self) -> &'static str {
        "CheckoutPage"
    }

    fn path(&self) -> &str {
        "/checkout"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("review your order title", Self::review_order_title())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PaymentPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> PaymentPage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    /// Card field tagged with `data-qa`
    #[must_use]
    pub fn card_field(qa: &str) -> Selector {
        Selector::css(format!(r#"input[data-qa="{qa}"]"#))
    }

    #[must_use]
    pub fn pay_button() -> Selector {
        Selector::css(r#"button[data-qa="pay-button"]"#)
    }

    #[must_use]
    pub fn order_placed_title() -> Selector {
        Selector::css(r#"h2[data-qa="order-placed"]"#)
    }

    #[must_use]
    pub fn download_invoice() -> Selector {
        Selector::css_with_text("a", "Download Invoice")
    }

    #[must_use]
    pub fn continue_button() -> Selector {
        Selector::css(r#"a[data-qa="continue-button"]"#)
    }

    pub async fn fill_card(&self, card: &PaymentCard) -> ProbeResult<()> {
        let driver = self.ctx.driver;
        driver
            .fill(&Self::card_field("name-on-card"), &card.name_on_card)
            .await?;
        driver
            .fill(&Self::card_field("card-number"), &card.card_number)
            .await?;
        driver.fill(&Self::card_field("cvc"), &card.cvc).await?;
        driver
            .fill(&Self::card_field("expiry-month"), &card.expiration_month)
            .await?;
        driver
            .fill(&Self::card_field("expiry-year"), &card.expiration_year)
            .await
    }

    pub async fn pay_and_confirm(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::pay_button()).await
    }

    pub async fn is_order_placed(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::order_placed_title()).await
    }

    pub async fn click_download_invoice(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::download_invoice()).await
    }

    pub async fn click_continue(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::continue_button()).await
    }
}

#[async_trait]
impl PageObject for PaymentPage<'_> {
    fn name(&self) -> &'static str {
        "PaymentPage"
    }

    fn path(&self) -> &str {
        "/payment"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("pay button", Self::pay_button())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}
