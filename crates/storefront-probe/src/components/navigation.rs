//! Site header: primary links, user menu, cart badge and search.

use crate::locator::Selector;
use crate::page_object::PageContext;
use crate::result::{ProbeError, ProbeResult};

#[derive(Debug, Clone, Copy)]
pub struct NavigationComponent<'a> {
    ctx: PageContext<'a>,
}

impl<'a> NavigationComponent<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn link(name: &str) -> Selector {
        Selector::role("link", Some(name))
    }

    #[must_use]
    pub fn logout_button() -> Selector {
        Selector::role("button", Some("Logout"))
    }

    #[must_use]
    pub fn profile_dropdown() -> Selector {
        Selector::test_id("profile-dropdown")
    }

    #[must_use]
    pub fn user_menu_button() -> Selector {
        Selector::test_id("user-menu-button")
    }

    #[must_use]
    pub fn cart_icon() -> Selector {
        Selector::test_id("cart-icon")
    }

    #[must_use]
    pub fn cart_item_count() -> Selector {
        Selector::test_id("cart-item-count")
    }

    #[must_use]
    pub fn search_input() -> Selector {
        Selector::placeholder("Search...")
    }

    #[must_use]
    pub fn search_button() -> Selector {
        Selector::role("button", Some("Search"))
    }

    #[must_use]
    pub fn mobile_menu_button() -> Selector {
        Selector::test_id("mobile-menu-button")
    }

    #[must_use]
    pub fn menu() -> Selector {
        Selector::role("navigation", None)
    }

    pub async fn go_to_home(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::link("Home")).await
    }

    pub async fn go_to_about(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::link("About")).await
    }

    pub async fn go_to_contact(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::link("Contact")).await
    }

    pub async fn go_to_login(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::link("Login")).await
    }

    pub async fn go_to_cart(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::cart_icon()).await
    }

    /// Log out through the user menu
    pub async fn logout(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::user_menu_button()).await?;
        self.ctx.driver.click(&Self::logout_button()).await
    }

    pub async fn open_profile_dropdown(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::profile_dropdown()).await
    }

    /// Number on the cart badge; an empty or missing badge reads as zero
    pub async fn cart_item_count_value(&self) -> ProbeResult<u32> {
        let text = self
            .ctx
            .driver
            .text_content(&Self::cart_item_count())
            .await?
            .unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse()
            .map_err(|_| ProbeError::assertion(format!("cart badge is not a number: {text:?}")))
    }

    pub async fn search(&self, query: &str) -> ProbeResult<()> {
        self.ctx.driver.fill(&Self::search_input(), query).await?;
        self.ctx.driver.click(&Self::search_button()).await
    }

    pub async fn is_logged_in(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::user_menu_button()).await
    }

    pub async fn toggle_mobile_menu(&self) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::mobile_menu_button()).await
    }

    pub async fn is_visible(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::menu()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use crate::page_object::SiteSettings;

    #[tokio::test]
    async fn test_cart_badge() {
        let driver = MockDriver::new();
        let site = SiteSettings::new("https://app.test");
        let nav = NavigationComponent::new(PageContext::new(&driver, &site));
        assert_eq!(nav.cart_item_count_value().await.unwrap(), 0);

        driver.add_element(&NavigationComponent::cart_item_count(), MockElement::text(" 3 "));
        assert_eq!(nav.cart_item_count_value().await.unwrap(), 3);

        driver.add_element(&NavigationComponent::cart_item_count(), MockElement::text("many"));
        assert!(nav.cart_item_count_value().await.is_err());
    }

    #[tokio::test]
    async fn test_logout_opens_user_menu_first() {
        let driver = MockDriver::new();
        driver.add_element(&NavigationComponent::user_menu_button(), MockElement::visible());
        driver.add_element(&NavigationComponent::logout_button(), MockElement::visible());
        let site = SiteSettings::new("https://app.test");
        let nav = NavigationComponent::new(PageContext::new(&driver, &site));
        assert!(nav.is_logged_in().await.unwrap());
        nav.logout().await.unwrap();
        let clicks: Vec<String> = driver
            .history()
            .into_iter()
            .filter(|c| c.starts_with("click:"))
            .collect();
        assert_eq!(
            clicks,
            vec![
                "click:testid=user-menu-button".to_string(),
                "click:role=button[name=Logout]".to_string(),
            ]
        );
    }
}
