//! Site footer.

use crate::locator::Selector;
use crate::page_object::PageContext;
use crate::result::{ProbeError, ProbeResult};
use std::fmt;
use std::str::FromStr;

/// Social network linked from the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialPlatform {
    Facebook,
    Twitter,
    LinkedIn,
    Instagram,
}

impl SocialPlatform {
    /// Accessible name of the footer link
    #[must_use]
    pub const fn link_name(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Twitter => "Twitter",
            Self::LinkedIn => "LinkedIn",
            Self::Instagram => "Instagram",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.link_name())
    }
}

impl FromStr for SocialPlatform {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "facebook" => Ok(Self::Facebook),
            "twitter" => Ok(Self::Twitter),
            "linkedin" => Ok(Self::LinkedIn),
            "instagram" => Ok(Self::Instagram),
            other => Err(ProbeError::Config {
                message: format!("unsupported social media platform: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FooterComponent<'a> {
    ctx: PageContext<'a>,
}

impl<'a> FooterComponent<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn footer() -> Selector {
        Selector::role("contentinfo", None)
    }

    #[must_use]
    pub fn copyright() -> Selector {
        Selector::test_id("copyright-text")
    }

    #[must_use]
    pub fn contact_email() -> Selector {
        Selector::test_id("contact-email")
    }

    #[must_use]
    pub fn social_links() -> Selector {
        Selector::test_id("social-media-links")
    }

    #[must_use]
    pub fn social_link(platform: SocialPlatform) -> Selector {
        Selector::role("link", Some(platform.link_name()))
    }

    #[must_use]
    pub fn newsletter() -> Selector {
        Selector::test_id("newsletter-subscription")
    }

    #[must_use]
    pub fn email_input() -> Selector {
        Selector::placeholder("Enter your email")
    }

    #[must_use]
    pub fn subscribe_button() -> Selector {
        Selector::role("button", Some("Subscribe"))
    }

    pub async fn copyright_text(&self) -> ProbeResult<String> {
        Ok(self
            .ctx
            .driver
            .text_content(&Self::copyright())
            .await?
            .unwrap_or_default())
    }

    pub async fn contact_email_text(&self) -> ProbeResult<String> {
        Ok(self
            .ctx
            .driver
            .text_content(&Self::contact_email())
            .await?
            .unwrap_or_default())
    }

    pub async fn go_to_privacy_policy(&self) -> ProbeResult<()> {
        self.ctx
            .driver
            .click(&Selector::role("link", Some("Privacy Policy")))
            .await
    }

    pub async fn go_to_terms_of_service(&self) -> ProbeResult<()> {
        self.ctx
            .driver
            .click(&Selector::role("link", Some("Terms of Service")))
            .await
    }

    pub async fn subscribe_to_newsletter(&self, email: &str) -> ProbeResult<()> {
        self.ctx.driver.fill(&Self::email_input(), email).await?;
        self.ctx.driver.click(&Self::subscribe_button()).await
    }

    pub async fn click_social_link(&self, platform: SocialPlatform) -> ProbeResult<()> {
        self.ctx.driver.click(&Self::social_link(platform)).await
    }

    pub async fn is_visible(&self) -> ProbeResult<bool> {
        self.ctx.driver.is_visible(&Self::footer()).await
    }

    pub async fn scroll_into_view(&self) -> ProbeResult<()> {
        self.ctx.driver.scroll_into_view(&Self::footer()).await
    }
}
