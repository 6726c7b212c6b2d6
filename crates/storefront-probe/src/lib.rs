//! Storefront Probe: resilient page-object journeys for e-commerce demo sites
//!
//! Scripted shopper journeys (registration, login, cart, checkout, search,
//! reviews) driven through page objects over a headless Chromium. Every page
//! load goes through navigate-with-fallback and settle-and-wait, so a slow
//! third-party host degrades to weaker readiness signals instead of failing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   STOREFRONT PROBE Architecture                 │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Journey    │    │ Page       │    │ PageDriver │            │
//! │   │ catalogue  │───►│ objects    │───►│ (chromium  │            │
//! │   │ + runner   │    │ + nav/wait │    │  or mock)  │            │
//! │   └─────┬──────┘    └────────────┘    └────────────┘            │
//! │         ▼                                                       │
//! │   ┌────────────┐                                                │
//! │   │ Reporter   │  json · junit · html · allure                  │
//! │   └────────────┘                                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront_probe::prelude::*;
//!
//! # async fn run() -> ProbeResult<()> {
//! let config = SuiteConfig::from_env()?;
//! let factory = Arc::new(MockSessionFactory::new(MockDriver::new));
//! let runner = SuiteRunner::new(factory, config.site_settings(), config.test_data())
//!     .with_filter(JourneyFilter::all().with_tag("@smoke"));
//! let summary = runner.run(&catalogue()).await;
//! summary.reporter().write_all(&config.output_dirs())?;
//! # Ok(())
//! # }
//! ```

// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_frames))]

#[cfg(feature = "browser")]
mod browser;
pub mod components;
mod config;
mod data;
mod driver;
mod fixture;
mod locator;
pub mod logging;
pub mod mock;
pub mod navigation;
mod page_object;
pub mod pages;
pub mod readiness;
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub mod reporter;
mod result;
mod storage_state;
pub mod suite;
pub mod wait;

#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumPage, ChromiumSessionFactory};
pub use config::{
    parse_flag, SuiteConfig, DEFAULT_USER_EMAIL, DEFAULT_USER_PASSWORD, ENV_BASE_URL, ENV_CHROMIUM_PATH,
    ENV_CI, ENV_HEADLESS, ENV_OUTPUT_DIR, ENV_SITE_PROFILE, ENV_STORAGE_STATE_PATH,
    ENV_USER_EMAIL, ENV_USER_PASSWORD,
};
pub use data::{
    unique_email, Address, Categories, ContactMessage, PaymentCard, RegistrationProfile,
    ReviewInput, TestData, Title, UserCredentials,
};
pub use driver::{DriverConfig, PageDriver};
pub use fixture::{
    AuthSnapshot, AuthenticatedSession, Fixture, FixtureManager, FixtureState, OutputDirs,
    Session, SessionFactory, SignInMethod,
};
pub use locator::Selector;
pub use navigation::{
    NavigationOutcome, NavigationPolicy, NavigationRequest, Navigator, RetryBudget, SiteProfile,
};
pub use page_object::{
    sanitize_file_name, BasePage, PageContext, PageObject, PageVisit, SiteSettings, UrlMatcher,
    DEFAULT_BASE_URL, DEFAULT_SCREENSHOT_DIR,
};
pub use readiness::{Landmark, PageReadinessCheck, ReadinessPolicy};
pub use reporter::{Reporter, Severity, TestResultEntry, TestStatus};
pub use result::{ensure, ProbeError, ProbeResult};
pub use storage_state::{
    capture_authenticated_state, Cookie, OriginState, StorageEntry, StorageState,
    DEFAULT_STORAGE_STATE_PATH,
};
pub use wait::{ElementState, WaitStrategy};

/// Everything a journey or a runner binary usually needs
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::browser::*;
    pub use super::components::*;
    pub use super::config::*;
    pub use super::data::*;
    pub use super::driver::*;
    pub use super::fixture::*;
    pub use super::locator::*;
    pub use super::mock::{MockAction, MockDriver, MockElement, MockSessionFactory};
    pub use super::navigation::*;
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::readiness::*;
    pub use super::reporter::*;
    pub use super::result::*;
    pub use super::storage_state::*;
    pub use super::suite::*;
    pub use super::wait::*;
}
