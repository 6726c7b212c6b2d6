//! Cucumber runner for the feature files under `tests/features/`.
//!
//! Needs the `browser` feature and a local Chromium; the store URL and the
//! account come from the same environment variables as the CLI.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use cucumber::gherkin::Step;
use cucumber::{given, then, when, World};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use storefront_probe::prelude::*;

#[derive(Default, World)]
pub struct StoreWorld {
    config: Option<SuiteConfig>,
    browser: Option<Arc<ChromiumBrowser>>,
    session: Option<Session>,
    site: SiteSettings,
    registration: Option<RegistrationProfile>,
}

impl fmt::Debug for StoreWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreWorld")
            .field("base_url", &self.site.base_url)
            .field("open", &self.session.is_some())
            .finish()
    }
}

impl StoreWorld {
    async fn start(&mut self) -> ProbeResult<()> {
        if self.session.is_some() {
            return Ok(());
        }
        let config = SuiteConfig::from_env()?;
        let browser = Arc::new(ChromiumBrowser::launch(config.driver_config()).await?);
        let page = browser.new_page().await?;
        self.site = config.site_settings();
        self.session = Some(Session::new(Arc::new(page)));
        self.browser = Some(browser);
        self.config = Some(config);
        Ok(())
    }

    fn ctx(&self) -> ProbeResult<PageContext<'_>> {
        self.session
            .as_ref()
            .map(|s| s.context(&self.site))
            .ok_or_else(|| ProbeError::page("no page open, start with the home page"))
    }

    fn registration(&mut self) -> ProbeResult<&mut RegistrationProfile> {
        self.registration
            .as_mut()
            .ok_or_else(|| ProbeError::page("no signup started, enter a name first"))
    }

    async fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.teardown().await;
        }
        if let Some(browser) = self.browser.take() {
            let _ = browser.close().await;
        }
    }
}

fn button(name: &str) -> ProbeResult<Selector> {
    Ok(match name {
        "Signup / Login" => HomePage::signup_login_link(),
        "Contact us" => HomePage::contact_us_link(),
        "Test Cases" => HomePage::test_cases_link(),
        "Products" => HomePage::products_link(),
        "Cart" => HomePage::cart_link(),
        "Logout" => HomePage::logout_link(),
        "Delete Account" => HomePage::delete_account_link(),
        "Signup" => LoginPage::signup_button(),
        "Create Account" => SignupPage::create_account_button(),
        "Continue" => SignupPage::continue_button(),
        "Continue Shopping" => ProductsPage::continue_shopping(),
        "View Cart" => ProductsPage::view_cart(),
        other => return Err(ProbeError::assertion(format!("unknown button {other:?}"))),
    })
}

#[given("I navigate to the home page")]
async fn navigate_home(world: &mut StoreWorld) -> ProbeResult<()> {
    world.start().await?;
    HomePage::new(world.ctx()?).open().await.map(|_| ())
}

#[when(expr = "I click on {string} button")]
async fn click_button(world: &mut StoreWorld, name: String) -> ProbeResult<()> {
    let ctx = world.ctx()?;
    ctx.driver.click(&button(&name)?).await?;
    ctx.base().settle_current().await.map(|_| ())
}

#[when("I login with valid credentials")]
async fn login_valid(world: &mut StoreWorld) -> ProbeResult<()> {
    let user = world
        .config
        .as_ref()
        .map(SuiteConfig::credentials)
        .ok_or_else(|| ProbeError::page("not started"))?;
    LoginPage::new(world.ctx()?)
        .login(&user.email, &user.password)
        .await
}

#[when(expr = "I enter incorrect email {string} and password {string}")]
async fn login_invalid(world: &mut StoreWorld, email: String, password: String) -> ProbeResult<()> {
    LoginPage::new(world.ctx()?).login(&email, &password).await
}

#[when(expr = "I search for {string}")]
async fn search(world: &mut StoreWorld, term: String) -> ProbeResult<()> {
    ProductsPage::new(world.ctx()?).search(&term).await
}

/// Headings the store renders in upper case; anything else is matched as text
fn heading(text: &str) -> Selector {
    match text {
        "New User Signup!" => LoginPage::new_user_signup_title(),
        "Login to your account" => LoginPage::login_title(),
        "Enter Account Information" => SignupPage::account_info_title(),
        "Account Created!" => SignupPage::account_created_title(),
        "Account Deleted!" => SignupPage::account_deleted_title(),
        "Searched Products" => ProductsPage::searched_products_title(),
        other => Selector::text(other).first(),
    }
}

#[then(expr = "I should see {string} is visible")]
async fn text_visible(world: &mut StoreWorld, text: String) -> ProbeResult<()> {
    world
        .ctx()?
        .base()
        .wait_for_visible(&heading(&text), EXPECT_TIMEOUT)
        .await
}

#[when(expr = "I enter name {string} and email address")]
async fn enter_signup_name(world: &mut StoreWorld, name: String) -> ProbeResult<()> {
    let credentials = world
        .config
        .as_ref()
        .map(SuiteConfig::credentials)
        .ok_or_else(|| ProbeError::page("not started"))?;
    let mut profile = TestData::new(credentials).registration();
    profile.name = name;
    let ctx = world.ctx()?;
    let login = LoginPage::new(ctx);
    ctx.driver.fill(&LoginPage::signup_name(), &profile.name).await?;
    ctx.driver.fill(&LoginPage::signup_email(), &profile.email).await?;
    ensure(login.is_login_form_visible().await?, "signup form hidden")?;
    world.registration = Some(profile);
    Ok(())
}

#[when(expr = "I fill in the account information with title {string}, password {string}")]
async fn fill_account(world: &mut StoreWorld, title: String, password: String) -> ProbeResult<()> {
    let title = match title.as_str() {
        "Mr" => Title::Mr,
        "Mrs" => Title::Mrs,
        other => return Err(ProbeError::assertion(format!("unknown title {other:?}"))),
    };
    let profile = world.registration()?;
    profile.title = title;
    profile.password = password;
    let profile = profile.clone();
    SignupPage::new(world.ctx()?)
        .fill_account_information(&profile)
        .await
}

/// First data row of a header-and-rows table, keyed by column
fn first_row(step: &Step) -> ProbeResult<HashMap<&str, &str>> {
    let rows = step
        .table
        .as_ref()
        .map(|t| t.rows.as_slice())
        .unwrap_or_default();
    match rows {
        [header, values, ..] => Ok(header
            .iter()
            .map(String::as_str)
            .zip(values.iter().map(String::as_str))
            .collect()),
        _ => Err(ProbeError::assertion("expected a header row and a value row")),
    }
}

#[when("I fill in address information")]
async fn fill_address(world: &mut StoreWorld, step: &Step) -> ProbeResult<()> {
    let row = first_row(step)?;
    let column = |key: &str| {
        row.get(key)
            .map(|v| (*v).to_string())
            .ok_or_else(|| ProbeError::assertion(format!("address table has no {key:?} column")))
    };
    let address = Address {
        first_name: column("first_name")?,
        last_name: column("last_name")?,
        company: column("company")?,
        address1: column("address1")?,
        address2: column("address2").ok().filter(|v| !v.is_empty()),
        country: column("country")?,
        state: column("state")?,
        city: column("city")?,
        zipcode: column("zipcode")?,
        mobile_number: column("mobile_number")?,
    };
    world.registration()?.address = address.clone();
    SignupPage::new(world.ctx()?)
        .fill_address_information(&address)
        .await
}

#[when(expr = "I hover over product {int} and add it to the cart")]
async fn add_product(world: &mut StoreWorld, position: usize) -> ProbeResult<()> {
    let index = position
        .checked_sub(1)
        .ok_or_else(|| ProbeError::assertion("products are numbered from 1"))?;
    ProductsPage::new(world.ctx()?)
        .hover_and_add_to_cart(index)
        .await
}

#[then(expr = "I should see {int} products in the cart")]
async fn cart_rows(world: &mut StoreWorld, expected: usize) -> ProbeResult<()> {
    let cart = CartPage::new(world.ctx()?);
    cart.wait_until_ready().await?;
    let rows = cart.item_count().await?;
    ensure(rows == expected, format!("expected {expected} cart rows, found {rows}"))
}

#[then("every cart row shows its price, quantity and total")]
async fn cart_row_details(world: &mut StoreWorld) -> ProbeResult<()> {
    let cart = CartPage::new(world.ctx()?);
    let rows = cart.item_count().await?;
    let prices = cart.price_texts().await?;
    let quantities = cart.quantities().await?;
    let totals = cart.total_texts().await?;
    ensure(
        prices.len() == rows && quantities.len() == rows && totals.len() == rows,
        format!(
            "{rows} rows but {} prices, {} quantities and {} totals",
            prices.len(),
            quantities.len(),
            totals.len()
        ),
    )
}

#[then(expr = "I should see error message {string}")]
async fn error_message(world: &mut StoreWorld, message: String) -> ProbeResult<()> {
    let shown = LoginPage::new(world.ctx()?).login_error_message().await?;
    ensure(
        shown.as_deref().is_some_and(|m| m.contains(&message)),
        format!("expected {message:?}, saw {shown:?}"),
    )
}

#[then("I should see the logged in banner")]
async fn logged_in(world: &mut StoreWorld) -> ProbeResult<()> {
    let home = HomePage::new(world.ctx()?);
    home.wait_until_ready().await?;
    ensure(home.is_user_logged_in().await?, "not signed in")
}

#[then("I should be navigated to login page")]
async fn on_login_page(world: &mut StoreWorld) -> ProbeResult<()> {
    let login = LoginPage::new(world.ctx()?);
    ensure(login.is_current().await?, "not on the login page")?;
    ensure(login.is_login_form_visible().await?, "login form hidden")
}

#[then("I should see searched products")]
async fn searched_products(world: &mut StoreWorld) -> ProbeResult<()> {
    let ctx = world.ctx()?;
    ctx.base()
        .wait_for_visible(&ProductsPage::searched_products_title(), EXPECT_TIMEOUT)
        .await?;
    let found = ProductsPage::new(ctx).result_count().await?;
    ensure(found > 0, "no search results")
}

#[tokio::main]
async fn main() {
    let _ = storefront_probe::logging::init(tracing::Level::INFO, storefront_probe::logging::LogFormat::Pretty);
    StoreWorld::cucumber()
        .max_concurrent_scenarios(1)
        .after(|_, _, _, _, world| {
            Box::pin(async move {
                if let Some(world) = world {
                    world.close().await;
                }
            })
        })
        .run_and_exit("tests/features")
        .await;
}
