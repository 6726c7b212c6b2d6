//! Demo-store journeys.
//!
//! Each journey opens its own pages and asserts what a shopper would see.
//! Journeys that need an account use the configured valid user and sign in
//! through [`JourneyContext::sign_in`].

use super::{Journey, JourneyContext};
use crate::locator::Selector;
use crate::page_object::PageObject as _;
use crate::data::RegistrationProfile;
use crate::pages::{
    CartPage, CheckoutPage, ContactUsPage, HomePage, LoginPage, PaymentPage, ProductDetailPage,
    ProductsPage, SignupPage, TestCasesPage,
};
use crate::reporter::Severity;
use crate::result::{ensure, ProbeResult};
use futures::future::BoxFuture;

const SMOKE: &[&str] = &["@smoke"];
const REGRESSION: &[&str] = &["@regression"];

const ORDER_COMMENT: &str = "Please deliver between 9am and 5pm.";

/// Every demo-store journey, in id order
#[must_use]
pub fn catalogue() -> Vec<Journey> {
    vec![
        Journey {
            id: "TC01",
            title: "Register User",
            tags: SMOKE,
            severity: Severity::Critical,
            feature: "User Management",
            story: "User Registration",
            body: register_user,
        },
        Journey {
            id: "TC02",
            title: "Login User with Correct Email and Password",
            tags: SMOKE,
            severity: Severity::Critical,
            feature: "User Authentication",
            story: "User Login",
            body: login_valid_user,
        },
        Journey {
            id: "TC03",
            title: "Login User with Incorrect Email and Password",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "User Authentication",
            story: "User Login",
            body: login_invalid_user,
        },
        Journey {
            id: "TC04",
            title: "Logout User",
            tags: SMOKE,
            severity: Severity::Critical,
            feature: "User Authentication",
            story: "User Logout",
            body: logout_user,
        },
        Journey {
            id: "TC05",
            title: "Register User with Existing Email",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "User Management",
            story: "User Registration",
            body: register_existing_email,
        },
        Journey {
            id: "TC06",
            title: "Contact Us Form",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Contact Us",
            story: "Contact Form",
            body: contact_us_form,
        },
        Journey {
            id: "TC07",
            title: "Verify Test Cases Page",
            tags: SMOKE,
            severity: Severity::Normal,
            feature: "Navigation & UI",
            story: "Page Navigation",
            body: test_cases_page,
        },
        Journey {
            id: "TC08",
            title: "Verify All Products and Product Detail Page",
            tags: SMOKE,
            severity: Severity::Critical,
            feature: "Product Catalog",
            story: "Product Browsing",
            body: products_and_detail,
        },
        Journey {
            id: "TC09",
            title: "Search Product",
            tags: REGRESSION,
            severity: Severity::Critical,
            feature: "Product Catalog",
            story: "Product Search",
            body: search_product,
        },
        Journey {
            id: "TC10",
            title: "Verify Subscription in Home Page",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Newsletter & Subscription",
            story: "Newsletter Subscription",
            body: subscription_home,
        },
        Journey {
            id: "TC11",
            title: "Verify Subscription in Cart Page",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Newsletter & Subscription",
            story: "Newsletter Subscription",
            body: subscription_cart,
        },
        Journey {
            id: "TC12",
            title: "Add Products in Cart",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Shopping Cart",
            story: "Cart Management",
            body: add_products_to_cart,
        },
        Journey {
            id: "TC13",
            title: "Verify Product Quantity in Cart",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Shopping Cart",
            story: "Cart Management",
            body: product_quantity,
        },
        Journey {
            id: "TC14",
            title: "Place Order: Register While Checkout",
            tags: REGRESSION,
            severity: Severity::Critical,
            feature: "Checkout Process",
            story: "Order Placement",
            body: register_while_checkout,
        },
        Journey {
            id: "TC15",
            title: "Place Order: Register Before Checkout",
            tags: REGRESSION,
            severity: Severity::Critical,
            feature: "Checkout Process",
            story: "Order Placement",
            body: register_before_checkout,
        },
        Journey {
            id: "TC16",
            title: "Place Order: Login Before Checkout",
            tags: REGRESSION,
            severity: Severity::Critical,
            feature: "Checkout Process",
            story: "Order Placement",
            body: checkout_after_login,
        },
        Journey {
            id: "TC17",
            title: "Remove Products From Cart",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Shopping Cart",
            story: "Cart Management",
            body: remove_from_cart,
        },
        Journey {
            id: "TC18",
            title: "View Category Products",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Product Catalog",
            story: "Product Browsing",
            body: category_products,
        },
        Journey {
            id: "TC19",
            title: "View & Cart Brand Products",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Product Catalog",
            story: "Product Browsing",
            body: brand_products,
        },
        Journey {
            id: "TC20",
            title: "Search Products and Verify Cart After Login",
            tags: REGRESSION,
            severity: Severity::Critical,
            feature: "Shopping Cart",
            story: "Cart Management",
            body: cart_survives_login,
        },
        Journey {
            id: "TC21",
            title: "Add Review on Product",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Product Catalog",
            story: "Product Reviews",
            body: review_product,
        },
        Journey {
            id: "TC22",
            title: "Add to Cart from Recommended Items",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Shopping Cart",
            story: "Cart Management",
            body: recommended_items,
        },
        Journey {
            id: "TC23",
            title: "Verify Address Details in Checkout Page",
            tags: REGRESSION,
            severity: Severity::Critical,
            feature: "Checkout Process",
            story: "Order Placement",
            body: checkout_addresses,
        },
        Journey {
            id: "TC24",
            title: "Download Invoice After Purchase Order",
            tags: REGRESSION,
            severity: Severity::Critical,
            feature: "Checkout Process",
            story: "Order Placement",
            body: download_invoice,
        },
        Journey {
            id: "TC25",
            title: "Verify Scroll Up Using Arrow Button",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Navigation & UI",
            story: "Page Navigation",
            body: scroll_up_with_arrow,
        },
        Journey {
            id: "TC26",
            title: "Verify Scroll Up Without Arrow Button",
            tags: REGRESSION,
            severity: Severity::Normal,
            feature: "Navigation & UI",
            story: "Page Navigation",
            body: scroll_up_without_arrow,
        },
    ]
}

fn register_user(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let login = LoginPage::new(ctx);
        let signup = SignupPage::new(ctx);
        let profile = j.data().registration();

        j.step("open home page", home.open()).await?;
        j.step("start signup", async {
            home.click_signup_login().await?;
            login.wait_until_ready().await?;
            j.expect_visible(&LoginPage::new_user_signup_title()).await?;
            login.signup(&profile.name, &profile.email).await
        })
        .await?;
        j.step("fill account information", async {
            signup.wait_until_ready().await?;
            signup.fill_account_information(&profile).await?;
            signup.fill_address_information(&profile.address).await
        })
        .await?;
        j.step("create account", async {
            signup.click_create_account().await?;
            j.expect_visible(&SignupPage::account_created_title()).await?;
            signup.click_continue().await
        })
        .await?;
        j.step("verify logged in", async {
            j.expect_text(&HomePage::logged_in_as(), &profile.name).await
        })
        .await?;
        j.step("delete account", async {
            home.click_delete_account().await?;
            j.expect_visible(&SignupPage::account_deleted_title()).await?;
            signup.click_continue().await
        })
        .await
    })
}

/// Signs in and out again; the shared account is left in place
fn login_valid_user(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let login = LoginPage::new(ctx);
        let user = &j.data().valid_user;

        j.step("open home page", home.open()).await?;
        j.step("go to login", async {
            home.click_signup_login().await?;
            login.wait_until_ready().await?;
            j.expect_visible(&LoginPage::login_title()).await
        })
        .await?;
        j.step("log in", async {
            login.login(&user.email, &user.password).await?;
            home.wait_until_ready().await?;
            j.expect_visible(&HomePage::logged_in_as()).await
        })
        .await?;
        j.step("log out", async {
            home.click_logout().await?;
            login.wait_until_ready().await?;
            j.expect_visible(&LoginPage::login_title()).await
        })
        .await
    })
}

fn login_invalid_user(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let login = LoginPage::new(j.ctx());
        let user = &j.data().invalid_user;

        j.step("open login page", login.open()).await?;
        j.step("log in with wrong password", login.login(&user.email, &user.password))
            .await?;
        j.step("verify error", async {
            j.expect_text(&LoginPage::login_error(), "Your email or password is incorrect!")
                .await
        })
        .await
    })
}

fn logout_user(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let login = LoginPage::new(ctx);

        j.step("sign in", j.sign_in()).await?;
        j.step("verify logged in", j.expect_visible(&HomePage::logged_in_as()))
            .await?;
        j.step("log out", async {
            home.click_logout().await?;
            login.wait_until_ready().await?;
            j.expect_url_contains("/login").await?;
            j.expect_visible(&LoginPage::login_title()).await?;
            j.expect_visible(&LoginPage::new_user_signup_title()).await
        })
        .await
    })
}

fn register_existing_email(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let login = LoginPage::new(j.ctx());
        let existing = &j.data().existing_user;

        j.step("open login page", login.open()).await?;
        j.step("sign up with taken e-mail", login.signup("Existing User", &existing.email))
            .await?;
        j.step("verify error", async {
            j.expect_text(&LoginPage::signup_error(), "Email Address already exist!")
                .await
        })
        .await
    })
}

fn contact_us_form(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let contact = ContactUsPage::new(ctx);
        let home = HomePage::new(ctx);

        j.step("open contact page", contact.open()).await?;
        j.step("fill form", contact.fill_form(&j.data().contact)).await?;
        j.step("submit", async {
            contact.submit().await?;
            let banner = contact.wait_for_success().await?;
            ensure(
                banner.contains("Success! Your details have been submitted successfully."),
                format!("unexpected confirmation {banner:?}"),
            )
        })
        .await?;
        j.step("back to home", async {
            contact.click_home().await?;
            home.wait_until_ready().await?;
            j.expect_visible(&HomePage::carousel()).await
        })
        .await
    })
}

fn test_cases_page(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let cases = TestCasesPage::new(ctx);

        j.step("open home page", home.open()).await?;
        j.step("open test cases", async {
            home.click_test_cases().await?;
            cases.wait_until_ready().await?;
            j.expect_url_contains("test_cases").await?;
            j.expect_visible(&TestCasesPage::title()).await
        })
        .await
    })
}

fn products_and_detail(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let products = ProductsPage::new(ctx);
        let detail = ProductDetailPage::new(ctx);

        j.step("open products", products.open()).await?;
        j.step("verify listing", j.expect_visible(&ProductsPage::products_list()))
            .await?;
        j.step("view first product", async {
            products.click_view_product(0).await?;
            detail.wait_until_ready().await?;
            j.expect_url_contains("/product_details/").await
        })
        .await?;
        j.step("verify details", async {
            let shown = detail.detail_visibility().await?;
            ensure(shown.all(), format!("missing product details: {shown:?}"))
        })
        .await
    })
}

fn search_product(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let products = ProductsPage::new(j.ctx());
        let term = j.data().search_terms.first().copied().unwrap_or("shirt");

        j.step("open products", products.open()).await?;
        j.step("search", products.search(term)).await?;
        j.step("verify results", async {
            j.expect_visible(&ProductsPage::searched_products_title()).await?;
            let found = products.result_count().await?;
            ensure(found > 0, format!("no results for {term:?}"))
        })
        .await
    })
}

fn subscription_home(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let home = HomePage::new(j.ctx());
        let email = j.data().valid_user.email.clone();

        j.step("open home page", home.open()).await?;
        j.step("scroll to footer", async {
            home.scroll_to_bottom().await?;
            j.expect_visible(&HomePage::subscription_title()).await
        })
        .await?;
        j.step("subscribe", async {
            home.subscribe_to_newsletter(&email).await?;
            j.expect_text(
                &HomePage::subscription_success(),
                "You have been successfully subscribed!",
            )
            .await
        })
        .await
    })
}

fn subscription_cart(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let cart = CartPage::new(ctx);
        let email = j.data().valid_user.email.clone();

        j.step("open home page", home.open()).await?;
        j.step("open cart", async {
            home.click_cart().await?;
            cart.wait_until_ready().await
        })
        .await?;
        j.step("subscribe", async {
            home.scroll_to_bottom().await?;
            j.expect_visible(&HomePage::subscription_title()).await?;
            cart.subscribe_to_newsletter(&email).await?;
            j.expect_text(
                &HomePage::subscription_success(),
                "You have been successfully subscribed!",
            )
            .await
        })
        .await
    })
}

fn add_products_to_cart(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let products = ProductsPage::new(ctx);
        let cart = CartPage::new(ctx);

        j.step("open products", products.open()).await?;
        j.step("add first product", async {
            products.hover_and_add_to_cart(0).await?;
            products.click_continue_shopping().await
        })
        .await?;
        j.step("add second product", async {
            products.hover_and_add_to_cart(1).await?;
            products.click_view_cart().await?;
            cart.wait_until_ready().await
        })
        .await?;
        j.step("verify cart", async {
            let rows = cart.item_count().await?;
            ensure(rows == 2, format!("expected 2 cart rows, found {rows}"))?;
            let quantities = cart.quantities().await?;
            ensure(
                quantities == [1, 1],
                format!("expected quantities [1, 1], found {quantities:?}"),
            )?;
            let prices = cart.price_texts().await?;
            let totals = cart.total_texts().await?;
            ensure(
                prices.len() == 2 && totals.len() == 2,
                "every row shows a price and a total",
            )
        })
        .await
    })
}

fn product_quantity(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let products = ProductsPage::new(ctx);
        let detail = ProductDetailPage::new(ctx);
        let cart = CartPage::new(ctx);

        j.step("open home page", home.open()).await?;
        j.step("view product", async {
            home.click_products().await?;
            products.wait_until_ready().await?;
            products.click_view_product(0).await?;
            detail.wait_until_ready().await
        })
        .await?;
        j.step("add four to cart", async {
            detail.set_quantity(4).await?;
            detail.add_to_cart().await?;
            products.click_view_cart().await?;
            cart.wait_until_ready().await
        })
        .await?;
        j.step("verify quantity", async {
            let quantities = cart.quantities().await?;
            ensure(
                quantities == [4],
                format!("expected one row of 4, found {quantities:?}"),
            )
        })
        .await
    })
}

fn checkout_after_login(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let products = ProductsPage::new(ctx);
        let cart = CartPage::new(ctx);
        let checkout = CheckoutPage::new(ctx);

        j.step("sign in", j.sign_in()).await?;
        j.step("add product", async {
            products.open().await?;
            products.hover_and_add_to_cart(0).await?;
            products.click_view_cart().await?;
            cart.wait_until_ready().await
        })
        .await?;
        j.step("proceed to checkout", async {
            cart.click_proceed_to_checkout().await?;
            checkout.wait_until_ready().await?;
            j.expect_visible(&CheckoutPage::address_details_title()).await?;
            j.expect_visible(&CheckoutPage::review_order_title()).await
        })
        .await
    })
}

fn register_while_checkout(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let cart = CartPage::new(ctx);
        let profile = j.data().registration();

        j.step("open home page", home.open()).await?;
        fill_cart(j).await?;
        j.step("checkout as guest", async {
            cart.click_proceed_to_checkout().await?;
            j.expect_visible(&CartPage::register_login()).await?;
            cart.click_register_login().await
        })
        .await?;
        create_account(j, &profile).await?;
        review_order(j).await?;
        pay_for_order(j).await?;
        delete_account(j).await
    })
}

fn register_before_checkout(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let home = HomePage::new(j.ctx());
        let profile = j.data().registration();

        j.step("open home page", home.open()).await?;
        j.step("go to signup", home.click_signup_login()).await?;
        create_account(j, &profile).await?;
        fill_cart(j).await?;
        review_order(j).await?;
        pay_for_order(j).await?;
        delete_account(j).await
    })
}

/// Products added while signed out stay in the cart after logging in
fn cart_survives_login(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let products = ProductsPage::new(ctx);
        let cart = CartPage::new(ctx);
        let login = LoginPage::new(ctx);
        let user = &j.data().valid_user;
        let term = j.data().search_terms.first().copied().unwrap_or("shirt");

        j.step("open products", products.open()).await?;
        j.step("search", async {
            products.search(term).await?;
            j.expect_visible(&ProductsPage::searched_products_title()).await
        })
        .await?;
        j.step("add results to cart", async {
            let added = products.add_results_to_cart(Some(3)).await?;
            ensure(added > 0, format!("no results for {term:?}"))
        })
        .await?;
        let before = j
            .step("verify cart", async {
                home.click_cart().await?;
                cart.wait_until_ready().await?;
                let rows = cart.item_count().await?;
                ensure(rows > 0, "cart is empty").map(|()| rows)
            })
            .await?;
        j.step("log in", async {
            home.click_signup_login().await?;
            login.wait_until_ready().await?;
            login.login(&user.email, &user.password).await?;
            j.expect_visible(&HomePage::logged_in_as()).await
        })
        .await?;
        j.step("verify cart after login", async {
            home.click_cart().await?;
            cart.wait_until_ready().await?;
            let after = cart.item_count().await?;
            ensure(
                after >= before,
                format!("cart shrank from {before} to {after} rows after login"),
            )
        })
        .await
    })
}

fn checkout_addresses(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let checkout = CheckoutPage::new(ctx);
        let profile = j.data().registration();

        j.step("open home page", home.open()).await?;
        j.step("go to signup", home.click_signup_login()).await?;
        create_account(j, &profile).await?;
        fill_cart(j).await?;
        review_order(j).await?;
        j.step("verify addresses", async {
            ensure(
                checkout.shows_delivery_address(&profile.address).await?,
                format!(
                    "delivery address {:?} does not match registration",
                    checkout.delivery_address_text().await?
                ),
            )?;
            ensure(
                checkout.shows_invoice_address(&profile.address).await?,
                format!(
                    "billing address {:?} does not match registration",
                    checkout.invoice_address_text().await?
                ),
            )
        })
        .await?;
        delete_account(j).await
    })
}

fn download_invoice(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let cart = CartPage::new(ctx);
        let payment = PaymentPage::new(ctx);
        let profile = j.data().registration();

        j.step("open home page", home.open()).await?;
        fill_cart(j).await?;
        j.step("checkout as guest", async {
            cart.click_proceed_to_checkout().await?;
            j.expect_visible(&CartPage::register_login()).await?;
            cart.click_register_login().await
        })
        .await?;
        create_account(j, &profile).await?;
        review_order(j).await?;
        pay_for_order(j).await?;
        j.step("download invoice", async {
            j.expect_visible(&PaymentPage::download_invoice()).await?;
            payment.click_download_invoice().await?;
            payment.click_continue().await?;
            home.wait_until_ready().await.map(|_| ())
        })
        .await?;
        delete_account(j).await
    })
}

/// Add the first listed product and open the cart
async fn fill_cart(j: &JourneyContext) -> ProbeResult<()> {
    let ctx = j.ctx();
    let home = HomePage::new(ctx);
    let products = ProductsPage::new(ctx);
    let cart = CartPage::new(ctx);

    j.step("add product", async {
        home.click_products().await?;
        products.wait_until_ready().await?;
        products.hover_and_add_to_cart(0).await?;
        products.click_continue_shopping().await
    })
    .await?;
    j.step("open cart", async {
        home.click_cart().await?;
        cart.wait_until_ready().await?;
        j.expect_visible(&CartPage::cart_table()).await
    })
    .await
}

/// Signup form through to the signed-in home page
async fn create_account(j: &JourneyContext, profile: &RegistrationProfile) -> ProbeResult<()> {
    let ctx = j.ctx();
    let login = LoginPage::new(ctx);
    let signup = SignupPage::new(ctx);

    j.step("fill signup", async {
        login.wait_until_ready().await?;
        login.signup(&profile.name, &profile.email).await?;
        signup.wait_until_ready().await?;
        signup.fill_account_information(profile).await?;
        signup.fill_address_information(&profile.address).await
    })
    .await?;
    j.step("create account", async {
        signup.click_create_account().await?;
        j.expect_visible(&SignupPage::account_created_title()).await?;
        signup.click_continue().await?;
        j.expect_text(&HomePage::logged_in_as(), &profile.name).await
    })
    .await
}

/// From anywhere to the signed-in checkout review
async fn review_order(j: &JourneyContext) -> ProbeResult<()> {
    let ctx = j.ctx();
    let home = HomePage::new(ctx);
    let cart = CartPage::new(ctx);
    let checkout = CheckoutPage::new(ctx);

    j.step("proceed to checkout", async {
        home.click_cart().await?;
        cart.wait_until_ready().await?;
        cart.click_proceed_to_checkout().await?;
        checkout.wait_until_ready().await?;
        j.expect_visible(&CheckoutPage::address_details_title()).await
    })
    .await
}

async fn pay_for_order(j: &JourneyContext) -> ProbeResult<()> {
    let ctx = j.ctx();
    let checkout = CheckoutPage::new(ctx);
    let payment = PaymentPage::new(ctx);

    j.step("place order", async {
        checkout.add_comment(ORDER_COMMENT).await?;
        checkout.click_place_order().await?;
        payment.wait_until_ready().await?;
        payment.fill_card(&j.data().payment).await?;
        payment.pay_and_confirm().await?;
        j.expect_visible(&PaymentPage::order_placed_title()).await
    })
    .await
}

async fn delete_account(j: &JourneyContext) -> ProbeResult<()> {
    let ctx = j.ctx();
    let home = HomePage::new(ctx);
    let signup = SignupPage::new(ctx);

    j.step("delete account", async {
        home.click_delete_account().await?;
        j.expect_visible(&SignupPage::account_deleted_title()).await?;
        signup.click_continue().await
    })
    .await
}

fn remove_from_cart(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let products = ProductsPage::new(ctx);
        let cart = CartPage::new(ctx);

        j.step("open products", products.open()).await?;
        j.step("add two products", async {
            let added = products.add_results_to_cart(Some(2)).await?;
            ensure(added == 2, format!("only {added} products listed"))?;
            home.click_cart().await?;
            cart.wait_until_ready().await
        })
        .await?;
        j.step("remove first row", async {
            let before = cart.item_count().await?;
            cart.remove_product(0).await?;
            let after = cart.item_count().await?;
            ensure(
                after + 1 == before,
                format!("expected {} rows after removal, found {after}", before.saturating_sub(1)),
            )
        })
        .await
    })
}

fn category_products(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let home = HomePage::new(j.ctx());
        let categories = &j.data().categories;
        let women = categories.women.first().copied().unwrap_or("Dress");
        let men = categories.men.first().copied().unwrap_or("Tshirts");

        j.step("open home page", home.open()).await?;
        j.step("verify sidebar", j.expect_visible(&HomePage::categories_sidebar()))
            .await?;
        j.step("women category", async {
            home.click_women_subcategory(women).await?;
            j.expect_visible(&category_title(&format!("Women - {women} Products")))
                .await
        })
        .await?;
        j.step("men category", async {
            home.click_men_subcategory(men).await?;
            j.expect_visible(&category_title(&format!("Men - {men} Products")))
                .await
        })
        .await
    })
}

fn brand_products(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let products = ProductsPage::new(ctx);
        let brands = &j.data().brands;
        let first = brands.first().copied().unwrap_or("Polo");
        let second = brands.get(1).copied().unwrap_or("H&M");

        j.step("open products", products.open()).await?;
        j.step("verify brands", j.expect_visible(&ProductsPage::brands_section()))
            .await?;
        for brand in [first, second] {
            j.step(&format!("brand {brand}"), async {
                home.click_brand(brand).await?;
                j.expect_visible(&category_title(&format!("Brand - {brand} Products")))
                    .await?;
                let found = products.result_count().await?;
                ensure(found > 0, format!("no products listed for {brand}"))
            })
            .await?;
        }
        Ok(())
    })
}

fn review_product(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let products = ProductsPage::new(ctx);
        let detail = ProductDetailPage::new(ctx);

        j.step("open products", products.open()).await?;
        j.step("view product", async {
            products.click_view_product(0).await?;
            detail.wait_until_ready().await
        })
        .await?;
        j.step("write review", async {
            detail.open_review_form().await?;
            detail.write_review(&j.data().review).await
        })
        .await?;
        j.step("verify review", async {
            j.expect_text(&ProductDetailPage::review_success(), "Thank you for your review.")
                .await
        })
        .await
    })
}

fn recommended_items(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(async move {
        let ctx = j.ctx();
        let home = HomePage::new(ctx);
        let products = ProductsPage::new(ctx);
        let cart = CartPage::new(ctx);

        j.step("open home page", home.open()).await?;
        j.step("add recommended item", async {
            home.scroll_to_bottom().await?;
            j.expect_visible(&HomePage::recommended_items_title()).await?;
            home.add_recommended_item_to_cart(0).await?;
            j.expect_visible(&ProductsPage::view_cart()).await?;
            products.click_view_cart().await?;
            cart.wait_until_ready().await
        })
        .await?;
        j.step("verify cart", async {
            let rows = cart.item_count().await?;
            ensure(rows > 0, "cart is empty")
        })
        .await
    })
}

fn scroll_up_with_arrow(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(scroll_up(j, true))
}

fn scroll_up_without_arrow(j: &JourneyContext) -> BoxFuture<'_, ProbeResult<()>> {
    Box::pin(scroll_up(j, false))
}

async fn scroll_up(j: &JourneyContext, use_arrow: bool) -> ProbeResult<()> {
    let home = HomePage::new(j.ctx());

    j.step("open home page", home.open()).await?;
    j.step("scroll to footer", async {
        home.scroll_to_bottom().await?;
        j.expect_visible(&HomePage::subscription_title()).await
    })
    .await?;
    j.step("scroll back up", async {
        if use_arrow {
            home.click_scroll_up().await?;
        } else {
            home.scroll_to_top().await?;
        }
        j.expect_visible(&HomePage::full_fledged_text()).await
    })
    .await
}

fn category_title(text: &str) -> Selector {
    Selector::css_with_text("h2.title", text)
}
