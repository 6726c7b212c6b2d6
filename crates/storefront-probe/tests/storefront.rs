//! Every catalogue journey against one scripted storefront
//!
//! The store below wires the pages a shopper walks through: listing, detail,
//! cart, signup, checkout and payment. Cart contents are replaced on each
//! add or remove, so row counts and quantities follow the journey.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::sync::Arc;
use storefront_probe::mock::scripted_login_flow;
use storefront_probe::prelude::*;
use tempfile::TempDir;

const BASE: &str = "https://shop.test";
const PRODUCTS_LISTED: usize = 3;

/// What the signup form does with the submitted e-mail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signup {
    Accepted,
    EmailTaken,
}

fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

fn go(path: &str) -> MockAction {
    MockAction::Navigate(url(path))
}

fn reveal(selector: Selector) -> MockAction {
    MockAction::Reveal(selector, MockElement::visible())
}

/// Replace the cart with one row per quantity
fn cart_holding(quantities: &[&str]) -> Vec<MockAction> {
    let rows = quantities.len();
    vec![
        MockAction::Reveal(CartPage::rows(), MockElement::repeated(rows)),
        MockAction::Reveal(
            CartPage::product_names(),
            MockElement::texts((0..rows).map(|i| format!("Product {}", i + 1))),
        ),
        MockAction::Reveal(
            CartPage::product_prices(),
            MockElement::texts(vec!["Rs. 500"; rows]),
        ),
        MockAction::Reveal(
            CartPage::product_quantities(),
            MockElement::texts(quantities.iter().copied()),
        ),
        MockAction::Reveal(
            CartPage::product_totals(),
            MockElement::texts(vec!["Rs. 500"; rows]),
        ),
        reveal(ProductsPage::continue_shopping()),
        reveal(ProductsPage::view_cart()),
    ]
}

fn address_text(address: &Address) -> String {
    [
        "Mr.",
        address.first_name.as_str(),
        address.last_name.as_str(),
        address.company.as_str(),
        address.address1.as_str(),
        address.address2.as_deref().unwrap_or_default(),
        address.city.as_str(),
        address.state.as_str(),
        address.zipcode.as_str(),
        address.country.as_str(),
        address.mobile_number.as_str(),
    ]
    .join(" ")
}

fn registered_address() -> Address {
    TestData::new(UserCredentials::new("me@example.com", "secret"))
        .registration()
        .address
}

fn shop() -> MockDriver {
    storefront(Signup::Accepted)
}

fn storefront(signup: Signup) -> MockDriver {
    let driver = scripted_login_flow(BASE, "Test User");

    // header, sidebar and footer
    for (link, path) in [
        (HomePage::signup_login_link(), "/login"),
        (HomePage::products_link(), "/products"),
        (HomePage::cart_link(), "/view_cart"),
        (HomePage::test_cases_link(), "/test_cases"),
        (HomePage::contact_us_link(), "/contact_us"),
    ] {
        driver.add_element(&link, MockElement::visible());
        driver.on_click(&link, vec![go(path)]);
    }
    for selector in [
        HomePage::subscription_section(),
        HomePage::subscription_title(),
        HomePage::subscription_email(),
        HomePage::subscription_submit(),
        HomePage::categories_sidebar(),
        HomePage::women_category(),
        HomePage::men_category(),
        ProductsPage::brands_section(),
        SignupPage::continue_button(),
    ] {
        driver.add_element(&selector, MockElement::visible());
    }
    driver.on_click(
        &HomePage::subscription_submit(),
        vec![MockAction::Reveal(
            HomePage::subscription_success(),
            MockElement::text("You have been successfully subscribed!"),
        )],
    );
    driver.on_click(&SignupPage::continue_button(), vec![go("/")]);
    driver.on_click(
        &HomePage::delete_account_link(),
        vec![
            go("/delete_account"),
            MockAction::Remove(HomePage::logged_in_as()),
            MockAction::Remove(HomePage::logout_link()),
            MockAction::Remove(HomePage::delete_account_link()),
        ],
    );
    driver.add_page_element(
        "/delete_account",
        &SignupPage::account_deleted_title(),
        MockElement::visible(),
    );

    // home
    for selector in [
        HomePage::full_fledged_text(),
        HomePage::scroll_up_button(),
        HomePage::recommended_items_title(),
        HomePage::recommended_add_to_cart(0),
    ] {
        driver.add_page_element("/", &selector, MockElement::visible());
    }
    driver.on_click(&HomePage::recommended_add_to_cart(0), cart_holding(&["1"]));

    // categories and brands
    for (section, sub, id) in [("Women", "Dress", 1), ("Men", "Tshirts", 3)] {
        let link = Selector::css_with_text(
            format!(r#"#{section} a[href*="/category_products/"]"#),
            sub,
        );
        let path = format!("/category_products/{id}");
        driver.add_element(&link, MockElement::visible());
        driver.on_click(&link, vec![go(&path)]);
        driver.add_page_element(
            &path,
            &Selector::css_with_text("h2.title", format!("{section} - {sub} Products")),
            MockElement::visible(),
        );
    }
    for brand in ["Polo", "H&M"] {
        let link = Selector::css_with_text(".brands_products a", brand);
        let path = format!("/brand_products/{brand}");
        driver.add_element(&link, MockElement::visible());
        driver.on_click(&link, vec![go(&path)]);
        driver.add_page_element(
            &path,
            &Selector::css_with_text("h2.title", format!("Brand - {brand} Products")),
            MockElement::visible(),
        );
    }

    // listing and search
    driver.add_element(
        &ProductsPage::product_cards(),
        MockElement::repeated(PRODUCTS_LISTED),
    );
    driver.add_element(
        &Selector::css(".features_items .overlay-content .add-to-cart"),
        MockElement::repeated(PRODUCTS_LISTED),
    );
    for selector in [
        ProductsPage::all_products_title(),
        ProductsPage::products_list(),
        ProductsPage::search_input(),
        ProductsPage::search_button(),
        ProductsPage::view_product_link(0),
    ] {
        driver.add_page_element("/products", &selector, MockElement::visible());
    }
    driver.on_click(
        &ProductsPage::search_button(),
        vec![reveal(ProductsPage::searched_products_title())],
    );
    driver.on_click(&ProductsPage::view_product_link(0), vec![go("/product_details/1")]);
    let in_cart = ["1"; PRODUCTS_LISTED];
    for index in 0..PRODUCTS_LISTED {
        driver.on_click(
            &ProductsPage::overlay_add_to_cart(index),
            cart_holding(&in_cart[..=index]),
        );
    }
    driver.on_click(&ProductsPage::view_cart(), vec![go("/view_cart")]);

    // product detail
    let detail = "/product_details/1";
    driver.add_page_element(detail, &ProductDetailPage::product_name(), MockElement::text("Blue Top"));
    driver.add_page_element(detail, &ProductDetailPage::product_price(), MockElement::text("Rs. 500"));
    for label in ["Category", "Availability", "Condition", "Brand"] {
        driver.add_page_element(detail, &ProductDetailPage::info_line(label), MockElement::visible());
    }
    for selector in [
        ProductDetailPage::quantity_input(),
        ProductDetailPage::add_to_cart_button(),
        ProductDetailPage::review_section(),
        ProductDetailPage::write_review_link(),
        ProductDetailPage::review_name(),
        ProductDetailPage::review_email(),
        ProductDetailPage::review_text(),
        ProductDetailPage::review_submit(),
    ] {
        driver.add_page_element(detail, &selector, MockElement::visible());
    }
    driver.on_click(&ProductDetailPage::add_to_cart_button(), cart_holding(&["4"]));
    driver.on_click(
        &ProductDetailPage::review_submit(),
        vec![MockAction::Reveal(
            ProductDetailPage::review_success(),
            MockElement::text("Thank you for your review."),
        )],
    );

    // cart
    driver.add_page_element("/view_cart", &CartPage::cart_table(), MockElement::visible());
    driver.add_page_element("/view_cart", &CartPage::proceed_to_checkout(), MockElement::visible());
    driver.add_element(
        &Selector::css(".cart_quantity_delete"),
        MockElement::repeated(PRODUCTS_LISTED),
    );
    driver.on_click(&CartPage::remove_button(0), cart_holding(&["1"]));
    driver.on_click(
        &CartPage::proceed_to_checkout(),
        vec![go("/checkout"), reveal(CartPage::register_login())],
    );
    driver.on_click(&CartPage::register_login(), vec![go("/login")]);

    // signup
    let signed_in = vec![
        MockAction::Reveal(
            HomePage::logged_in_as(),
            MockElement::text("Logged in as Test User"),
        ),
        reveal(HomePage::logout_link()),
        reveal(HomePage::delete_account_link()),
    ];
    match signup {
        Signup::Accepted => driver.on_click(&LoginPage::signup_button(), vec![go("/signup")]),
        Signup::EmailTaken => driver.on_click(
            &LoginPage::signup_button(),
            vec![MockAction::Reveal(
                LoginPage::signup_error(),
                MockElement::text("Email Address already exist!"),
            )],
        ),
    }
    let mut form = vec![
        SignupPage::account_info_title(),
        SignupPage::title_radio(Title::Mr),
        SignupPage::create_account_button(),
    ];
    form.extend(
        [
            "password",
            "days",
            "months",
            "years",
            "newsletter",
            "optin",
            "first_name",
            "last_name",
            "company",
            "address1",
            "address2",
            "country",
            "state",
            "city",
            "zipcode",
            "mobile_number",
        ]
        .map(SignupPage::field),
    );
    for selector in form {
        driver.add_page_element("/signup", &selector, MockElement::visible());
    }
    let mut create = vec![go("/account_created")];
    create.extend(signed_in);
    driver.on_click(&SignupPage::create_account_button(), create);
    driver.add_page_element(
        "/account_created",
        &SignupPage::account_created_title(),
        MockElement::visible(),
    );

    // checkout and payment
    let address = address_text(&registered_address());
    for selector in [
        CheckoutPage::review_order_title(),
        CheckoutPage::address_details_title(),
        CheckoutPage::comment(),
        CheckoutPage::place_order(),
    ] {
        driver.add_page_element("/checkout", &selector, MockElement::visible());
    }
    driver.add_page_element("/checkout", &CheckoutPage::delivery_address(), MockElement::text(&address));
    driver.add_page_element("/checkout", &CheckoutPage::invoice_address(), MockElement::text(&address));
    driver.on_click(&CheckoutPage::place_order(), vec![go("/payment")]);
    driver.add_page_element("/payment", &PaymentPage::pay_button(), MockElement::visible());
    for qa in ["name-on-card", "card-number", "cvc", "expiry-month", "expiry-year"] {
        driver.add_page_element("/payment", &PaymentPage::card_field(qa), MockElement::visible());
    }
    driver.on_click(&PaymentPage::pay_button(), vec![go("/payment_done/500")]);
    driver.add_page_element(
        "/payment_done/500",
        &PaymentPage::order_placed_title(),
        MockElement::visible(),
    );
    driver.add_page_element(
        "/payment_done/500",
        &PaymentPage::download_invoice(),
        MockElement::visible(),
    );

    // contact and test cases
    for selector in [
        ContactUsPage::get_in_touch_title(),
        ContactUsPage::input("name"),
        ContactUsPage::input("email"),
        ContactUsPage::input("subject"),
        ContactUsPage::message_input(),
        ContactUsPage::submit_button(),
        ContactUsPage::home_button(),
    ] {
        driver.add_page_element("/contact_us", &selector, MockElement::visible());
    }
    driver.on_click(
        &ContactUsPage::submit_button(),
        vec![MockAction::Reveal(
            ContactUsPage::success_message(),
            MockElement::text("Success! Your details have been submitted successfully."),
        )],
    );
    driver.on_click(&ContactUsPage::home_button(), vec![go("/")]);
    driver.add_page_element("/test_cases", &TestCasesPage::title(), MockElement::visible());

    driver
}

fn runner(factory: &Arc<MockSessionFactory>, root: &Path) -> SuiteRunner {
    let dirs = OutputDirs::new(root);
    SuiteRunner::new(
        Arc::clone(factory) as Arc<dyn SessionFactory>,
        SiteSettings::new(BASE).with_screenshot_dir(dirs.screenshots()),
        TestData::new(UserCredentials::new("me@example.com", "secret")),
    )
}

async fn run_one(
    build: impl Fn() -> MockDriver + Send + Sync + 'static,
    id: &str,
) -> (TestResultEntry, Arc<MockDriver>) {
    let dir = TempDir::new().unwrap();
    let factory = Arc::new(MockSessionFactory::new(build));
    let summary = runner(&factory, dir.path())
        .with_filter(JourneyFilter::all().with_id(id))
        .run(&catalogue())
        .await;
    let entry = summary.reporter().results()[0].clone();
    assert_eq!(entry.id, id);
    (entry, Arc::clone(&factory.opened()[0]))
}

fn step_names(entry: &TestResultEntry) -> Vec<&str> {
    entry.steps.iter().map(|s| s.name.as_str()).collect()
}

#[tokio::test(start_paused = true)]
async fn every_journey_walks_the_store() {
    let expected: &[(&str, &[&str])] = &[
        (
            "TC01",
            &[
                "open home page",
                "start signup",
                "fill account information",
                "create account",
                "verify logged in",
                "delete account",
            ],
        ),
        ("TC02", &["open home page", "go to login", "log in", "log out"]),
        ("TC04", &["sign in", "verify logged in", "log out"]),
        ("TC06", &["open contact page", "fill form", "submit", "back to home"]),
        ("TC07", &["open home page", "open test cases"]),
        (
            "TC08",
            &["open products", "verify listing", "view first product", "verify details"],
        ),
        ("TC09", &["open products", "search", "verify results"]),
        ("TC10", &["open home page", "scroll to footer", "subscribe"]),
        ("TC11", &["open home page", "open cart", "subscribe"]),
        (
            "TC12",
            &["open products", "add first product", "add second product", "verify cart"],
        ),
        (
            "TC13",
            &["open home page", "view product", "add four to cart", "verify quantity"],
        ),
        (
            "TC14",
            &[
                "open home page",
                "add product",
                "open cart",
                "checkout as guest",
                "fill signup",
                "create account",
                "proceed to checkout",
                "place order",
                "delete account",
            ],
        ),
        (
            "TC15",
            &[
                "open home page",
                "go to signup",
                "fill signup",
                "create account",
                "add product",
                "open cart",
                "proceed to checkout",
                "place order",
                "delete account",
            ],
        ),
        ("TC16", &["sign in", "add product", "proceed to checkout"]),
        ("TC17", &["open products", "add two products", "remove first row"]),
        (
            "TC18",
            &["open home page", "verify sidebar", "women category", "men category"],
        ),
        ("TC19", &["open products", "verify brands", "brand Polo", "brand H&M"]),
        (
            "TC20",
            &[
                "open products",
                "search",
                "add results to cart",
                "verify cart",
                "log in",
                "verify cart after login",
            ],
        ),
        (
            "TC21",
            &["open products", "view product", "write review", "verify review"],
        ),
        ("TC22", &["open home page", "add recommended item", "verify cart"]),
        (
            "TC23",
            &[
                "open home page",
                "go to signup",
                "fill signup",
                "create account",
                "add product",
                "open cart",
                "proceed to checkout",
                "verify addresses",
                "delete account",
            ],
        ),
        (
            "TC24",
            &[
                "open home page",
                "add product",
                "open cart",
                "checkout as guest",
                "fill signup",
                "create account",
                "proceed to checkout",
                "place order",
                "download invoice",
                "delete account",
            ],
        ),
        ("TC25", &["open home page", "scroll to footer", "scroll back up"]),
        ("TC26", &["open home page", "scroll to footer", "scroll back up"]),
    ];

    let dir = TempDir::new().unwrap();
    let factory = Arc::new(MockSessionFactory::new(shop));
    let filter = expected
        .iter()
        .fold(JourneyFilter::all(), |f, (id, _)| f.with_id(*id));
    let summary = runner(&factory, dir.path())
        .with_filter(filter)
        .run(&catalogue())
        .await;

    let results = summary.reporter().results();
    assert_eq!(results.len(), expected.len());
    for (entry, (id, steps)) in results.iter().zip(expected) {
        assert_eq!(entry.id, *id);
        assert_eq!(entry.status, TestStatus::Passed, "{id}: {:?}", entry.error);
        assert_eq!(step_names(entry), *steps, "{id}");
        assert!(
            entry.steps.iter().all(|s| s.status == TestStatus::Passed),
            "{id}"
        );
    }
    assert!(summary.all_passed());
    assert!(factory.opened().iter().all(|page| page.is_closed()));
}

#[tokio::test(start_paused = true)]
async fn taken_email_is_reported_on_signup() {
    let (entry, page) = run_one(|| storefront(Signup::EmailTaken), "TC05").await;
    assert_eq!(entry.status, TestStatus::Passed, "{:?}", entry.error);
    assert_eq!(
        step_names(&entry),
        ["open login page", "sign up with taken e-mail", "verify error"]
    );
    assert_eq!(
        page.filled_value(&LoginPage::signup_email()).as_deref(),
        Some("existing@example.com")
    );
    assert!(!page.current_url().await.unwrap().ends_with("/signup"));
}

#[tokio::test(start_paused = true)]
async fn quantity_typed_on_detail_page_reaches_cart() {
    let (entry, page) = run_one(shop, "TC13").await;
    assert_eq!(entry.status, TestStatus::Passed, "{:?}", entry.error);
    assert_eq!(
        page.filled_value(&ProductDetailPage::quantity_input()).as_deref(),
        Some("4")
    );
    assert_eq!(page.current_url().await.unwrap(), url("/view_cart"));
}

#[tokio::test(start_paused = true)]
async fn guest_checkout_registers_pays_and_downloads_invoice() {
    let (entry, page) = run_one(shop, "TC24").await;
    assert_eq!(entry.status, TestStatus::Passed, "{:?}", entry.error);
    assert!(page.was_called(&format!("click:{}", CartPage::register_login())));
    assert_eq!(
        page.filled_value(&PaymentPage::card_field("card-number")).as_deref(),
        Some("4111111111111111")
    );
    assert_eq!(
        page.filled_value(&CheckoutPage::comment()).as_deref(),
        Some("Please deliver between 9am and 5pm.")
    );
    assert!(page.was_called(&format!("click:{}", PaymentPage::download_invoice())));
    assert!(page.was_called(&format!("click:{}", HomePage::delete_account_link())));
    assert!(!page.is_visible(&HomePage::logged_in_as()).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn registration_fills_every_signup_field() {
    let (entry, page) = run_one(shop, "TC15").await;
    assert_eq!(entry.status, TestStatus::Passed, "{:?}", entry.error);
    let address = registered_address();
    assert_eq!(
        page.filled_value(&SignupPage::field("city")).as_deref(),
        Some(address.city.as_str())
    );
    assert_eq!(
        page.filled_value(&SignupPage::field("country")).as_deref(),
        Some(address.country.as_str())
    );
    assert!(page
        .filled_value(&LoginPage::signup_email())
        .unwrap()
        .ends_with("@example.com"));
}

#[tokio::test(start_paused = true)]
async fn billing_address_mismatch_fails_address_check() {
    let (entry, page) = run_one(
        || {
            let driver = shop();
            let mut moved = registered_address();
            moved.city = "Springfield".to_string();
            driver.add_page_element(
                "/checkout",
                &CheckoutPage::invoice_address(),
                MockElement::text(address_text(&moved)),
            );
            driver
        },
        "TC23",
    )
    .await;

    assert_eq!(entry.status, TestStatus::Failed);
    let error = entry.error.as_deref().unwrap();
    assert!(error.contains("billing address"), "{error}");
    let last = entry.steps.last().unwrap();
    assert_eq!(last.name, "verify addresses");
    assert_eq!(last.status, TestStatus::Failed);
    assert!(!page.was_called(&format!("click:{}", HomePage::delete_account_link())));
    assert!(page.is_closed());
}

#[tokio::test(start_paused = true)]
async fn cart_emptied_by_login_fails_persistence_check() {
    let (entry, _) = run_one(
        || {
            let driver = shop();
            driver.on_click(
                &LoginPage::login_button(),
                vec![MockAction::Remove(CartPage::rows())],
            );
            driver
        },
        "TC20",
    )
    .await;

    assert_eq!(entry.status, TestStatus::Failed);
    let error = entry.error.as_deref().unwrap();
    assert!(error.contains("cart shrank from 3 to 0"), "{error}");
    assert_eq!(
        step_names(&entry),
        [
            "open products",
            "search",
            "add results to cart",
            "verify cart",
            "log in",
            "verify cart after login",
        ]
    );
    assert_eq!(entry.steps[5].status, TestStatus::Failed);
    assert_eq!(entry.attachments.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_payment_form_stops_at_place_order() {
    let (entry, page) = run_one(
        || {
            let driver = shop();
            driver.remove_element(&PaymentPage::pay_button());
            driver
        },
        "TC14",
    )
    .await;

    assert_eq!(entry.status, TestStatus::Failed);
    assert!(entry.error.as_deref().unwrap().contains("pay button"));
    assert_eq!(entry.steps.last().unwrap().name, "place order");
    assert_eq!(page.current_url().await.unwrap(), url("/payment"));
}
