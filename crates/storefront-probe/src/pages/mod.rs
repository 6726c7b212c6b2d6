//! Page objects.
//!
//! One type per page of the store, plus the pages of a generic test-id
//! instrumented application. Each page is a cheap `Copy` view over a
//! [`PageContext`](crate::page_object::PageContext); selectors are associated
//! functions so journeys and tests can share them without an instance.

mod cart;
mod checkout;
mod contact_us;
mod generic;
mod home;
mod login;
mod product_detail;
mod products;
mod signup;
mod test_cases;

pub use cart::CartPage;
pub use checkout::{CheckoutPage, PaymentPage};
pub use contact_us::ContactUsPage;
pub use generic::{
    FormValidation, GenericHomePage, GenericLoginPage, LoginCredentials, LoginResult,
    DASHBOARD_PATH,
};
pub use home::HomePage;
pub use login::LoginPage;
pub use product_detail::{DetailVisibility, ProductDetailPage};
pub use products::ProductsPage;
pub use signup::SignupPage;
pub use test_cases::TestCasesPage;
