//! Test data provider.
//!
//! Journeys receive a [`TestData`] instead of reaching for shared constants.
//! The valid user comes from configuration; everything else is sample data
//! the demo store accepts. Registration e-mails are unique per call.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

static EMAIL_SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Generate an address no previous run has registered
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = EMAIL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}{millis}{seq}@example.com")
}

/// E-mail and password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

impl UserCredentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Salutation on the signup form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Title {
    Mr,
    Mrs,
}

/// Everything the signup form asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationProfile {
    pub name: String,
    pub email: String,
    pub title: Title,
    pub password: String,
    pub day: String,
    pub month: String,
    pub year: String,
    pub newsletter: bool,
    pub offers: bool,
    pub address: Address,
}

/// Postal address used at signup and checked at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address1: String,
    pub address2: Option<String>,
    pub country: String,
    pub state: String,
    pub city: String,
    pub zipcode: String,
    pub mobile_number: String,
}

/// Contact form input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Product review input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewInput {
    pub name: String,
    pub email: String,
    pub review: String,
}

/// Card details for the payment form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCard {
    pub name_on_card: String,
    pub card_number: String,
    pub cvc: String,
    pub expiration_month: String,
    pub expiration_year: String,
}

/// Store categories by section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categories {
    pub women: Vec<&'static str>,
    pub men: Vec<&'static str>,
    pub kids: Vec<&'static str>,
}

/// Data injected into every journey
#[derive(Debug, Clone)]
pub struct TestData {
    pub valid_user: UserCredentials,
    pub invalid_user: UserCredentials,
    pub existing_user: UserCredentials,
    pub contact: ContactMessage,
    pub review: ReviewInput,
    pub payment: PaymentCard,
    pub search_terms: Vec<&'static str>,
    pub categories: Categories,
    pub brands: Vec<&'static str>,
}

impl TestData {
    /// Sample data with `valid_user` as the account that can sign in
    #[must_use]
    pub fn new(valid_user: UserCredentials) -> Self {
        Self {
            valid_user,
            invalid_user: UserCredentials::new("invalid@example.com", "wrongpassword"),
            existing_user: UserCredentials::new("existing@example.com", "password123"),
            contact: ContactMessage {
                name: "Test User".to_string(),
                email: "test@example.com".to_string(),
                subject: "Test Subject".to_string(),
                message: "This is a test message for the contact form. Testing automation."
                    .to_string(),
            },
            review: ReviewInput {
                name: "Test Reviewer".to_string(),
                email: "reviewer@example.com".to_string(),
                review: "This is an excellent product! Highly recommended for anyone looking for quality."
                    .to_string(),
            },
            payment: PaymentCard {
                name_on_card: "Test User".to_string(),
                card_number: "4111111111111111".to_string(),
                cvc: "123".to_string(),
                expiration_month: "12".to_string(),
                expiration_year: "2030".to_string(),
            },
            search_terms: vec!["shirt", "dress", "jeans", "top"],
            categories: Categories {
                women: vec!["Dress", "Tops", "Saree"],
                men: vec!["Tshirts", "Jeans"],
                kids: vec!["Dress", "Tops & Shirts"],
            },
            brands: vec![
                "Polo",
                "H&M",
                "Madame",
                "Mast & Harbour",
                "Babyhug",
                "Allen Solly Junior",
                "Kookie Kids",
                "Biba",
            ],
        }
    }

    /// A fresh signup profile with a never-used e-mail
    #[must_use]
    pub fn registration(&self) -> RegistrationProfile {
        RegistrationProfile {
            name: "Test User".to_string(),
            email: unique_email("test"),
            title: Title::Mr,
            password: "password123".to_string(),
            day: "15".to_string(),
            month: "January".to_string(),
            year: "1990".to_string(),
            newsletter: true,
            offers: true,
            address: Address {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                company: "Test Company".to_string(),
                address1: "123 Test Street".to_string(),
                address2: Some("Apt 456".to_string()),
                country: "United States".to_string(),
                state: "California".to_string(),
                city: "Los Angeles".to_string(),
                zipcode: "90210".to_string(),
                mobile_number: "+1234567890".to_string(),
            },
        }
    }
}
