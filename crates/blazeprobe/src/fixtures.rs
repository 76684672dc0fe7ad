//! Site literals and test data.
//!
//! The storefront's alert messages and modal titles live here instead of in
//! the page objects, so a copy change on the site is a configuration edit.
//! Alert fields hold fragments that are matched with `contains`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Literal texts shown by the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteFixtures {
    /// Login modal heading
    pub login_title: String,
    /// Sign-up modal heading
    pub sign_up_title: String,
    /// About-us modal heading
    pub about_title: String,
    /// Contact modal heading
    pub contact_title: String,
    /// Place-order modal heading
    pub place_order_title: String,
    /// Alert for blank username or password
    pub empty_credentials_alert: String,
    /// Alert when signing up with a taken username
    pub user_exists_alert: String,
    /// Alert for a wrong password
    pub wrong_password_alert: String,
    /// Alert for an unknown username
    pub unknown_user_alert: String,
    /// Alert after a successful sign-up
    pub sign_up_success_alert: String,
    /// Alert after adding a product to the cart
    pub product_added_alert: String,
    /// Alert after sending the contact form
    pub message_sent_alert: String,
    /// Alert when the order form misses name or card
    pub order_incomplete_alert: String,
    /// Heading of the purchase confirmation
    pub purchase_heading: String,
    /// Prefix of the navbar greeting
    pub welcome_prefix: String,
}

impl Default for SiteFixtures {
    fn default() -> Self {
        Self {
            login_title: "Log in".to_string(),
            sign_up_title: "Sign up".to_string(),
            about_title: "About us".to_string(),
            contact_title: "New message".to_string(),
            place_order_title: "Place order".to_string(),
            empty_credentials_alert: "fill out".to_string(),
            user_exists_alert: "already exist".to_string(),
            wrong_password_alert: "Wrong password".to_string(),
            unknown_user_alert: "User does not exist".to_string(),
            sign_up_success_alert: "Sign up successful".to_string(),
            product_added_alert: "Product added".to_string(),
            message_sent_alert: "Thanks for the message".to_string(),
            order_incomplete_alert: "Please fill out Name and Creditcard".to_string(),
            purchase_heading: "Thank you for your purchase!".to_string(),
            welcome_prefix: "Welcome".to_string(),
        }
    }
}

/// Username and password pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Blank username and password
    #[must_use]
    pub fn empty() -> Self {
        Self::new("", "")
    }

    /// Fresh account that the site has never seen
    #[must_use]
    pub fn unique(prefix: &str) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self::new(format!("{prefix}_{}", &suffix[..12]), format!("pw_{}", &suffix[12..24]))
    }

    /// Same username, different password
    #[must_use]
    pub fn with_wrong_password(&self) -> Self {
        Self::new(self.username.clone(), format!("{}_wrong", self.password))
    }
}

/// Place-order form contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderForm {
    /// Customer name
    pub name: String,
    /// Country
    pub country: String,
    /// City
    pub city: String,
    /// Credit card number
    pub card: String,
    /// Expiry month
    pub month: String,
    /// Expiry year
    pub year: String,
}

impl OrderForm {
    /// A complete, plausible order
    #[must_use]
    pub fn sample() -> Self {
        Self {
            name: "Jane Tester".to_string(),
            country: "Portugal".to_string(),
            city: "Lisbon".to_string(),
            card: "4111111111111111".to_string(),
            month: "10".to_string(),
            year: "2030".to_string(),
        }
    }

    /// Whether the site will accept the form (name and card are mandatory)
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.card.trim().is_empty()
    }
}
