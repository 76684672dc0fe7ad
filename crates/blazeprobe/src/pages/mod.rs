//! Page Object Model for the DemoBlaze storefront.
//!
//! Every page object borrows a [`BrowserSession`] and follows one contract:
//!
//! - actions wait for their target to be clickable, act, and return `Self`
//!   or the page the action statically leads to
//! - queries return values; `is_*_displayed` style checks never fail
//! - constructors of modals wait for the modal root to become visible
//!
//! ```text
//!  HomePage ──click_login_link──▶ LoginModal ──click_close──▶ HomePage
//!     │ ──click_sign_up_link──▶ SignUpModal
//!     │ ──click_product──▶ ProductPage ──add_to_cart──▶ (alert)
//!     └ ──click_cart──▶ CartPage ──click_place_order──▶ PlaceOrderModal
//!                                    ──click_purchase──▶ PurchaseConfirmation
//!                                                         ──click_ok──▶ HomePage
//! ```

pub mod about;
pub mod cart;
pub mod contact;
pub mod home;
pub mod login;
mod modal;
pub mod nav;
pub mod order;
pub mod product;
pub mod signup;

pub use about::AboutUsModal;
pub use cart::CartPage;
pub use contact::ContactModal;
pub use home::{Category, HomePage};
pub use login::LoginModal;
pub use nav::NavBar;
pub use order::{PlaceOrderModal, PurchaseConfirmation, PurchaseDetails};
pub use product::ProductPage;
pub use signup::SignUpModal;

use crate::driver::BrowserDriver;
use crate::locator::{LocatorRegistry, UrlMatcher};
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;
use async_trait::async_trait;

/// A page or modal of the storefront
#[async_trait]
pub trait PageObject<D: BrowserDriver>: Send + Sync {
    /// Session the page is bound to
    fn session(&self) -> &BrowserSession<D>;

    /// URL pattern of the document hosting the page
    fn url_pattern(&self) -> &'static str;

    /// Name for logs and reports
    fn page_name(&self) -> &'static str;

    /// Named locator table
    fn locators(&self) -> LocatorRegistry;

    /// Whether the browser currently shows this page
    async fn is_loaded(&self) -> bool {
        match self.session().current_url().await {
            Ok(url) => UrlMatcher::new(self.url_pattern()).matches(&url),
            Err(err) => {
                tracing::debug!(page = self.page_name(), error = %err, "is_loaded probe failed");
                false
            }
        }
    }
}

/// Parse a displayed price
///
/// Every character that is not an ASCII digit or `.` is dropped and the rest
/// is parsed as a decimal: `"$1,234.56 total"` reads as `1234.56`.
///
/// # Errors
///
/// `PriceFormat` when nothing numeric remains
pub fn parse_price(raw: &str) -> ProbeResult<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits
        .parse::<f64>()
        .map_err(|_| ProbeError::PriceFormat {
            raw: raw.to_string(),
        })
}

/// Render an amount the way the storefront does (no trailing `.0`)
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let text = format!("{amount:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod parse_price_tests {
        use super::*;

        #[test]
        fn test_strips_currency_and_separators() {
            assert!((parse_price("$1,234.56 total").unwrap() - 1234.56).abs() < 1e-9);
        }

        #[test]
        fn test_zero() {
            assert_eq!(parse_price("$0").unwrap(), 0.0);
        }

        #[test]
        fn test_site_formats() {
            assert_eq!(parse_price("$360 *includes tax").unwrap(), 360.0);
            assert_eq!(parse_price("Total: 790").unwrap(), 790.0);
            assert_eq!(parse_price("Amount: 1100 USD").unwrap(), 1100.0);
            assert_eq!(parse_price("50.5").unwrap(), 50.5);
        }

        #[test]
        fn test_blank_is_error() {
            assert!(matches!(parse_price(""), Err(ProbeError::PriceFormat { .. })));
            assert!(matches!(parse_price("USD"), Err(ProbeError::PriceFormat { .. })));
        }

        #[test]
        fn test_two_dots_is_error() {
            assert!(parse_price("1.2.3").is_err());
        }
    }

    mod format_amount_tests {
        use super::*;

        #[test]
        fn test_whole_amount() {
            assert_eq!(format_amount(790.0), "790");
        }

        #[test]
        fn test_fractional_amount() {
            assert_eq!(format_amount(150.5), "150.5");
            assert_eq!(format_amount(0.25), "0.25");
        }

        #[test]
        fn test_sub_cent_remainder_rounds_away() {
            assert_eq!(format_amount(0.001), "0");
            assert_eq!(format_amount(5.004), "5");
            assert_eq!(format_amount(5.996), "6");
        }
    }

    proptest! {
        #[test]
        fn prop_decorated_cents_round_trip(cents in 0u64..10_000_000, prefix in "[$€A-Za-z :]{0,6}", suffix in "[ A-Za-z*]{0,10}") {
            let value = cents as f64 / 100.0;
            let raw = format!("{prefix}{value:.2}{suffix}");
            let parsed = parse_price(&raw).unwrap();
            prop_assert!((parsed - value).abs() < 1e-6);
        }

        #[test]
        fn prop_thousands_separators_ignored(whole in 0u64..1_000_000_000) {
            let plain = whole.to_string();
            let mut grouped = String::new();
            for (i, c) in plain.chars().enumerate() {
                if i > 0 && (plain.len() - i) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(c);
            }
            prop_assert_eq!(parse_price(&format!("${grouped}")).unwrap(), whole as f64);
        }

        #[test]
        fn prop_formatted_amount_parses_back(cents in 0u64..10_000_000) {
            let value = cents as f64 / 100.0;
            prop_assert!((parse_price(&format_amount(value)).unwrap() - value).abs() < 1e-6);
        }
    }
}
