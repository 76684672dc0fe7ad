//! Place-order modal and the purchase confirmation dialog.

use super::modal::ModalFrame;
use super::{parse_price, CartPage, HomePage, PageObject};
use crate::driver::BrowserDriver;
use crate::fixtures::OrderForm;
use crate::locator::LocatorRegistry;
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;
use crate::wait::{ElementInvisible, ElementVisible};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Place-order modal locators
#[allow(missing_docs)]
pub mod locators {
    use crate::locator::Locator;

    pub const MODAL: Locator = Locator::id("orderModal");
    pub const TITLE: Locator = Locator::id("orderModalLabel");
    pub const TOTAL: Locator = Locator::id("totalm");
    pub const NAME: Locator = Locator::id("name");
    pub const COUNTRY: Locator = Locator::id("country");
    pub const CITY: Locator = Locator::id("city");
    pub const CARD: Locator = Locator::id("card");
    pub const MONTH: Locator = Locator::id("month");
    pub const YEAR: Locator = Locator::id("year");
    pub const PURCHASE_BUTTON: Locator = Locator::css("button[onclick='purchaseOrder()']");
    pub const CLOSE_BUTTON: Locator = Locator::css("#orderModal .modal-footer .btn-secondary");
    pub const X_ICON: Locator = Locator::css("#orderModal .close");

    pub const CONFIRMATION: Locator = Locator::css(".sweet-alert");
    pub const CONFIRMATION_HEADING: Locator = Locator::css(".sweet-alert h2");
    pub const CONFIRMATION_DETAILS: Locator = Locator::css(".sweet-alert p.lead");
    pub const CONFIRMATION_OK: Locator = Locator::css(".sweet-alert button.confirm");
}

use locators::*;

const FRAME: ModalFrame = ModalFrame {
    name: "place-order",
    root: MODAL,
    title: TITLE,
    close_button: CLOSE_BUTTON,
    x_icon: X_ICON,
};

/// The "Place order" modal
#[derive(Debug)]
pub struct PlaceOrderModal<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> PlaceOrderModal<'s, D> {
    pub(crate) async fn opened(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        FRAME.wait_open(session).await?;
        Ok(Self { session })
    }

    /// Modal heading
    pub async fn get_modal_title(&self) -> ProbeResult<String> {
        FRAME.title(self.session).await
    }

    /// Order total shown in the modal ("Total: 790")
    pub async fn total(&self) -> ProbeResult<f64> {
        parse_price(&self.session.text_of(&TOTAL).await?)
    }

    /// Fill every field of the form
    pub async fn fill_order_form(self, order: &OrderForm) -> ProbeResult<Self> {
        for (locator, value) in [
            (&NAME, &order.name),
            (&COUNTRY, &order.country),
            (&CITY, &order.city),
            (&CARD, &order.card),
            (&MONTH, &order.month),
            (&YEAR, &order.year),
        ] {
            self.session.type_into(locator, value).await?;
        }
        Ok(self)
    }

    /// Submit a complete form and wait for the confirmation
    ///
    /// # Errors
    ///
    /// `UnexpectedAlert` when the site rejects the form instead
    pub async fn click_purchase(self) -> ProbeResult<PurchaseConfirmation<'s, D>> {
        tracing::info!("submit order");
        self.session.click(&PURCHASE_BUTTON).await?;
        PurchaseConfirmation::opened(self.session).await
    }

    /// Submit and return the text of the rejection alert, if any
    ///
    /// The alert is accepted. `None` means the site showed no alert within
    /// the grace budget.
    pub async fn submit_expecting_alert(self) -> ProbeResult<Option<String>> {
        self.session.click(&PURCHASE_BUTTON).await?;
        Ok(self.session.alerts().accept_if_present().await)
    }

    /// Whether the modal is shown
    pub async fn is_displayed(&self) -> bool {
        FRAME.is_displayed(self.session).await
    }

    /// Close with the footer button
    pub async fn click_close(self) -> ProbeResult<CartPage<'s, D>> {
        FRAME.close(self.session).await?;
        CartPage::wait_loaded(self.session).await
    }

    /// Close with the header X
    pub async fn click_x(self) -> ProbeResult<CartPage<'s, D>> {
        FRAME.dismiss(self.session).await?;
        CartPage::wait_loaded(self.session).await
    }
}

#[async_trait]
impl<D: BrowserDriver> PageObject<D> for PlaceOrderModal<'_, D> {
    fn session(&self) -> &BrowserSession<D> {
        self.session
    }

    fn url_pattern(&self) -> &'static str {
        "/cart.html"
    }

    fn page_name(&self) -> &'static str {
        "place-order modal"
    }

    fn locators(&self) -> LocatorRegistry {
        LocatorRegistry::from_table(
            "place_order",
            &[
                ("modal", MODAL),
                ("title", TITLE),
                ("total", TOTAL),
                ("name", NAME),
                ("country", COUNTRY),
                ("city", CITY),
                ("card", CARD),
                ("month", MONTH),
                ("year", YEAR),
                ("purchase_button", PURCHASE_BUTTON),
                ("close_button", CLOSE_BUTTON),
                ("x_icon", X_ICON),
            ],
        )
    }

    async fn is_loaded(&self) -> bool {
        self.is_displayed().await
    }
}

/// Fields of the purchase confirmation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDetails {
    /// Order id
    pub id: String,
    /// Charged amount
    pub amount: f64,
    /// Card number as echoed
    pub card: String,
    /// Customer name
    pub name: String,
    /// Order date as shown
    pub date: String,
}

impl PurchaseDetails {
    /// Parse the confirmation paragraph
    ///
    /// Lines look like `Id: 123`, `Amount: 790 USD`, `Card Number: 4111`,
    /// `Name: Jane`, `Date: 15/10/2026`; unknown lines are ignored.
    ///
    /// # Errors
    ///
    /// `PriceFormat` when the amount is unreadable
    pub fn parse(text: &str) -> ProbeResult<Self> {
        let mut details = Self::default();
        let mut amount = None;
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim() {
                "Id" => details.id = value,
                "Amount" => amount = Some(parse_price(&value)?),
                "Card Number" => details.card = value,
                "Name" => details.name = value,
                "Date" => details.date = value,
                _ => {}
            }
        }
        details.amount = amount.ok_or_else(|| ProbeError::PriceFormat {
            raw: text.to_string(),
        })?;
        Ok(details)
    }
}

/// The "Thank you for your purchase!" dialog
#[derive(Debug)]
pub struct PurchaseConfirmation<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> PurchaseConfirmation<'s, D> {
    pub(crate) async fn opened(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        session.wait().until(ElementVisible(CONFIRMATION)).await?;
        tracing::info!(page = "purchase confirmation", "dialog open");
        Ok(Self { session })
    }

    /// Dialog heading
    pub async fn heading(&self) -> ProbeResult<String> {
        Ok(self.session.text_of(&CONFIRMATION_HEADING).await?.trim().to_string())
    }

    /// Whether the heading is the site's thank-you text
    pub async fn is_successful(&self) -> ProbeResult<bool> {
        Ok(self.heading().await? == self.session.fixtures().purchase_heading)
    }

    /// Parsed order details
    pub async fn details(&self) -> ProbeResult<PurchaseDetails> {
        PurchaseDetails::parse(&self.session.text_of(&CONFIRMATION_DETAILS).await?)
    }

    /// Dismiss the dialog; the site returns to the home page
    pub async fn click_ok(self) -> ProbeResult<HomePage<'s, D>> {
        self.session.click(&CONFIRMATION_OK).await?;
        self.session.wait().until(ElementInvisible(CONFIRMATION)).await?;
        HomePage::wait_loaded(self.session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_details() {
        let details = PurchaseDetails::parse(
            "Id: 8351234\nAmount: 790 USD\nCard Number: 4111\nName: Jane Tester\nDate: 15/10/2026",
        )
        .unwrap();
        assert_eq!(details.id, "8351234");
        assert_eq!(details.amount, 790.0);
        assert_eq!(details.card, "4111");
        assert_eq!(details.name, "Jane Tester");
        assert_eq!(details.date, "15/10/2026");
    }

    #[test]
    fn test_parse_details_without_amount() {
        assert!(matches!(
            PurchaseDetails::parse("Id: 1\nName: x"),
            Err(ProbeError::PriceFormat { .. })
        ));
    }
}
