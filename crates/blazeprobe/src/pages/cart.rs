//! Cart page (`/cart.html`).
//!
//! Rows are rendered from the server after the document loads and re-rendered
//! after every deletion, so row handles are never kept across a mutation;
//! counts and totals are re-read from the live document.
//!
//! Bulk deletion counts the rows up front, clicks each captured delete control
//! and waits for it to go stale before the next click. If the site re-rendered
//! the table, the remaining captured controls are already stale and are never
//! clicked; the controls are captured again once the expected number of rows
//! is back.

use super::{format_amount, parse_price, HomePage, NavBar, PageObject, PlaceOrderModal};
use crate::driver::BrowserDriver;
use crate::fixtures::OrderForm;
use crate::locator::{Locator, LocatorRegistry};
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;
use crate::wait::{poll_fn, ElementCount, ElementPresent, StalenessOf};

/// Cart page locators
#[allow(missing_docs)]
pub mod locators {
    use crate::locator::Locator;

    pub const TABLE: Locator = Locator::id("tbodyid");
    pub const ROWS: Locator = Locator::css("#tbodyid > tr");
    pub const TITLE_CELL: Locator = Locator::css("td:nth-child(2)");
    pub const PRICE_CELL: Locator = Locator::css("td:nth-child(3)");
    pub const DELETE: Locator = Locator::link_text("Delete");
    pub const TOTAL: Locator = Locator::id("totalp");
    pub const PLACE_ORDER: Locator = Locator::css("button[data-target='#orderModal']");
}

use locators::*;

/// Path of the cart document
pub const CART_PATH: &str = "/cart.html";

/// Tolerance when comparing displayed totals
pub const TOTAL_TOLERANCE: f64 = 0.01;

/// The shopping cart
#[derive(Debug)]
pub struct CartPage<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> CartPage<'s, D> {
    /// Navigate to the cart
    pub async fn open(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        session.open(CART_PATH).await?;
        Self::wait_loaded(session).await
    }

    pub(crate) async fn wait_loaded(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        session.wait().until(ElementPresent(TABLE)).await?;
        session.wait().until(ElementPresent(TOTAL)).await?;
        // rows arrive with the cart request; an empty cart never renders any
        let rows = session.probe().optional(ElementPresent(ROWS)).await?;
        tracing::info!(page = "cart", has_rows = rows.is_some(), "page loaded");
        Ok(Self { session })
    }

    /// Navbar of this document
    #[must_use]
    pub const fn nav(&self) -> NavBar<'s, D> {
        NavBar::new(self.session)
    }

    /// Number of rows currently in the table
    pub async fn get_cart_item_count(&self) -> ProbeResult<usize> {
        self.session.count(&ROWS).await
    }

    /// Product titles, in table order
    pub async fn item_titles(&self) -> ProbeResult<Vec<String>> {
        self.read_cells(&TITLE_CELL).await
    }

    /// Row prices, in table order
    pub async fn item_prices(&self) -> ProbeResult<Vec<f64>> {
        self.read_cells(&PRICE_CELL)
            .await?
            .iter()
            .map(|raw| parse_price(raw))
            .collect()
    }

    /// Displayed total; an empty cart shows no total and reads as zero
    pub async fn get_total_price(&self) -> ProbeResult<f64> {
        let driver = self.session.driver();
        let element = driver.find(&TOTAL).await?;
        let raw = driver.text(&element).await?;
        if raw.trim().is_empty() {
            return Ok(0.0);
        }
        parse_price(&raw)
    }

    /// Wait until the table holds exactly `expected` rows
    pub async fn wait_for_item_count(&self, expected: usize) -> ProbeResult<usize> {
        self.session
            .wait()
            .until(ElementCount {
                locator: ROWS,
                expected,
            })
            .await
    }

    /// Wait until the displayed total equals `expected` (within a cent)
    pub async fn wait_for_total(&self, expected: f64) -> ProbeResult<f64> {
        let description = format!("cart total to equal {}", format_amount(expected));
        self.session
            .wait()
            .until(poll_fn(description, move |d: &D| {
                Box::pin(async move {
                    let element = d.find(&TOTAL).await?;
                    let raw = d.text(&element).await?;
                    let total = if raw.trim().is_empty() {
                        0.0
                    } else {
                        parse_price(&raw)?
                    };
                    Ok::<_, ProbeError>(((total - expected).abs() < TOTAL_TOLERANCE).then_some(total))
                })
            }))
            .await
    }

    /// Delete the first row and wait until exactly one row is gone
    ///
    /// # Errors
    ///
    /// `Precondition` when the cart is empty
    pub async fn delete_first_item(self) -> ProbeResult<Self> {
        let before = self.get_cart_item_count().await?;
        if before == 0 {
            return Err(ProbeError::precondition("delete_first_item on an empty cart"));
        }
        let driver = self.session.driver();
        let rows = driver.find_all(&ROWS).await?;
        let first = rows
            .first()
            .ok_or_else(|| ProbeError::precondition("cart emptied before delete"))?;
        let control = driver.find_in(first, &DELETE).await?;
        tracing::info!(rows = before, "delete first cart item");
        driver.click(&control).await?;
        self.wait_for_item_count(before - 1).await?;
        Ok(self)
    }

    /// Delete the row titled `title`
    ///
    /// # Errors
    ///
    /// `ElementNotFound` when no row carries that title
    pub async fn delete_item(self, title: &str) -> ProbeResult<Self> {
        let driver = self.session.driver();
        let rows = driver.find_all(&ROWS).await?;
        let before = rows.len();
        for row in rows {
            let cell = driver.find_in(&row, &TITLE_CELL).await?;
            if driver.text(&cell).await?.trim() == title {
                let control = driver.find_in(&row, &DELETE).await?;
                tracing::info!(title, "delete cart item");
                driver.click(&control).await?;
                self.session.wait().until(StalenessOf(row)).await?;
                self.wait_for_item_count(before - 1).await?;
                return Ok(self);
            }
        }
        Err(ProbeError::ElementNotFound {
            locator: format!("cart row titled {title:?}"),
        })
    }

    /// Delete every row; returns the number of delete clicks issued
    ///
    /// Exactly one click is issued per row present when the call starts.
    pub async fn delete_all_items(self) -> ProbeResult<(Self, usize)> {
        let driver = self.session.driver();
        let target = self.get_cart_item_count().await?;
        let mut clicks = 0;
        while clicks < target {
            // the table may be emptied before the remaining rows come back
            self.wait_for_item_count(target - clicks).await?;
            for control in driver.find_all(&DELETE).await? {
                match driver.is_enabled(&control).await {
                    Ok(_) => {}
                    Err(ProbeError::StaleElement { .. }) => break,
                    Err(err) => return Err(err),
                }
                match driver.click(&control).await {
                    Ok(()) => {}
                    Err(ProbeError::StaleElement { .. }) => break,
                    Err(err) => return Err(err),
                }
                clicks += 1;
                tracing::debug!(clicks, target, "cart row deleted");
                self.session.wait().until(StalenessOf(control)).await?;
                if clicks == target {
                    break;
                }
            }
        }
        self.wait_for_item_count(0).await?;
        tracing::info!(clicks, "cart emptied");
        Ok((self, clicks))
    }

    /// Open the place-order modal
    pub async fn click_place_order(self) -> ProbeResult<PlaceOrderModal<'s, D>> {
        self.session.click(&PLACE_ORDER).await?;
        PlaceOrderModal::opened(self.session).await
    }

    /// Order the cart contents, confirm, and return to the home page
    pub async fn complete_purchase(self, order: &OrderForm) -> ProbeResult<HomePage<'s, D>> {
        self.click_place_order()
            .await?
            .fill_order_form(order)
            .await?
            .click_purchase()
            .await?
            .click_ok()
            .await
    }

    async fn read_cells(&self, cell: &Locator) -> ProbeResult<Vec<String>> {
        let driver = self.session.driver();
        let mut values = Vec::new();
        for row in driver.find_all(&ROWS).await? {
            let element = driver.find_in(&row, cell).await?;
            values.push(driver.text(&element).await?.trim().to_string());
        }
        Ok(values)
    }
}

impl<D: BrowserDriver> PageObject<D> for CartPage<'_, D> {
    fn session(&self) -> &BrowserSession<D> {
        self.session
    }

    fn url_pattern(&self) -> &'static str {
        CART_PATH
    }

    fn page_name(&self) -> &'static str {
        "cart"
    }

    fn locators(&self) -> LocatorRegistry {
        LocatorRegistry::from_table(
            "cart",
            &[
                ("table", TABLE),
                ("rows", ROWS),
                ("title_cell", TITLE_CELL),
                ("price_cell", PRICE_CELL),
                ("delete", DELETE),
                ("total", TOTAL),
                ("place_order", PLACE_ORDER),
            ],
        )
    }
}
