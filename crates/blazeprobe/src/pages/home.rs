//! Home page: navbar entry points and the paginated product grid.

use super::{
    AboutUsModal, CartPage, ContactModal, LoginModal, NavBar, PageObject, ProductPage,
    SignUpModal,
};
use crate::driver::BrowserDriver;
use crate::locator::{Locator, LocatorRegistry, Strategy};
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;
use crate::wait::{ElementPresent, ElementVisible, StalenessOf};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Home page locators
#[allow(missing_docs)]
pub mod locators {
    use crate::locator::Locator;

    pub const GRID: Locator = Locator::id("tbodyid");
    pub const CARD: Locator = Locator::css("#tbodyid .card");
    pub const CARD_TITLE: Locator = Locator::css("#tbodyid .hrefch");
    pub const CARD_PRICE: Locator = Locator::css("#tbodyid .card-block h5");
    pub const NEXT: Locator = Locator::id("next2");
    pub const PREVIOUS: Locator = Locator::id("prev2");
    pub const PHONES: Locator = Locator::link_text("Phones");
    pub const LAPTOPS: Locator = Locator::link_text("Laptops");
    pub const MONITORS: Locator = Locator::link_text("Monitors");
}

use locators::*;

/// Path of the home document
pub const HOME_PATH: &str = "/index.html";

/// Product category of the sidebar filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Phones
    Phones,
    /// Laptops
    Laptops,
    /// Monitors
    Monitors,
}

impl Category {
    /// Every category, in sidebar order
    pub const ALL: [Self; 3] = [Self::Phones, Self::Laptops, Self::Monitors];

    /// Sidebar link
    #[must_use]
    pub const fn locator(&self) -> Locator {
        match self {
            Self::Phones => PHONES,
            Self::Laptops => LAPTOPS,
            Self::Monitors => MONITORS,
        }
    }

    /// Label as shown in the sidebar
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Phones => "Phones",
            Self::Laptops => "Laptops",
            Self::Monitors => "Monitors",
        }
    }

    /// Key used by the storefront's API (`phone`, `notebook`, `monitor`)
    #[must_use]
    pub const fn api_key(&self) -> &'static str {
        match self {
            Self::Phones => "phone",
            Self::Laptops => "notebook",
            Self::Monitors => "monitor",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phones" | "phone" => Ok(Self::Phones),
            "laptops" | "laptop" | "notebook" => Ok(Self::Laptops),
            "monitors" | "monitor" => Ok(Self::Monitors),
            other => Err(ProbeError::precondition(format!("unknown category: {other}"))),
        }
    }
}

/// The storefront landing page
#[derive(Debug)]
pub struct HomePage<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> HomePage<'s, D> {
    /// Navigate to the home page and wait for the product grid
    pub async fn open(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        session.open(HOME_PATH).await?;
        Self::wait_loaded(session).await
    }

    /// Bind to an already loaded home page
    pub(crate) async fn wait_loaded(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        session.wait().until(ElementVisible(CARD_TITLE)).await?;
        tracing::info!(page = "home", "page loaded");
        Ok(Self { session })
    }

    /// Navbar of this document
    #[must_use]
    pub const fn nav(&self) -> NavBar<'s, D> {
        NavBar::new(self.session)
    }

    /// Open the login modal
    pub async fn click_login_link(&self) -> ProbeResult<LoginModal<'s, D>> {
        self.nav().click_login().await
    }

    /// Open the sign-up modal
    pub async fn click_sign_up_link(&self) -> ProbeResult<SignUpModal<'s, D>> {
        self.nav().click_sign_up().await
    }

    /// Open the about-us modal
    pub async fn click_about_us(&self) -> ProbeResult<AboutUsModal<'s, D>> {
        self.nav().click_about_us().await
    }

    /// Open the contact modal
    pub async fn click_contact(&self) -> ProbeResult<ContactModal<'s, D>> {
        self.nav().click_contact().await
    }

    /// Go to the cart
    pub async fn click_cart(&self) -> ProbeResult<CartPage<'s, D>> {
        self.nav().click_cart().await
    }

    /// Log out
    pub async fn logout(&self) -> ProbeResult<Self> {
        self.nav().click_logout().await
    }

    /// Whether someone is logged in
    pub async fn is_logged_in(&self) -> bool {
        self.nav().is_logged_in().await
    }

    /// Navbar greeting
    pub async fn welcome_text(&self) -> Option<String> {
        self.nav().welcome_text().await
    }

    /// Accept a pending alert, if any; returns its text
    pub async fn handle_alert(&self) -> Option<String> {
        self.session.alerts().accept_if_present().await
    }

    /// Filter the grid by category
    ///
    /// Waits for the old grid to be replaced before returning.
    pub async fn select_category(self, category: Category) -> ProbeResult<Self> {
        tracing::info!(category = %category, "select category");
        self.replace_grid(&category.locator()).await?;
        Ok(self)
    }

    /// Titles of the products on the current grid page
    pub async fn product_titles(&self) -> ProbeResult<Vec<String>> {
        let driver = self.session.driver();
        let mut titles = Vec::new();
        for element in driver.find_all(&CARD_TITLE).await? {
            titles.push(driver.text(&element).await?.trim().to_string());
        }
        Ok(titles)
    }

    /// Prices shown on the current grid page
    pub async fn product_prices(&self) -> ProbeResult<Vec<f64>> {
        let driver = self.session.driver();
        let mut prices = Vec::new();
        for element in driver.find_all(&CARD_PRICE).await? {
            prices.push(super::parse_price(&driver.text(&element).await?)?);
        }
        Ok(prices)
    }

    /// Number of product cards on the current grid page
    pub async fn product_count(&self) -> ProbeResult<usize> {
        self.session.count(&CARD).await
    }

    /// Whether a next grid page exists
    pub async fn has_next_page(&self) -> bool {
        self.session.is_visible(&NEXT).await
    }

    /// Whether a previous grid page exists
    pub async fn has_previous_page(&self) -> bool {
        self.session.is_visible(&PREVIOUS).await
    }

    /// Advance the grid one page
    ///
    /// # Errors
    ///
    /// `Precondition` on the last page
    pub async fn next_page(self) -> ProbeResult<Self> {
        if !self.has_next_page().await {
            return Err(ProbeError::precondition("no next page in product grid"));
        }
        self.replace_grid(&NEXT).await?;
        Ok(self)
    }

    /// Go back one grid page
    ///
    /// # Errors
    ///
    /// `Precondition` on the first page
    pub async fn previous_page(self) -> ProbeResult<Self> {
        if !self.has_previous_page().await {
            return Err(ProbeError::precondition("no previous page in product grid"));
        }
        self.replace_grid(&PREVIOUS).await?;
        Ok(self)
    }

    /// Page forward from the current grid page until `name` shows up
    pub async fn find_product(self, name: &str) -> ProbeResult<(Self, bool)> {
        let mut page = self;
        loop {
            if page.product_titles().await?.iter().any(|t| t == name) {
                return Ok((page, true));
            }
            if !page.has_next_page().await {
                return Ok((page, false));
            }
            page = page.next_page().await?;
        }
    }

    /// Open the details page of a product on the current grid page
    pub async fn click_product(&self, name: &str) -> ProbeResult<ProductPage<'s, D>> {
        tracing::info!(product = name, "open product");
        self.session
            .click(&Locator::dynamic(Strategy::LinkText, name))
            .await?;
        ProductPage::wait_loaded(self.session).await
    }

    async fn replace_grid(&self, trigger: &Locator) -> ProbeResult<()> {
        let first = self.session.wait().until(ElementPresent(CARD_TITLE)).await?;
        self.session.click(trigger).await?;
        self.session.wait().until(StalenessOf(first)).await?;
        self.session.wait().until(ElementVisible(CARD_TITLE)).await?;
        Ok(())
    }
}

impl<D: BrowserDriver> PageObject<D> for HomePage<'_, D> {
    fn session(&self) -> &BrowserSession<D> {
        self.session
    }

    fn url_pattern(&self) -> &'static str {
        "/"
    }

    fn page_name(&self) -> &'static str {
        "home"
    }

    fn locators(&self) -> LocatorRegistry {
        LocatorRegistry::from_table(
            "home",
            &[
                ("grid", GRID),
                ("card", CARD),
                ("card_title", CARD_TITLE),
                ("card_price", CARD_PRICE),
                ("next", NEXT),
                ("previous", PREVIOUS),
                ("phones", PHONES),
                ("laptops", LAPTOPS),
                ("monitors", MONITORS),
            ],
        )
    }
}
