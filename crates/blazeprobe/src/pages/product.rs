//! Product details page (`/prod.html?idp_=N`).

use super::{parse_price, CartPage, NavBar, PageObject};
use crate::driver::BrowserDriver;
use crate::locator::{LocatorRegistry, UrlMatcher};
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;
use crate::wait::{poll_fn, UrlContains};

/// Product page locators
#[allow(missing_docs)]
pub mod locators {
    use crate::locator::Locator;

    pub const NAME: Locator = Locator::css("#tbodyid h2.name");
    pub const PRICE: Locator = Locator::css("#tbodyid h3.price-container");
    pub const DESCRIPTION: Locator = Locator::css("#more-information p");
    pub const ADD_TO_CART: Locator = Locator::link_text("Add to cart");
}

use locators::*;

/// URL pattern of the details page
pub const PRODUCT_URL: &str = "/prod.html?idp_=:id";

/// Details page of one product
#[derive(Debug)]
pub struct ProductPage<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> ProductPage<'s, D> {
    /// Navigate straight to a product by id
    pub async fn open(session: &'s BrowserSession<D>, id: u32) -> ProbeResult<Self> {
        session.open(&format!("/prod.html?idp_={id}")).await?;
        Self::wait_loaded(session).await
    }

    pub(crate) async fn wait_loaded(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        session.wait().until(UrlContains("prod.html".into())).await?;
        // the product is fetched after the document loads; the heading starts empty
        session
            .wait()
            .until(poll_fn("product name to render", |d: &D| {
                Box::pin(async move {
                    for element in d.find_all(&NAME).await? {
                        if !d.text(&element).await?.trim().is_empty() {
                            return Ok(Some(()));
                        }
                    }
                    Ok::<_, ProbeError>(None)
                })
            }))
            .await?;
        session.visible(&ADD_TO_CART).await?;
        tracing::info!(page = "product", "page loaded");
        Ok(Self { session })
    }

    /// Navbar of this document
    #[must_use]
    pub const fn nav(&self) -> NavBar<'s, D> {
        NavBar::new(self.session)
    }

    /// Product name
    pub async fn name(&self) -> ProbeResult<String> {
        Ok(self.session.text_of(&NAME).await?.trim().to_string())
    }

    /// Price including tax
    pub async fn price(&self) -> ProbeResult<f64> {
        parse_price(&self.session.text_of(&PRICE).await?)
    }

    /// Description paragraph
    pub async fn description(&self) -> ProbeResult<String> {
        Ok(self.session.text_of(&DESCRIPTION).await?.trim().to_string())
    }

    /// Product id from the URL
    pub async fn product_id(&self) -> ProbeResult<Option<u32>> {
        let url = self.session.current_url().await?;
        Ok(UrlMatcher::new(PRODUCT_URL)
            .extract_params(&url)
            .get("id")
            .and_then(|id| id.parse().ok()))
    }

    /// Add to cart; waits for and accepts the confirmation alert
    ///
    /// # Errors
    ///
    /// `Timeout` if the site never confirms
    pub async fn add_to_cart(&self) -> ProbeResult<String> {
        tracing::info!("add to cart");
        self.session.click(&ADD_TO_CART).await?;
        self.session
            .alerts()
            .accept_expected(self.session.timeouts().action())
            .await
    }

    /// Go to the cart
    pub async fn go_to_cart(&self) -> ProbeResult<CartPage<'s, D>> {
        self.nav().click_cart().await
    }
}

impl<D: BrowserDriver> PageObject<D> for ProductPage<'_, D> {
    fn session(&self) -> &BrowserSession<D> {
        self.session
    }

    fn url_pattern(&self) -> &'static str {
        PRODUCT_URL
    }

    fn page_name(&self) -> &'static str {
        "product"
    }

    fn locators(&self) -> LocatorRegistry {
        LocatorRegistry::from_table(
            "product",
            &[
                ("name", NAME),
                ("price", PRICE),
                ("description", DESCRIPTION),
                ("add_to_cart", ADD_TO_CART),
            ],
        )
    }
}
