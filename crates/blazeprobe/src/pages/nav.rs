//! Navbar shared by every storefront document.

use super::{AboutUsModal, CartPage, ContactModal, HomePage, LoginModal, SignUpModal};
use crate::driver::BrowserDriver;
use crate::locator::{Locator, LocatorRegistry};
use crate::result::ProbeResult;
use crate::session::BrowserSession;
use crate::wait::{ElementInvisible, ElementVisible, TextContains};

/// Navbar locators
#[allow(missing_docs)]
pub mod locators {
    use crate::locator::Locator;

    pub const HOME_LINK: Locator = Locator::css("a.nav-link[href='index.html']");
    pub const CONTACT_LINK: Locator = Locator::css("a[data-target='#exampleModal']");
    pub const ABOUT_LINK: Locator = Locator::css("a[data-target='#videoModal']");
    pub const CART_LINK: Locator = Locator::id("cartur");
    pub const LOGIN_LINK: Locator = Locator::id("login2");
    pub const LOGOUT_LINK: Locator = Locator::id("logout2");
    pub const SIGN_UP_LINK: Locator = Locator::id("signin2");
    pub const WELCOME: Locator = Locator::id("nameofuser");
}

use locators::*;

/// The header navbar
#[derive(Debug)]
pub struct NavBar<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> NavBar<'s, D> {
    /// Bind to the navbar of the current document
    #[must_use]
    pub const fn new(session: &'s BrowserSession<D>) -> Self {
        Self { session }
    }

    /// Locator table
    #[must_use]
    pub fn registry() -> LocatorRegistry {
        LocatorRegistry::from_table(
            "navbar",
            &[
                ("home", HOME_LINK),
                ("contact", CONTACT_LINK),
                ("about_us", ABOUT_LINK),
                ("cart", CART_LINK),
                ("log_in", LOGIN_LINK),
                ("log_out", LOGOUT_LINK),
                ("sign_up", SIGN_UP_LINK),
                ("welcome", WELCOME),
            ],
        )
    }

    /// Go to the home page
    pub async fn click_home(&self) -> ProbeResult<HomePage<'s, D>> {
        self.session.click(&HOME_LINK).await?;
        HomePage::wait_loaded(self.session).await
    }

    /// Open the contact modal
    pub async fn click_contact(&self) -> ProbeResult<ContactModal<'s, D>> {
        self.session.click(&CONTACT_LINK).await?;
        ContactModal::opened(self.session).await
    }

    /// Open the about-us modal
    pub async fn click_about_us(&self) -> ProbeResult<AboutUsModal<'s, D>> {
        self.session.click(&ABOUT_LINK).await?;
        AboutUsModal::opened(self.session).await
    }

    /// Go to the cart
    pub async fn click_cart(&self) -> ProbeResult<CartPage<'s, D>> {
        self.session.click(&CART_LINK).await?;
        CartPage::wait_loaded(self.session).await
    }

    /// Open the login modal
    pub async fn click_login(&self) -> ProbeResult<LoginModal<'s, D>> {
        self.session.click(&LOGIN_LINK).await?;
        LoginModal::opened(self.session).await
    }

    /// Open the sign-up modal
    pub async fn click_sign_up(&self) -> ProbeResult<SignUpModal<'s, D>> {
        self.session.click(&SIGN_UP_LINK).await?;
        SignUpModal::opened(self.session).await
    }

    /// Log out and wait for the anonymous navbar
    pub async fn click_logout(&self) -> ProbeResult<HomePage<'s, D>> {
        self.session.click(&LOGOUT_LINK).await?;
        self.session.wait().until(ElementVisible(LOGIN_LINK)).await?;
        self.session.wait().until(ElementInvisible(WELCOME)).await?;
        HomePage::wait_loaded(self.session).await
    }

    /// Greeting text ("Welcome jane"), if someone is logged in
    pub async fn welcome_text(&self) -> Option<String> {
        if !self.session.is_visible(&WELCOME).await {
            return None;
        }
        match self.session.text_of(&WELCOME).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "welcome text unreadable");
                None
            }
        }
    }

    /// Whether the greeting is shown
    pub async fn is_logged_in(&self) -> bool {
        self.welcome_text().await.is_some()
    }

    /// Wait until the greeting names `username`
    pub async fn wait_for_user(&self, username: &str) -> ProbeResult<String> {
        let fragment = format!("{} {username}", self.session.fixtures().welcome_prefix);
        self.session
            .wait()
            .until(TextContains {
                locator: WELCOME,
                fragment,
            })
            .await
    }

    /// Whether a navbar link is shown
    pub async fn is_link_displayed(&self, locator: &Locator) -> bool {
        self.session.is_visible(locator).await
    }
}
