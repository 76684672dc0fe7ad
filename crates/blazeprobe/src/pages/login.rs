//! Login modal.
//!
//! ```text
//! Closed ──open──▶ Open ──close / X──▶ Closed
//!                   │
//!                   └──click_login──▶ Submitted ──▶ alert | still Open | Closed (logged in)
//! ```
//!
//! The modal does not interpret the outcome of a submission; callers branch
//! on [`LoginModal::get_alert_text`] and [`LoginModal::is_displayed`].

use super::modal::ModalFrame;
use super::{HomePage, PageObject};
use crate::driver::BrowserDriver;
use crate::fixtures::Credentials;
use crate::locator::LocatorRegistry;
use crate::result::ProbeResult;
use crate::session::BrowserSession;
use async_trait::async_trait;

/// Login modal locators
#[allow(missing_docs)]
pub mod locators {
    use crate::locator::Locator;

    pub const MODAL: Locator = Locator::id("logInModal");
    pub const TITLE: Locator = Locator::id("logInModalLabel");
    pub const USERNAME: Locator = Locator::id("loginusername");
    pub const PASSWORD: Locator = Locator::id("loginpassword");
    pub const LOGIN_BUTTON: Locator = Locator::css("button[onclick='logIn()']");
    pub const CLOSE_BUTTON: Locator = Locator::css("#logInModal .modal-footer .btn-secondary");
    pub const X_ICON: Locator = Locator::css("#logInModal .close");
}

use locators::*;

const FRAME: ModalFrame = ModalFrame {
    name: "login",
    root: MODAL,
    title: TITLE,
    close_button: CLOSE_BUTTON,
    x_icon: X_ICON,
};

/// The "Log in" modal
#[derive(Debug)]
pub struct LoginModal<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> LoginModal<'s, D> {
    pub(crate) async fn opened(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        FRAME.wait_open(session).await?;
        Ok(Self { session })
    }

    /// Modal heading
    pub async fn get_modal_title(&self) -> ProbeResult<String> {
        FRAME.title(self.session).await
    }

    /// Type the username
    pub async fn enter_username(self, username: &str) -> ProbeResult<Self> {
        self.session.type_into(&USERNAME, username).await?;
        Ok(self)
    }

    /// Type the password
    pub async fn enter_password(self, password: &str) -> ProbeResult<Self> {
        self.session.type_into(&PASSWORD, password).await?;
        Ok(self)
    }

    /// Submit the form
    pub async fn click_login(self) -> ProbeResult<Self> {
        tracing::info!("submit login");
        self.session.click(&LOGIN_BUTTON).await?;
        Ok(self)
    }

    /// Fill both fields and submit
    pub async fn login(self, credentials: &Credentials) -> ProbeResult<Self> {
        self.enter_username(&credentials.username)
            .await?
            .enter_password(&credentials.password)
            .await?
            .click_login()
            .await
    }

    /// Log in and wait for the greeting naming the user
    pub async fn login_and_wait(self, credentials: &Credentials) -> ProbeResult<HomePage<'s, D>> {
        let session = self.session;
        self.login(credentials).await?;
        FRAME.wait_closed(session).await?;
        let home = HomePage::wait_loaded(session).await?;
        home.nav().wait_for_user(&credentials.username).await?;
        Ok(home)
    }

    /// Close with the footer button
    pub async fn click_close(self) -> ProbeResult<HomePage<'s, D>> {
        FRAME.close(self.session).await?;
        HomePage::wait_loaded(self.session).await
    }

    /// Close with the header X
    pub async fn click_x(self) -> ProbeResult<HomePage<'s, D>> {
        FRAME.dismiss(self.session).await?;
        HomePage::wait_loaded(self.session).await
    }

    /// Whether the modal is shown
    pub async fn is_displayed(&self) -> bool {
        FRAME.is_displayed(self.session).await
    }

    /// Wait for the modal to fade out
    pub async fn wait_until_closed(&self) -> ProbeResult<()> {
        FRAME.wait_closed(self.session).await
    }

    /// Whether the username input is shown
    pub async fn is_username_field_displayed(&self) -> bool {
        self.session.is_visible(&USERNAME).await
    }

    /// Whether the password input is shown
    pub async fn is_password_field_displayed(&self) -> bool {
        self.session.is_visible(&PASSWORD).await
    }

    /// Whether the submit button is shown
    pub async fn is_login_button_displayed(&self) -> bool {
        self.session.is_visible(&LOGIN_BUTTON).await
    }

    /// Whether the footer Close button is shown
    pub async fn is_close_button_displayed(&self) -> bool {
        self.session.is_visible(&CLOSE_BUTTON).await
    }

    /// Whether the header X is shown
    pub async fn is_x_icon_displayed(&self) -> bool {
        self.session.is_visible(&X_ICON).await
    }

    /// Text of an alert raised by the submission, if one appears in time
    pub async fn get_alert_text(&self) -> Option<String> {
        self.session.alerts().text().await
    }

    /// Accept a pending alert; a no-op when there is none
    pub async fn accept_alert(&self) -> Option<String> {
        self.session.alerts().accept_if_present().await
    }
}

#[async_trait]
impl<D: BrowserDriver> PageObject<D> for LoginModal<'_, D> {
    fn session(&self) -> &BrowserSession<D> {
        self.session
    }

    fn url_pattern(&self) -> &'static str {
        "/*"
    }

    fn page_name(&self) -> &'static str {
        "login modal"
    }

    fn locators(&self) -> LocatorRegistry {
        LocatorRegistry::from_table(
            "login",
            &[
                ("modal", MODAL),
                ("title", TITLE),
                ("username", USERNAME),
                ("password", PASSWORD),
                ("login_button", LOGIN_BUTTON),
                ("close_button", CLOSE_BUTTON),
                ("x_icon", X_ICON),
            ],
        )
    }

    async fn is_loaded(&self) -> bool {
        self.is_displayed().await
    }
}
