//! Contact ("New message") modal.

use super::modal::ModalFrame;
use super::{HomePage, PageObject};
use crate::driver::BrowserDriver;
use crate::locator::LocatorRegistry;
use crate::result::ProbeResult;
use crate::session::BrowserSession;
use async_trait::async_trait;

/// Contact modal locators
#[allow(missing_docs)]
pub mod locators {
    use crate::locator::Locator;

    pub const MODAL: Locator = Locator::id("exampleModal");
    pub const TITLE: Locator = Locator::id("exampleModalLabel");
    pub const EMAIL: Locator = Locator::id("recipient-email");
    pub const NAME: Locator = Locator::id("recipient-name");
    pub const MESSAGE: Locator = Locator::id("message-text");
    pub const SEND_BUTTON: Locator = Locator::css("button[onclick='send()']");
    pub const CLOSE_BUTTON: Locator = Locator::css("#exampleModal .modal-footer .btn-secondary");
    pub const X_ICON: Locator = Locator::css("#exampleModal .close");
}

use locators::*;

const FRAME: ModalFrame = ModalFrame {
    name: "contact",
    root: MODAL,
    title: TITLE,
    close_button: CLOSE_BUTTON,
    x_icon: X_ICON,
};

/// The contact modal
#[derive(Debug)]
pub struct ContactModal<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> ContactModal<'s, D> {
    pub(crate) async fn opened(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        FRAME.wait_open(session).await?;
        Ok(Self { session })
    }

    /// Modal heading
    pub async fn get_modal_title(&self) -> ProbeResult<String> {
        FRAME.title(self.session).await
    }

    /// Type the contact e-mail
    pub async fn enter_email(self, email: &str) -> ProbeResult<Self> {
        self.session.type_into(&EMAIL, email).await?;
        Ok(self)
    }

    /// Type the contact name
    pub async fn enter_name(self, name: &str) -> ProbeResult<Self> {
        self.session.type_into(&NAME, name).await?;
        Ok(self)
    }

    /// Type the message body
    pub async fn enter_message(self, message: &str) -> ProbeResult<Self> {
        self.session.type_into(&MESSAGE, message).await?;
        Ok(self)
    }

    /// Send and accept the confirmation alert; returns its text
    ///
    /// # Errors
    ///
    /// `Timeout` if the site does not confirm
    pub async fn click_send(self) -> ProbeResult<String> {
        tracing::info!("send contact message");
        self.session.click(&SEND_BUTTON).await?;
        self.session
            .alerts()
            .accept_expected(self.session.timeouts().action())
            .await
    }

    /// Fill every field and send
    pub async fn send_message(self, email: &str, name: &str, message: &str) -> ProbeResult<String> {
        self.enter_email(email)
            .await?
            .enter_name(name)
            .await?
            .enter_message(message)
            .await?
            .click_send()
            .await
    }

    /// Whether the modal is shown
    pub async fn is_displayed(&self) -> bool {
        FRAME.is_displayed(self.session).await
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
}

#[async_trait]
impl<D: BrowserDriver> PageObject<D> for ContactModal<'_, D> {
    fn session(&self) -> &BrowserSession<D> {
        self.session
    }

    fn url_pattern(&self) -> &'static str {
        "/*"
    }

    fn page_name(&self) -> &'static str {
        "contact modal"
    }

    fn locators(&self) -> LocatorRegistry {
        LocatorRegistry::from_table(
            "contact",
            &[
                ("modal", MODAL),
                ("title", TITLE),
                ("email", EMAIL),
                ("name", NAME),
                ("message", MESSAGE),
                ("send_button", SEND_BUTTON),
                ("close_button", CLOSE_BUTTON),
                ("x_icon", X_ICON),
            ],
        )
    }

    async fn is_loaded(&self) -> bool {
        self.is_displayed().await
    }
}
