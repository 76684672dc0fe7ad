//! About-us modal with the promo video.

use super::modal::ModalFrame;
use super::{HomePage, PageObject};
use crate::driver::BrowserDriver;
use crate::locator::LocatorRegistry;
use crate::result::ProbeResult;
use crate::session::BrowserSession;
use async_trait::async_trait;

/// About-us modal locators
#[allow(missing_docs)]
pub mod locators {
    use crate::locator::Locator;

    pub const MODAL: Locator = Locator::id("videoModal");
    pub const TITLE: Locator = Locator::id("videoModalLabel");
    pub const VIDEO: Locator = Locator::id("example-video");
    pub const CLOSE_BUTTON: Locator = Locator::css("#videoModal .modal-footer .btn-secondary");
    pub const X_ICON: Locator = Locator::css("#videoModal .close");
}

use locators::*;

const FRAME: ModalFrame = ModalFrame {
    name: "about-us",
    root: MODAL,
    title: TITLE,
    close_button: CLOSE_BUTTON,
    x_icon: X_ICON,
};

/// The "About us" modal
#[derive(Debug)]
pub struct AboutUsModal<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> AboutUsModal<'s, D> {
    pub(crate) async fn opened(session: &'s BrowserSession<D>) -> ProbeResult<Self> {
        FRAME.wait_open(session).await?;
        Ok(Self { session })
    }

    /// Modal heading
    pub async fn get_modal_title(&self) -> ProbeResult<String> {
        FRAME.title(self.session).await
    }

    /// Whether the video player is shown
    pub async fn is_video_displayed(&self) -> bool {
        self.session.is_visible(&VIDEO).await
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
impl<D: BrowserDriver> PageObject<D> for AboutUsModal<'_, D> {
    fn session(&self) -> &BrowserSession<D> {
        self.session
    }

    fn url_pattern(&self) -> &'static str {
        "/*"
    }

    fn page_name(&self) -> &'static str {
        "about-us modal"
    }

    fn locators(&self) -> LocatorRegistry {
        LocatorRegistry::from_table(
            "about_us",
            &[
                ("modal", MODAL),
                ("title", TITLE),
                ("video", VIDEO),
                ("close_button", CLOSE_BUTTON),
                ("x_icon", X_ICON),
            ],
        )
    }

    async fn is_loaded(&self) -> bool {
        self.is_displayed().await
    }
}
