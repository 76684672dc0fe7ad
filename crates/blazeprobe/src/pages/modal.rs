//! Bootstrap modal frame shared by the storefront's dialogs.

use crate::driver::BrowserDriver;
use crate::locator::Locator;
use crate::result::ProbeResult;
use crate::session::BrowserSession;
use crate::wait::{ElementInvisible, ElementVisible};

/// Root, heading and dismiss controls of one modal
#[derive(Debug, Clone)]
pub(crate) struct ModalFrame {
    pub name: &'static str,
    pub root: Locator,
    pub title: Locator,
    pub close_button: Locator,
    pub x_icon: Locator,
}

impl ModalFrame {
    /// Wait for the fade-in to finish
    pub async fn wait_open<D: BrowserDriver>(&self, session: &BrowserSession<D>) -> ProbeResult<()> {
        session.wait().until(ElementVisible(self.root.clone())).await?;
        tracing::info!(modal = self.name, "modal open");
        Ok(())
    }

    /// Wait for the fade-out to finish
    pub async fn wait_closed<D: BrowserDriver>(&self, session: &BrowserSession<D>) -> ProbeResult<()> {
        session.wait().until(ElementInvisible(self.root.clone())).await?;
        tracing::info!(modal = self.name, "modal closed");
        Ok(())
    }

    pub async fn title<D: BrowserDriver>(&self, session: &BrowserSession<D>) -> ProbeResult<String> {
        Ok(session.text_of(&self.title).await?.trim().to_string())
    }

    pub async fn is_displayed<D: BrowserDriver>(&self, session: &BrowserSession<D>) -> bool {
        session.is_visible(&self.root).await
    }

    /// Click the footer Close button and wait for the fade-out
    pub async fn close<D: BrowserDriver>(&self, session: &BrowserSession<D>) -> ProbeResult<()> {
        session.click(&self.close_button).await?;
        self.wait_closed(session).await
    }

    /// Click the header X and wait for the fade-out
    pub async fn dismiss<D: BrowserDriver>(&self, session: &BrowserSession<D>) -> ProbeResult<()> {
        session.click(&self.x_icon).await?;
        self.wait_closed(session).await
    }
}
