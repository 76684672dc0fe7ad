//! Native alert handling.
//!
//! The storefront reports validation and success through `window.alert`.
//! While an alert is open every document query fails with
//! `UnexpectedAlert`, so flows that may produce one must drain it here.
//!
//! Two families of calls:
//!
//! - `*_within` / `*_if_present`: an absent alert is a normal outcome and
//!   yields `None` once the grace budget runs out. These never fail.
//! - [`Alerts::expect`]: the action must produce an alert; absence is a
//!   `Timeout`.

use crate::driver::BrowserDriver;
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;
use crate::wait::{AlertPresent, WaitOptions};

/// Alert helper bound to a session
#[derive(Debug)]
pub struct Alerts<'s, D: BrowserDriver> {
    session: &'s BrowserSession<D>,
}

impl<'s, D: BrowserDriver> Alerts<'s, D> {
    /// Create the helper
    #[must_use]
    pub const fn new(session: &'s BrowserSession<D>) -> Self {
        Self { session }
    }

    /// Text of an alert appearing within the session's grace budget
    pub async fn text(&self) -> Option<String> {
        self.text_within(self.session.timeouts().alert()).await
    }

    /// Text of an alert appearing within `options`, without handling it
    ///
    /// Returns `None` when no alert shows up in time. Returns within the
    /// budget and never fails.
    pub async fn text_within(&self, options: WaitOptions) -> Option<String> {
        match self.session.wait_with(options).optional(AlertPresent).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "alert probe failed; treating as absent");
                None
            }
        }
    }

    /// Accept an alert if one appears within the grace budget
    ///
    /// Returns the accepted text; a no-op when there is none.
    pub async fn accept_if_present(&self) -> Option<String> {
        let text = self.text().await?;
        match self.session.driver().accept_alert().await {
            Ok(()) => {
                tracing::info!(alert = %text, "accepted alert");
                Some(text)
            }
            Err(ProbeError::NoAlertPresent) => None,
            Err(err) => {
                tracing::warn!(error = %err, "accepting alert failed");
                None
            }
        }
    }

    /// Dismiss an alert if one appears within the grace budget
    pub async fn dismiss_if_present(&self) -> Option<String> {
        let text = self.text().await?;
        match self.session.driver().dismiss_alert().await {
            Ok(()) => {
                tracing::info!(alert = %text, "dismissed alert");
                Some(text)
            }
            Err(ProbeError::NoAlertPresent) => None,
            Err(err) => {
                tracing::warn!(error = %err, "dismissing alert failed");
                None
            }
        }
    }

    /// Wait for an alert that must appear, returning its text
    ///
    /// # Errors
    ///
    /// `Timeout` if no alert appears in time
    pub async fn expect(&self, options: WaitOptions) -> ProbeResult<String> {
        self.session.wait_with(options).until(AlertPresent).await
    }

    /// Wait for an alert that must appear and accept it
    ///
    /// # Errors
    ///
    /// `Timeout` if no alert appears in time
    pub async fn accept_expected(&self, options: WaitOptions) -> ProbeResult<String> {
        let text = self.expect(options).await?;
        self.session.driver().accept_alert().await?;
        tracing::info!(alert = %text, "accepted expected alert");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use crate::session::SessionSettings;
    use crate::wait::Timeouts;
    use std::time::{Duration, Instant};

    fn session(driver: &MockDriver) -> BrowserSession<MockDriver> {
        BrowserSession::new(
            driver.clone(),
            SessionSettings::default().with_timeouts(Timeouts::fast()),
        )
    }

    #[tokio::test]
    async fn test_absent_alert_returns_none_within_grace() {
        let driver = MockDriver::new();
        let session = session(&driver);
        let started = Instant::now();
        assert!(session.alerts().text().await.is_none());
        let grace = Duration::from_millis(Timeouts::fast().alert_grace_ms);
        assert!(started.elapsed() >= grace);
        assert!(started.elapsed() < grace + Duration::from_millis(300));
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_text_does_not_consume_alert() {
        let driver = MockDriver::new();
        driver.with_dom(|dom| dom.raise_alert("Wrong password."));
        let session = session(&driver);
        assert_eq!(session.alerts().text().await.as_deref(), Some("Wrong password."));
        assert_eq!(driver.with_dom(|dom| dom.pending_alert().map(String::from)).as_deref(), Some("Wrong password."));
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_accept_if_present() {
        let driver = MockDriver::new();
        driver.with_dom(|dom| {
            dom.after(Duration::from_millis(20), |d| d.raise_alert("Sign up successful."));
        });
        let session = session(&driver);
        let alerts = session.alerts();
        assert_eq!(alerts.accept_if_present().await.as_deref(), Some("Sign up successful."));
        assert!(alerts.accept_if_present().await.is_none());
        assert_eq!(driver.count_calls("accept_alert:"), 1);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_dismiss_if_present() {
        let driver = MockDriver::new();
        driver.with_dom(|dom| dom.raise_alert("x"));
        let session = session(&driver);
        assert_eq!(session.alerts().dismiss_if_present().await.as_deref(), Some("x"));
        assert_eq!(driver.count_calls("dismiss_alert:"), 1);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_expect_times_out() {
        let driver = MockDriver::new();
        let session = session(&driver);
        let err = session
            .alerts()
            .expect(WaitOptions::new(50, 10))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_accept_expected() {
        let driver = MockDriver::new();
        driver.with_dom(|dom| dom.raise_alert("Product added."));
        let session = session(&driver);
        let text = session
            .alerts()
            .accept_expected(WaitOptions::new(200, 10))
            .await
            .unwrap();
        assert_eq!(text, "Product added.");
        assert!(driver.with_dom(|dom| dom.pending_alert().is_none()));
        session.close().await.unwrap();
    }
}
