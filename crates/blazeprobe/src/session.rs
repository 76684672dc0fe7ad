//! Browser Session
//!
//! One live browser plus the settings every page object reads from it. Page
//! objects borrow the session; only [`BrowserSession::scoped`] (or the
//! suite runner) owns it, and both close the browser on every exit path.
//!
//! The element helpers here are the primitives page objects compose: each
//! action waits for clickability before acting, each query waits for
//! visibility before reading.

use crate::config::DEFAULT_BASE_URL;
use crate::dialog::Alerts;
use crate::driver::{BrowserDriver, Screenshot};
use crate::fixtures::SiteFixtures;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{ElementClickable, ElementVisible, Timeouts, Wait, WaitOptions};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Storefront root URL
    pub base_url: String,
    /// Wait budgets
    pub timeouts: Timeouts,
    /// Site literals
    pub fixtures: SiteFixtures,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: Timeouts::default(),
            fixtures: SiteFixtures::default(),
        }
    }
}

impl SessionSettings {
    /// Same settings with other timeouts
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Same settings with another base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// A live browser bound to the storefront
#[derive(Debug)]
pub struct BrowserSession<D: BrowserDriver> {
    driver: D,
    settings: SessionSettings,
    closed: AtomicBool,
}

impl<D: BrowserDriver> BrowserSession<D> {
    /// Wrap a connected driver
    #[must_use]
    pub fn new(driver: D, settings: SessionSettings) -> Self {
        Self {
            driver,
            settings,
            closed: AtomicBool::new(false),
        }
    }

    /// Run `body` against a fresh session and close it afterwards
    ///
    /// The driver is closed when the body returns, fails or panics; a panic
    /// is resumed once the browser is gone. A close failure is reported only
    /// when the body itself succeeded.
    ///
    /// ```ignore
    /// BrowserSession::scoped(driver, settings, |session| Box::pin(async move {
    ///     HomePage::open(session).await?.click_login_link().await?;
    ///     Ok(())
    /// })).await?;
    /// ```
    ///
    /// # Errors
    ///
    /// The body's error, or the close error when the body succeeded
    pub async fn scoped<T, F>(driver: D, settings: SessionSettings, body: F) -> ProbeResult<T>
    where
        F: for<'s> FnOnce(&'s BrowserSession<D>) -> BoxFuture<'s, ProbeResult<T>>,
    {
        let session = Self::new(driver, settings);
        let outcome = AssertUnwindSafe(async { body(&session).await })
            .catch_unwind()
            .await;
        let closed = session.close().await;

        match outcome {
            Ok(Ok(value)) => closed.map(|()| value),
            Ok(Err(err)) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "close failed after body error");
                }
                Err(err)
            }
            Err(panic) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "close failed after panic");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Session settings
    #[must_use]
    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Wait budgets
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.settings.timeouts
    }

    /// Site literals
    #[must_use]
    pub const fn fixtures(&self) -> &SiteFixtures {
        &self.settings.fixtures
    }

    /// Absolute URL for a site path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Navigate to a site path
    ///
    /// # Errors
    ///
    /// Returns `Navigation` if the driver rejects the URL
    pub async fn open(&self, path: &str) -> ProbeResult<()> {
        let url = self.url(path);
        tracing::info!(url = %url, "navigate");
        self.driver.navigate(&url).await.map_err(|e| match e {
            ProbeError::Driver { message } => ProbeError::Navigation { url, message },
            other => other,
        })
    }

    /// Current document URL
    ///
    /// # Errors
    ///
    /// Propagates driver errors
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Waiter with the action budget
    #[must_use]
    pub fn wait(&self) -> Wait<'_, D> {
        Wait::new(&self.driver, self.settings.timeouts.action())
    }

    /// Waiter with explicit options
    #[must_use]
    pub fn wait_with(&self, options: WaitOptions) -> Wait<'_, D> {
        Wait::new(&self.driver, options)
    }

    /// Waiter with the existence-probe budget
    #[must_use]
    pub fn probe(&self) -> Wait<'_, D> {
        Wait::new(&self.driver, self.settings.timeouts.probe())
    }

    /// Alert helper
    #[must_use]
    pub fn alerts(&self) -> Alerts<'_, D> {
        Alerts::new(self)
    }

    /// Wait until the element is visible and return it
    ///
    /// # Errors
    ///
    /// `Timeout` or a non-transient driver error
    pub async fn visible(&self, locator: &Locator) -> ProbeResult<D::Element> {
        self.wait().until(ElementVisible(locator.clone())).await
    }

    /// Wait until the element is clickable, then click it
    ///
    /// # Errors
    ///
    /// `Timeout` or a non-transient driver error
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let element = self.wait().until(ElementClickable(locator.clone())).await?;
        tracing::debug!(locator = %locator, "click");
        self.driver.click(&element).await
    }

    /// Wait until the input is clickable, clear it and type `text`
    ///
    /// # Errors
    ///
    /// `Timeout` or a non-transient driver error
    pub async fn type_into(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        let element = self.wait().until(ElementClickable(locator.clone())).await?;
        tracing::debug!(locator = %locator, chars = text.len(), "type");
        self.driver.clear(&element).await?;
        self.driver.send_keys(&element, text).await
    }

    /// Wait until the element is visible and read its text
    ///
    /// # Errors
    ///
    /// `Timeout` or a non-transient driver error
    pub async fn text_of(&self, locator: &Locator) -> ProbeResult<String> {
        let element = self.visible(locator).await?;
        self.driver.text(&element).await
    }

    /// Whether the element becomes visible within the probe budget
    ///
    /// Never fails: absence, a pending alert and driver errors all read as
    /// `false`.
    pub async fn is_visible(&self, locator: &Locator) -> bool {
        match self.probe().optional(ElementVisible(locator.clone())).await {
            Ok(found) => found.is_some(),
            Err(err) => {
                tracing::warn!(locator = %locator, error = %err, "visibility probe failed");
                false
            }
        }
    }

    /// Number of elements currently matching
    ///
    /// # Errors
    ///
    /// Propagates driver errors
    pub async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        Ok(self.driver.find_all(locator).await?.len())
    }

    /// Capture the viewport
    ///
    /// # Errors
    ///
    /// Propagates driver errors
    pub async fn screenshot(&self) -> ProbeResult<Screenshot> {
        self.driver.screenshot().await
    }

    /// Whether the session has been closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// End the browser session; later calls are no-ops
    ///
    /// # Errors
    ///
    /// Propagates the driver's close error
    pub async fn close(&self) -> ProbeResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!("closing browser session");
        self.driver.close().await
    }
}

impl<D: BrowserDriver> Drop for BrowserSession<D> {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            tracing::warn!("browser session dropped without close; the browser may be left running");
        }
    }
}

/// Creates one fresh session per journey
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Driver type of the sessions
    type Driver: BrowserDriver;

    /// Start a new browser session
    async fn create(&self) -> ProbeResult<BrowserSession<Self::Driver>>;

    /// Short description for logs and reports
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockNode};

    const BUTTON: Locator = Locator::id("btn");
    const INPUT: Locator = Locator::id("input");

    fn settings() -> SessionSettings {
        SessionSettings::default().with_timeouts(Timeouts::fast())
    }

    mod scoped_tests {
        use super::*;

        #[tokio::test]
        async fn test_closes_on_success() {
            let driver = MockDriver::new();
            let value = BrowserSession::scoped(driver.clone(), settings(), |_s| {
                Box::pin(async move { Ok(7) })
            })
            .await
            .unwrap();
            assert_eq!(value, 7);
            assert!(driver.is_closed());
        }

        #[tokio::test]
        async fn test_closes_on_error() {
            let driver = MockDriver::new();
            let result: ProbeResult<()> = BrowserSession::scoped(driver.clone(), settings(), |_s| {
                Box::pin(async move { Err(ProbeError::assertion("boom")) })
            })
            .await;
            assert!(matches!(result, Err(ProbeError::Assertion { .. })));
            assert!(driver.is_closed());
        }

        #[tokio::test]
        async fn test_closes_on_panic() {
            let driver = MockDriver::new();
            let inner = driver.clone();
            let handle = tokio::spawn(async move {
                let _: ProbeResult<()> = BrowserSession::scoped(inner, settings(), |_s| {
                    Box::pin(async move {
                        let explode = true;
                        if explode {
                            panic!("journey exploded");
                        }
                        Ok(())
                    })
                })
                .await;
            });
            assert!(handle.await.is_err());
            assert!(driver.is_closed());
            assert_eq!(driver.count_calls("close"), 1);
        }
    }

    mod helper_tests {
        use super::*;

        #[test]
        fn test_url_joining() {
            let session = BrowserSession::new(
                MockDriver::new(),
                settings().with_base_url("https://www.demoblaze.com/"),
            );
            assert_eq!(session.url("/cart.html"), "https://www.demoblaze.com/cart.html");
            assert_eq!(session.url("index.html"), "https://www.demoblaze.com/index.html");
            session.closed.store(true, Ordering::SeqCst);
        }

        #[tokio::test]
        async fn test_close_is_idempotent() {
            let driver = MockDriver::new();
            let session = BrowserSession::new(driver.clone(), settings());
            session.close().await.unwrap();
            session.close().await.unwrap();
            assert_eq!(driver.count_calls("close"), 1);
            assert!(session.is_closed());
        }

        #[tokio::test]
        async fn test_type_into_replaces_value() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let id = dom.insert(MockNode::new(INPUT));
                dom.set_value(id, "old");
            });
            let session = BrowserSession::new(driver.clone(), settings());
            session.type_into(&INPUT, "new").await.unwrap();
            assert_eq!(driver.with_dom(|dom| dom.value_of(&INPUT)), "new");
            session.close().await.unwrap();
        }

        #[tokio::test]
        async fn test_is_visible_never_fails() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let _ = dom.insert(MockNode::new(BUTTON));
            });
            let session = BrowserSession::new(driver.clone(), settings());
            assert!(session.is_visible(&BUTTON).await);
            assert!(!session.is_visible(&INPUT).await);
            driver.with_dom(|dom| dom.raise_alert("blocking"));
            assert!(!session.is_visible(&BUTTON).await);
            session.close().await.unwrap();
        }

        #[tokio::test]
        async fn test_click_waits_for_enabled() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let id = dom.insert(MockNode::new(BUTTON).hidden());
                dom.after(std::time::Duration::from_millis(30), move |d| d.set_displayed(id, true));
            });
            let session = BrowserSession::new(driver.clone(), settings());
            session.click(&BUTTON).await.unwrap();
            assert_eq!(driver.count_calls("click:"), 1);
            session.close().await.unwrap();
        }
    }
}
