//! Wait Mechanisms
//!
//! Bounded polling that turns "eventually true" DOM conditions into a
//! deterministic check. Every page object action synchronizes through
//! [`Wait::until`]; existence queries go through [`Wait::optional`], which is
//! the only place a timeout is turned into an absence result.
//!
//! Conditions are side-effect free: they only read driver state, so polling
//! them any number of times is safe.

use crate::driver::BrowserDriver;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (500ms, the WebDriver client convention)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Grace period for alerts that follow a form submission
pub const DEFAULT_ALERT_GRACE_MS: u64 = 2_000;

/// Budget for "is this displayed" probes
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1_000;

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Timeout policy shared by every page object of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Budget for actions and navigation waits
    pub default_ms: u64,
    /// Interval between polls
    pub poll_ms: u64,
    /// Budget for alert queries that may legitimately see no alert
    pub alert_grace_ms: u64,
    /// Budget for existence probes
    pub probe_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_ms: DEFAULT_POLL_INTERVAL_MS,
            alert_grace_ms: DEFAULT_ALERT_GRACE_MS,
            probe_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl Timeouts {
    /// Short budgets for in-memory drivers
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            default_ms: 2_000,
            poll_ms: 10,
            alert_grace_ms: 400,
            probe_ms: 200,
        }
    }

    /// Options for action waits
    #[must_use]
    pub const fn action(&self) -> WaitOptions {
        WaitOptions::new(self.default_ms, self.poll_ms)
    }

    /// Options for alert grace waits
    #[must_use]
    pub const fn alert(&self) -> WaitOptions {
        WaitOptions::new(self.alert_grace_ms, self.poll_ms)
    }

    /// Options for existence probes
    #[must_use]
    pub const fn probe(&self) -> WaitOptions {
        WaitOptions::new(self.probe_ms, self.poll_ms)
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Timeout and polling interval for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS)
    }
}

impl WaitOptions {
    /// Create wait options
    #[must_use]
    pub const fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT CONDITION TRAIT
// =============================================================================

/// A side-effect free predicate over browser state
///
/// `check` returns `Ok(None)` while the condition does not hold yet.
/// `ElementNotFound` and `StaleElement` errors are also read as "not yet";
/// every other error ends the wait.
#[async_trait]
pub trait Condition<D: BrowserDriver>: Send + Sync {
    /// Value produced once the condition holds
    type Output: Send;

    /// Poll the condition once
    async fn check(&self, driver: &D) -> ProbeResult<Option<Self::Output>>;

    /// Description used in timeout errors and logs
    fn description(&self) -> String;
}

// =============================================================================
// WAITER
// =============================================================================

/// Polling waiter bound to one driver
#[derive(Debug)]
pub struct Wait<'d, D: BrowserDriver> {
    driver: &'d D,
    options: WaitOptions,
}

impl<'d, D: BrowserDriver> Wait<'d, D> {
    /// Create a waiter
    #[must_use]
    pub const fn new(driver: &'d D, options: WaitOptions) -> Self {
        Self { driver, options }
    }

    /// Same waiter with another timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = timeout_ms;
        self
    }

    /// Active options
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll until the condition holds or the timeout elapses
    ///
    /// The condition is checked at least once, and once more at the deadline.
    ///
    /// # Errors
    ///
    /// `InvalidWait` for a zero timeout, `Timeout` when the budget runs out,
    /// or the first non-transient error the condition raises.
    pub async fn until<C: Condition<D>>(&self, condition: C) -> ProbeResult<C::Output> {
        if self.options.timeout_ms == 0 {
            return Err(ProbeError::InvalidWait {
                message: format!("zero timeout for {}", condition.description()),
            });
        }

        let timeout = self.options.timeout();
        let poll = self.options.poll_interval();
        let start = Instant::now();

        loop {
            match condition.check(self.driver).await {
                Ok(Some(value)) => {
                    tracing::debug!(
                        condition = %condition.description(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "wait satisfied"
                    );
                    return Ok(value);
                }
                Ok(None) => {}
                Err(err) if err.is_transient() => {}
                Err(err) => return Err(err),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                let waited_for = condition.description();
                tracing::debug!(condition = %waited_for, elapsed_ms = elapsed.as_millis() as u64, "wait timed out");
                return Err(ProbeError::Timeout {
                    waited_for,
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }
            tokio::time::sleep(poll.min(timeout - elapsed)).await;
        }
    }

    /// Like [`until`](Self::until) but a timeout yields `None`
    ///
    /// # Errors
    ///
    /// Any error other than `Timeout`.
    pub async fn optional<C: Condition<D>>(&self, condition: C) -> ProbeResult<Option<C::Output>> {
        match self.until(condition).await {
            Ok(value) => Ok(Some(value)),
            Err(ProbeError::Timeout { waited_for, .. }) => {
                tracing::debug!(condition = %waited_for, "absent within probe budget");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// At least one element matches
#[derive(Debug, Clone)]
pub struct ElementPresent(pub Locator);

/// An element matching the locator is displayed
#[derive(Debug, Clone)]
pub struct ElementVisible(pub Locator);

/// An element matching the locator is displayed and enabled
#[derive(Debug, Clone)]
pub struct ElementClickable(pub Locator);

/// Exactly `expected` elements match
#[derive(Debug, Clone)]
pub struct ElementCount {
    /// Locator to count
    pub locator: Locator,
    /// Expected count
    pub expected: usize,
}

/// Fewer than `bound` elements match
#[derive(Debug, Clone)]
pub struct ElementCountBelow {
    /// Locator to count
    pub locator: Locator,
    /// Exclusive upper bound
    pub bound: usize,
}

/// No element matching the locator is displayed (absent counts as invisible)
#[derive(Debug, Clone)]
pub struct ElementInvisible(pub Locator);

/// A previously located element left the document
#[derive(Debug, Clone)]
pub struct StalenessOf<E>(pub E);

/// A displayed element's text contains a fragment
#[derive(Debug, Clone)]
pub struct TextContains {
    /// Element to read
    pub locator: Locator,
    /// Fragment to look for
    pub fragment: String,
}

/// A native alert is pending; yields its text
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertPresent;

/// The current URL contains a fragment
#[derive(Debug, Clone)]
pub struct UrlContains(pub String);

/// Ad hoc condition from an async closure
pub struct PollFn<F> {
    description: String,
    func: F,
}

impl<F> std::fmt::Debug for PollFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollFn")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Build a condition from a closure returning a boxed future
///
/// ```ignore
/// wait.until(poll_fn("two cart rows", |d: &MockDriver| {
///     Box::pin(async move { Ok(Some(d.find_all(&ROWS).await?.len()).filter(|n| *n == 2)) })
/// }))
/// ```
pub fn poll_fn<D, T, F>(description: impl Into<String>, func: F) -> PollFn<F>
where
    D: BrowserDriver,
    F: for<'a> Fn(&'a D) -> BoxFuture<'a, ProbeResult<Option<T>>> + Send + Sync,
{
    PollFn {
        description: description.into(),
        func,
    }
}

async fn first_displayed<D: BrowserDriver>(
    driver: &D,
    locator: &Locator,
) -> ProbeResult<Option<D::Element>> {
    for element in driver.find_all(locator).await? {
        if driver.is_displayed(&element).await? {
            return Ok(Some(element));
        }
    }
    Ok(None)
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for ElementPresent {
    type Output = D::Element;

    async fn check(&self, driver: &D) -> ProbeResult<Option<D::Element>> {
        Ok(driver.find_all(&self.0).await?.into_iter().next())
    }

    fn description(&self) -> String {
        format!("presence of {}", self.0)
    }
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for ElementVisible {
    type Output = D::Element;

    async fn check(&self, driver: &D) -> ProbeResult<Option<D::Element>> {
        first_displayed(driver, &self.0).await
    }

    fn description(&self) -> String {
        format!("visibility of {}", self.0)
    }
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for ElementClickable {
    type Output = D::Element;

    // Obscuring overlays are not detectable through the driver boundary; a
    // click on an obscured element surfaces as NotInteractable instead.
    async fn check(&self, driver: &D) -> ProbeResult<Option<D::Element>> {
        match first_displayed(driver, &self.0).await? {
            Some(element) if driver.is_enabled(&element).await? => Ok(Some(element)),
            _ => Ok(None),
        }
    }

    fn description(&self) -> String {
        format!("{} to be clickable", self.0)
    }
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for ElementCount {
    type Output = usize;

    async fn check(&self, driver: &D) -> ProbeResult<Option<usize>> {
        let count = driver.find_all(&self.locator).await?.len();
        Ok((count == self.expected).then_some(count))
    }

    fn description(&self) -> String {
        format!("count of {} to equal {}", self.locator, self.expected)
    }
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for ElementCountBelow {
    type Output = usize;

    async fn check(&self, driver: &D) -> ProbeResult<Option<usize>> {
        let count = driver.find_all(&self.locator).await?.len();
        Ok((count < self.bound).then_some(count))
    }

    fn description(&self) -> String {
        format!("count of {} to drop below {}", self.locator, self.bound)
    }
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for ElementInvisible {
    type Output = ();

    async fn check(&self, driver: &D) -> ProbeResult<Option<()>> {
        for element in driver.find_all(&self.0).await? {
            match driver.is_displayed(&element).await {
                Ok(true) => return Ok(None),
                Ok(false) | Err(ProbeError::StaleElement { .. }) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(Some(()))
    }

    fn description(&self) -> String {
        format!("invisibility of {}", self.0)
    }
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for StalenessOf<D::Element> {
    type Output = ();

    async fn check(&self, driver: &D) -> ProbeResult<Option<()>> {
        match driver.is_enabled(&self.0).await {
            Err(ProbeError::StaleElement { .. }) => Ok(Some(())),
            Ok(_) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn description(&self) -> String {
        format!("staleness of {:?}", self.0)
    }
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for TextContains {
    type Output = String;

    async fn check(&self, driver: &D) -> ProbeResult<Option<String>> {
        match first_displayed(driver, &self.locator).await? {
            Some(element) => {
                let text = driver.text(&element).await?;
                Ok(text.contains(&self.fragment).then_some(text))
            }
            None => Ok(None),
        }
    }

    fn description(&self) -> String {
        format!("text of {} to contain {:?}", self.locator, self.fragment)
    }
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for AlertPresent {
    type Output = String;

    async fn check(&self, driver: &D) -> ProbeResult<Option<String>> {
        match driver.alert_text().await {
            Ok(text) => Ok(Some(text)),
            Err(ProbeError::NoAlertPresent) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn description(&self) -> String {
        "alert to be present".to_string()
    }
}

#[async_trait]
impl<D: BrowserDriver> Condition<D> for UrlContains {
    type Output = String;

    async fn check(&self, driver: &D) -> ProbeResult<Option<String>> {
        let url = driver.current_url().await?;
        Ok(url.contains(&self.0).then_some(url))
    }

    fn description(&self) -> String {
        format!("URL to contain {:?}", self.0)
    }
}

#[async_trait]
impl<D, T, F> Condition<D> for PollFn<F>
where
    D: BrowserDriver,
    T: Send,
    F: for<'a> Fn(&'a D) -> BoxFuture<'a, ProbeResult<Option<T>>> + Send + Sync,
{
    type Output = T;

    async fn check(&self, driver: &D) -> ProbeResult<Option<T>> {
        (self.func)(driver).await
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockNode};

    const ITEM: Locator = Locator::css(".item");
    const MODAL: Locator = Locator::id("modal");

    fn fast() -> WaitOptions {
        WaitOptions::new(300, 10)
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_wait_options_default() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_wait_options_builders() {
            let opts = WaitOptions::default()
                .with_timeout(5000)
                .with_poll_interval(100);
            assert_eq!(opts.timeout(), Duration::from_secs(5));
            assert_eq!(opts.poll_interval(), Duration::from_millis(100));
        }

        #[test]
        fn test_timeouts_derive_options() {
            let t = Timeouts::default();
            assert_eq!(t.action().timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(t.alert().timeout_ms, DEFAULT_ALERT_GRACE_MS);
            assert_eq!(t.probe().timeout_ms, DEFAULT_PROBE_TIMEOUT_MS);
            assert!(Timeouts::fast().default_ms < t.default_ms);
        }
    }

    mod until_tests {
        use super::*;

        #[tokio::test]
        async fn test_zero_timeout_rejected() {
            let driver = MockDriver::new();
            let err = Wait::new(&driver, WaitOptions::new(0, 10))
                .until(ElementPresent(ITEM))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::InvalidWait { .. }));
        }

        #[tokio::test]
        async fn test_timeout_carries_description() {
            let driver = MockDriver::new();
            let err = Wait::new(&driver, fast())
                .until(ElementVisible(MODAL))
                .await
                .unwrap_err();
            match err {
                ProbeError::Timeout {
                    waited_for,
                    elapsed_ms,
                } => {
                    assert!(waited_for.contains("id=modal"));
                    assert!(elapsed_ms >= 300);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_waits_for_delayed_element() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                dom.after(Duration::from_millis(50), |d| {
                    let _ = d.insert(MockNode::new(MODAL));
                });
            });
            let started = Instant::now();
            Wait::new(&driver, fast())
                .until(ElementVisible(MODAL))
                .await
                .unwrap();
            assert!(started.elapsed() >= Duration::from_millis(50));
        }

        #[tokio::test]
        async fn test_alert_aborts_element_wait() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| dom.raise_alert("Wrong password."));
            let started = Instant::now();
            let err = Wait::new(&driver, WaitOptions::new(5_000, 10))
                .until(ElementVisible(MODAL))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::UnexpectedAlert { .. }));
            assert!(started.elapsed() < Duration::from_secs(1));
        }

        #[tokio::test]
        async fn test_optional_maps_timeout_to_none() {
            let driver = MockDriver::new();
            let found = Wait::new(&driver, fast())
                .optional(ElementVisible(MODAL))
                .await
                .unwrap();
            assert!(found.is_none());
        }

        #[tokio::test]
        async fn test_optional_keeps_other_errors() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| dom.raise_alert("x"));
            let result = Wait::new(&driver, fast()).optional(ElementVisible(MODAL)).await;
            assert!(matches!(result, Err(ProbeError::UnexpectedAlert { .. })));
        }
    }

    mod condition_tests {
        use super::*;

        #[tokio::test]
        async fn test_hidden_element_is_not_visible_but_present() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let _ = dom.insert(MockNode::new(MODAL).hidden());
            });
            let wait = Wait::new(&driver, fast());
            assert!(wait.optional(ElementPresent(MODAL)).await.unwrap().is_some());
            assert!(wait.optional(ElementVisible(MODAL)).await.unwrap().is_none());
            wait.until(ElementInvisible(MODAL)).await.unwrap();
        }

        #[tokio::test]
        async fn test_disabled_element_not_clickable() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let _ = dom.insert(MockNode::new(MODAL).disabled());
            });
            let wait = Wait::new(&driver, fast());
            assert!(wait.optional(ElementClickable(MODAL)).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_count_conditions() {
            let driver = MockDriver::new();
            let ids: Vec<_> = driver.with_dom(|dom| {
                (0..3).map(|_| dom.insert(MockNode::new(ITEM))).collect()
            });
            let wait = Wait::new(&driver, fast());
            assert_eq!(
                wait.until(ElementCount {
                    locator: ITEM,
                    expected: 3
                })
                .await
                .unwrap(),
                3
            );
            driver.with_dom(|dom| {
                dom.after(Duration::from_millis(30), move |d| d.detach(ids[0]));
            });
            assert_eq!(
                wait.until(ElementCountBelow {
                    locator: ITEM,
                    bound: 3
                })
                .await
                .unwrap(),
                2
            );
        }

        #[tokio::test]
        async fn test_staleness_of_detached_element() {
            let driver = MockDriver::new();
            let id = driver.with_dom(|dom| dom.insert(MockNode::new(ITEM)));
            let element = driver.find(&ITEM).await.unwrap();
            let wait = Wait::new(&driver, fast());
            assert!(wait
                .optional(StalenessOf(element))
                .await
                .unwrap()
                .is_none());
            driver.with_dom(|dom| dom.detach(id));
            wait.until(StalenessOf(element)).await.unwrap();
        }

        #[tokio::test]
        async fn test_alert_present_yields_text() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                dom.after(Duration::from_millis(20), |d| d.raise_alert("Product added."));
            });
            let text = Wait::new(&driver, fast()).until(AlertPresent).await.unwrap();
            assert_eq!(text, "Product added.");
        }

        #[tokio::test]
        async fn test_text_and_url_conditions() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                dom.navigate("https://www.demoblaze.com/cart.html");
                let _ = dom.insert(MockNode::new(MODAL).text("Welcome jane"));
            });
            let wait = Wait::new(&driver, fast());
            let text = wait
                .until(TextContains {
                    locator: MODAL,
                    fragment: "jane".into(),
                })
                .await
                .unwrap();
            assert_eq!(text, "Welcome jane");
            let url = wait.until(UrlContains("cart.html".into())).await.unwrap();
            assert!(url.ends_with("/cart.html"));
        }

        #[tokio::test]
        async fn test_poll_fn_condition() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let _ = dom.insert(MockNode::new(ITEM));
                let _ = dom.insert(MockNode::new(ITEM));
            });
            let count = Wait::new(&driver, fast())
                .until(poll_fn("two items", |d: &MockDriver| {
                    Box::pin(async move {
                        let n = d.find_all(&ITEM).await?.len();
                        Ok::<_, ProbeError>((n == 2).then_some(n))
                    })
                }))
                .await
                .unwrap();
            assert_eq!(count, 2);
        }
    }
}
