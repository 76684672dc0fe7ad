//! BrowserDriver - the boundary to the browser
//!
//! Everything the page objects need from a browser goes through this trait:
//! navigation, element lookup, element operations, native alerts and
//! screenshots. Implementations decide how to talk to the browser; the rest
//! of the crate only depends on the error classification documented on each
//! method.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  BrowserDriver (async trait)                                  │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────┐   ┌──────────────────────────┐  │
//! │  │ WebDriverBackend         │   │ MockDriver               │  │
//! │  │ (feature "webdriver")    │   │ (always available)       │  │
//! │  │ fantoccini -> W3C driver │   │ in-memory DOM + handlers │  │
//! │  └──────────────────────────┘   └──────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use crate::locator::Locator;
use crate::result::ProbeResult;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::SystemTime;

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot carries data
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Abstract driver trait for browser automation
///
/// Error contract every implementation honours:
///
/// - a lookup with no match fails with `ElementNotFound`
/// - an operation on a detached element fails with `StaleElement`
/// - any document or element query while a native alert is pending fails
///   with `UnexpectedAlert` (never blocks)
/// - alert operations with no alert pending fail with `NoAlertPresent`
/// - clicking or typing into a hidden or disabled element fails with
///   `NotInteractable`
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Handle to a located element
    type Element: Clone + Debug + Send + Sync;

    /// Navigate to an absolute URL
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Current document URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// First element matching the locator
    async fn find(&self, locator: &Locator) -> ProbeResult<Self::Element>;

    /// All elements matching the locator, in document order (may be empty)
    async fn find_all(&self, locator: &Locator) -> ProbeResult<Vec<Self::Element>>;

    /// All descendants of `parent` matching the locator
    async fn find_all_in(
        &self,
        parent: &Self::Element,
        locator: &Locator,
    ) -> ProbeResult<Vec<Self::Element>>;

    /// First descendant of `parent` matching the locator
    async fn find_in(
        &self,
        parent: &Self::Element,
        locator: &Locator,
    ) -> ProbeResult<Self::Element> {
        self.find_all_in(parent, locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| crate::result::ProbeError::ElementNotFound {
                locator: format!("{locator} (within {parent:?})"),
            })
    }

    /// Click an element
    async fn click(&self, element: &Self::Element) -> ProbeResult<()>;

    /// Clear an input
    async fn clear(&self, element: &Self::Element) -> ProbeResult<()>;

    /// Type text into an input
    async fn send_keys(&self, element: &Self::Element, text: &str) -> ProbeResult<()>;

    /// Visible text of an element
    async fn text(&self, element: &Self::Element) -> ProbeResult<String>;

    /// Attribute or property value of an element
    async fn attribute(&self, element: &Self::Element, name: &str)
        -> ProbeResult<Option<String>>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self, element: &Self::Element) -> ProbeResult<bool>;

    /// Whether the element accepts input
    async fn is_enabled(&self, element: &Self::Element) -> ProbeResult<bool>;

    /// Text of the pending alert
    async fn alert_text(&self) -> ProbeResult<String>;

    /// Accept the pending alert
    async fn accept_alert(&self) -> ProbeResult<()>;

    /// Dismiss the pending alert
    async fn dismiss_alert(&self) -> ProbeResult<()>;

    /// Execute a script in the page and return its JSON result
    async fn execute(&self, script: &str) -> ProbeResult<serde_json::Value>;

    /// Capture the viewport as PNG
    async fn screenshot(&self) -> ProbeResult<Screenshot>;

    /// End the browser session
    async fn close(&self) -> ProbeResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod screenshot_tests {
        use super::*;

        #[test]
        fn test_screenshot_creation() {
            let data = vec![0x89, 0x50, 0x4E, 0x47];
            let screenshot = Screenshot::new(data.clone());
            assert_eq!(screenshot.data, data);
            assert_eq!(screenshot.size_bytes(), 4);
            assert!(screenshot.is_valid());
        }

        #[test]
        fn test_empty_screenshot_is_invalid() {
            assert!(!Screenshot::new(Vec::new()).is_valid());
        }
    }
}
