//! Result and error types for blazeprobe.

use thiserror::Error;

/// Result type for blazeprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors raised by the driver boundary, the wait helper and the page objects
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A wait condition never held within its budget
    #[error("Timed out after {elapsed_ms}ms waiting for {waited_for}")]
    Timeout {
        /// Description of the condition
        waited_for: String,
        /// Time spent polling
        elapsed_ms: u64,
    },

    /// No element matched the locator in the current document
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Rendered locator
        locator: String,
    },

    /// A previously found element is no longer attached to the document
    #[error("Stale element reference: {element}")]
    StaleElement {
        /// Element description
        element: String,
    },

    /// An alert was queried but none is pending
    #[error("No alert present")]
    NoAlertPresent,

    /// The document was queried while a native alert blocks it
    #[error("Unexpected alert open: {text}")]
    UnexpectedAlert {
        /// Text of the pending alert
        text: String,
    },

    /// The element exists but cannot receive input (hidden or disabled)
    #[error("Element not interactable: {element}")]
    NotInteractable {
        /// Element description
        element: String,
    },

    /// Wait parameters rejected before polling
    #[error("Invalid wait: {message}")]
    InvalidWait {
        /// Error message
        message: String,
    },

    /// Operation called on a page state that does not allow it
    #[error("Precondition failed: {message}")]
    Precondition {
        /// Error message
        message: String,
    },

    /// Displayed price text carries no parseable number
    #[error("Cannot parse price from {raw:?}")]
    PriceFormat {
        /// Raw text as displayed
        raw: String,
    },

    /// The browser is not on the page a page object expects
    #[error("Expected {expected} but browser is at {actual}")]
    UnexpectedPage {
        /// Expected page or URL pattern
        expected: String,
        /// Current URL
        actual: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL
        url: String,
        /// Error message
        message: String,
    },

    /// Driver-level failure not covered by a more specific variant
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A journey assertion failed
    #[error("Assertion failed: {message}")]
    Assertion {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a precondition error
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for a wait that ran out of budget
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Errors a polling wait treats as "not yet" rather than fatal
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::StaleElement { .. } | Self::NotInteractable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_condition() {
        let err = ProbeError::Timeout {
            waited_for: "element #logInModal visible".to_string(),
            elapsed_ms: 2000,
        };
        let msg = err.to_string();
        assert!(msg.contains("#logInModal"));
        assert!(msg.contains("2000ms"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_transient_classification() {
        assert!(ProbeError::StaleElement {
            element: "a".into()
        }
        .is_transient());
        assert!(ProbeError::ElementNotFound {
            locator: "css=a".into()
        }
        .is_transient());
        assert!(!ProbeError::UnexpectedAlert { text: "x".into() }.is_transient());
        assert!(!ProbeError::NoAlertPresent.is_transient());
    }

    #[test]
    fn test_unexpected_alert_is_distinguishable() {
        let err = ProbeError::UnexpectedAlert {
            text: "Please fill out Username and Password.".into(),
        };
        assert!(matches!(err, ProbeError::UnexpectedAlert { .. }));
        assert!(err.to_string().contains("fill out"));
    }
}
