//! Blazeprobe: browser end-to-end suite for the DemoBlaze storefront
//!
//! Page objects wrap every screen of the store (home catalogue, product
//! detail, cart, and the login, sign-up, contact, about and place-order
//! modals). Journeys drive them through user flows and record each step in a
//! [`Reporter`]. The browser sits behind [`BrowserDriver`], implemented by an
//! in-memory storefront ([`mock::MockStore`]) and, with the `webdriver`
//! feature, a W3C WebDriver client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Journey     │──►│ Page objects │──►│ BrowserSession│──►│ BrowserDriver │
//! │ (flows)     │   │ (locators)   │   │ (waits,alerts)│   │ mock/webdriver│
//! └─────┬───────┘   └──────────────┘   └───────────────┘   └───────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │ Reporter    │──► report.html / report.json / junit.xml
//! └─────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use blazeprobe::mock::MockStore;
//! use blazeprobe::pages::HomePage;
//! use blazeprobe::SessionSettings;
//!
//! # async fn demo() -> blazeprobe::ProbeResult<()> {
//! let session = MockStore::new().session(SessionSettings::default());
//! let home = HomePage::open(&session).await?;
//! let product = home.click_product("Samsung galaxy s6").await?;
//! product.add_to_cart().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod config;
pub mod dialog;
pub mod driver;
pub mod fixtures;
#[allow(clippy::missing_errors_doc)]
pub mod journeys;
pub mod locator;
#[allow(clippy::missing_errors_doc, clippy::too_many_lines)]
pub mod mock;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod pages;
pub mod reporter;
pub mod result;
pub mod session;
pub mod wait;
#[cfg(feature = "webdriver")]
#[allow(clippy::missing_errors_doc)]
pub mod webdriver;

pub use config::{BrowserKind, ProbeConfig, WindowSize};
pub use dialog::Alerts;
pub use driver::{BrowserDriver, Screenshot};
pub use fixtures::{Credentials, OrderForm, SiteFixtures};
pub use journeys::{Journey, Suite, SuiteSummary};
pub use locator::{Locator, LocatorRegistry, Strategy, UrlMatcher};
pub use reporter::{FailureMode, Reporter, TestLog, TestStatus};
pub use result::{ProbeError, ProbeResult};
pub use session::{BrowserSession, SessionFactory, SessionSettings};
pub use wait::{Condition, Timeouts, Wait, WaitOptions};

#[cfg(feature = "webdriver")]
pub use webdriver::{WebDriverBackend, WebDriverFactory};
