//! W3C WebDriver backend (requires the `webdriver` feature).
//!
//! Talks to a running chromedriver or geckodriver through `fantoccini`.
//! Every protocol failure is folded into the [`ProbeError`] taxonomy so that
//! page objects and waits behave the same as against the in-memory mock.

use crate::config::{BrowserKind, ProbeConfig};
use crate::driver::{BrowserDriver, Screenshot};
use crate::locator::{Locator, Strategy};
use crate::result::{ProbeError, ProbeResult};
use crate::session::{BrowserSession, SessionFactory, SessionSettings};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};

/// Browser session over a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverBackend {
    client: Client,
}

impl WebDriverBackend {
    /// Open a new browser session
    ///
    /// # Errors
    ///
    /// Returns `Driver` if the server is unreachable or rejects the
    /// capabilities
    pub async fn connect(config: &ProbeConfig) -> ProbeResult<Self> {
        let client = ClientBuilder::native()
            .capabilities(capabilities(config))
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| {
                ProbeError::driver(format!(
                    "cannot start {} session at {}: {e}",
                    config.browser, config.webdriver_url
                ))
            })?;

        // firefox takes the size from its args
        if config.browser == BrowserKind::Chrome && !config.headless {
            client
                .set_window_size(config.window.width, config.window.height)
                .await
                .map_err(map_cmd)?;
        }

        tracing::info!(
            browser = %config.browser,
            headless = config.headless,
            url = %config.webdriver_url,
            "webdriver session started"
        );
        Ok(Self { client })
    }

    /// Underlying protocol client
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Replace the protocol message of an `UnexpectedAlert` with the alert's own text
    async fn settle<T>(&self, result: ProbeResult<T>) -> ProbeResult<T> {
        match result {
            Err(ProbeError::UnexpectedAlert { text }) => {
                let text = self.client.get_alert_text().await.unwrap_or(text);
                Err(ProbeError::UnexpectedAlert { text })
            }
            other => other,
        }
    }
}

/// Capabilities requested for a configuration
#[must_use]
pub fn capabilities(config: &ProbeConfig) -> Map<String, Value> {
    let (width, height) = (config.window.width, config.window.height);
    let mut caps = Map::new();
    caps.insert("browserName".into(), json!(config.browser.browser_name()));
    // alerts stay open until the page objects accept or dismiss them
    caps.insert("unhandledPromptBehavior".into(), json!("ignore"));
    match config.browser {
        BrowserKind::Chrome => {
            let mut args = vec![
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--no-sandbox".to_string(),
                format!("--window-size={width},{height}"),
            ];
            if config.headless {
                args.insert(0, "--headless=new".to_string());
            }
            caps.insert("goog:chromeOptions".into(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            let mut args = vec![format!("--width={width}"), format!("--height={height}")];
            if config.headless {
                args.insert(0, "--headless".to_string());
            }
            caps.insert("moz:firefoxOptions".into(), json!({ "args": args }));
        }
    }
    caps
}

fn to_wd(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator.strategy() {
        Strategy::Id => fantoccini::Locator::Id(locator.value()),
        Strategy::Css => fantoccini::Locator::Css(locator.value()),
        Strategy::XPath => fantoccini::Locator::XPath(locator.value()),
        Strategy::LinkText => fantoccini::Locator::LinkText(locator.value()),
    }
}

fn map_cmd(err: CmdError) -> ProbeError {
    match err {
        CmdError::NoSuchAlert(_) => ProbeError::NoAlertPresent,
        CmdError::Standard(wd) => match wd.error {
            ErrorStatus::StaleElementReference => ProbeError::StaleElement {
                element: wd.message.to_string(),
            },
            ErrorStatus::UnexpectedAlertOpen => ProbeError::UnexpectedAlert {
                text: wd.message.to_string(),
            },
            ErrorStatus::ElementNotInteractable | ErrorStatus::ElementClickIntercepted => {
                ProbeError::NotInteractable {
                    element: wd.message.to_string(),
                }
            }
            ErrorStatus::NoSuchAlert => ProbeError::NoAlertPresent,
            _ => ProbeError::driver(wd.to_string()),
        },
        other => ProbeError::driver(other.to_string()),
    }
}

fn map_find(locator: &Locator) -> impl FnOnce(CmdError) -> ProbeError + '_ {
    move |err| {
        if err.is_miss() {
            ProbeError::ElementNotFound {
                locator: locator.to_string(),
            }
        } else {
            map_cmd(err)
        }
    }
}

#[async_trait]
impl BrowserDriver for WebDriverBackend {
    type Element = Element;

    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        tracing::debug!(url, "goto");
        let result = self.client.goto(url).await.map_err(|e| match map_cmd(e) {
            ProbeError::Driver { message } => ProbeError::Navigation {
                url: url.to_string(),
                message,
            },
            other => other,
        });
        self.settle(result).await
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let url = self.settle(self.client.current_url().await.map_err(map_cmd)).await?;
        Ok(url.to_string())
    }

    async fn find(&self, locator: &Locator) -> ProbeResult<Element> {
        let result = self.client.find(to_wd(locator)).await;
        self.settle(result.map_err(map_find(locator))).await
    }

    async fn find_all(&self, locator: &Locator) -> ProbeResult<Vec<Element>> {
        let result = self.client.find_all(to_wd(locator)).await;
        self.settle(result.map_err(map_find(locator))).await
    }

    async fn find_all_in(&self, parent: &Element, locator: &Locator) -> ProbeResult<Vec<Element>> {
        let result = parent.find_all(to_wd(locator)).await;
        self.settle(result.map_err(map_find(locator))).await
    }

    async fn find_in(&self, parent: &Element, locator: &Locator) -> ProbeResult<Element> {
        let result = parent.find(to_wd(locator)).await;
        self.settle(result.map_err(map_find(locator))).await
    }

    async fn click(&self, element: &Element) -> ProbeResult<()> {
        self.settle(element.click().await.map_err(map_cmd)).await
    }

    async fn clear(&self, element: &Element) -> ProbeResult<()> {
        self.settle(element.clear().await.map_err(map_cmd)).await
    }

    async fn send_keys(&self, element: &Element, text: &str) -> ProbeResult<()> {
        self.settle(element.send_keys(text).await.map_err(map_cmd)).await
    }

    async fn text(&self, element: &Element) -> ProbeResult<String> {
        self.settle(element.text().await.map_err(map_cmd)).await
    }

    async fn attribute(&self, element: &Element, name: &str) -> ProbeResult<Option<String>> {
        self.settle(element.attr(name).await.map_err(map_cmd)).await
    }

    async fn is_displayed(&self, element: &Element) -> ProbeResult<bool> {
        self.settle(element.is_displayed().await.map_err(map_cmd)).await
    }

    async fn is_enabled(&self, element: &Element) -> ProbeResult<bool> {
        self.settle(element.is_enabled().await.map_err(map_cmd)).await
    }

    async fn alert_text(&self) -> ProbeResult<String> {
        self.client.get_alert_text().await.map_err(map_cmd)
    }

    async fn accept_alert(&self) -> ProbeResult<()> {
        self.client.accept_alert().await.map_err(map_cmd)
    }

    async fn dismiss_alert(&self) -> ProbeResult<()> {
        self.client.dismiss_alert().await.map_err(map_cmd)
    }

    async fn execute(&self, script: &str) -> ProbeResult<Value> {
        self.settle(self.client.execute(script, Vec::new()).await.map_err(map_cmd))
            .await
    }

    async fn screenshot(&self) -> ProbeResult<Screenshot> {
        let data = self.settle(self.client.screenshot().await.map_err(map_cmd)).await?;
        Ok(Screenshot::new(data))
    }

    async fn close(&self) -> ProbeResult<()> {
        tracing::debug!("closing webdriver session");
        self.client.clone().close().await.map_err(map_cmd)
    }
}

/// Starts one WebDriver session per journey
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    config: ProbeConfig,
    settings: SessionSettings,
}

impl WebDriverFactory {
    /// Factory for a validated configuration
    #[must_use]
    pub fn new(config: ProbeConfig) -> Self {
        let settings = config.session_settings();
        Self { config, settings }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    type Driver = WebDriverBackend;

    async fn create(&self) -> ProbeResult<BrowserSession<WebDriverBackend>> {
        let backend = WebDriverBackend::connect(&self.config).await?;
        Ok(BrowserSession::new(backend, self.settings.clone()))
    }

    fn describe(&self) -> String {
        format!(
            "{} via {} ({})",
            self.config.browser,
            self.config.webdriver_url,
            if self.config.headless { "headless" } else { "headed" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod capability_tests {
        use super::*;

        #[test]
        fn test_chrome_headless_args() {
            let caps = capabilities(&ProbeConfig::default());
            assert_eq!(caps["browserName"], "chrome");
            let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
            assert_eq!(args[0], "--headless=new");
            assert!(args.iter().any(|a| a == "--window-size=1920,1080"));
        }

        #[test]
        fn test_firefox_headed_args() {
            let config = ProbeConfig {
                browser: BrowserKind::Firefox,
                headless: false,
                ..ProbeConfig::default()
            };
            let caps = capabilities(&config);
            let args = caps["moz:firefoxOptions"]["args"].as_array().unwrap();
            assert!(!args.iter().any(|a| a == "--headless"));
            assert!(args.iter().any(|a| a == "--width=1920"));
        }

        #[test]
        fn test_alerts_are_left_open() {
            for browser in [BrowserKind::Chrome, BrowserKind::Firefox] {
                let config = ProbeConfig {
                    browser,
                    ..ProbeConfig::default()
                };
                assert_eq!(capabilities(&config)["unhandledPromptBehavior"], "ignore");
            }
        }
    }

    mod error_mapping_tests {
        use super::*;
        use fantoccini::error::WebDriver;

        #[test]
        fn test_unexpected_alert_status() {
            let err = CmdError::Standard(WebDriver::new(
                ErrorStatus::UnexpectedAlertOpen,
                "unexpected alert open",
            ));
            assert!(matches!(map_cmd(err), ProbeError::UnexpectedAlert { .. }));
        }

        #[test]
        fn test_intercepted_click_is_not_interactable() {
            let err = CmdError::Standard(WebDriver::new(
                ErrorStatus::ElementClickIntercepted,
                "element click intercepted",
            ));
            assert!(matches!(map_cmd(err), ProbeError::NotInteractable { .. }));
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_strategy_mapping() {
            let locator = Locator::link_text("Delete");
            assert!(matches!(to_wd(&locator), fantoccini::Locator::LinkText("Delete")));
            let locator = Locator::id("loginusername");
            assert!(matches!(to_wd(&locator), fantoccini::Locator::Id("loginusername")));
        }
    }

    #[test]
    fn test_factory_describe() {
        let factory = WebDriverFactory::new(ProbeConfig::default());
        assert_eq!(factory.describe(), "chrome via http://localhost:9515 (headless)");
    }
}
