//! Suite configuration.
//!
//! Loaded from YAML, then overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BLAZEPROBE_BASE_URL` | `base_url` |
//! | `BLAZEPROBE_WEBDRIVER_URL` | `webdriver_url` |
//! | `BLAZEPROBE_HEADLESS` | `headless` (`1/0`, `true/false`) |

use crate::fixtures::SiteFixtures;
use crate::result::{ProbeError, ProbeResult};
use crate::session::SessionSettings;
use crate::wait::Timeouts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Storefront under test
pub const DEFAULT_BASE_URL: &str = "https://www.demoblaze.com";

/// Default W3C WebDriver endpoint (chromedriver's default port)
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "BLAZEPROBE_BASE_URL";

/// Environment variable overriding the WebDriver URL
pub const ENV_WEBDRIVER_URL: &str = "BLAZEPROBE_WEBDRIVER_URL";

/// Environment variable overriding headless mode
pub const ENV_HEADLESS: &str = "BLAZEPROBE_HEADLESS";

/// Browser to drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Chrome or Chromium via chromedriver
    #[default]
    Chrome,
    /// Firefox via geckodriver
    Firefox,
}

impl BrowserKind {
    /// Name used by WebDriver capabilities
    #[must_use]
    pub const fn browser_name(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.browser_name())
    }
}

impl FromStr for BrowserKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Self::Chrome),
            "firefox" | "gecko" => Ok(Self::Firefox),
            other => Err(ProbeError::config(format!("unknown browser: {other}"))),
        }
    }
}

/// Browser window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Complete configuration of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Storefront root URL
    pub base_url: String,
    /// WebDriver server URL
    pub webdriver_url: String,
    /// Browser to request
    pub browser: BrowserKind,
    /// Run without a visible window
    pub headless: bool,
    /// Window size
    pub window: WindowSize,
    /// Wait budgets
    pub timeouts: Timeouts,
    /// Where reports are written
    pub report_dir: PathBuf,
    /// Site literals
    pub fixtures: SiteFixtures,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            browser: BrowserKind::default(),
            headless: true,
            window: WindowSize::default(),
            timeouts: Timeouts::default(),
            report_dir: PathBuf::from("target/blazeprobe-report"),
            fixtures: SiteFixtures::default(),
        }
    }
}

impl ProbeConfig {
    /// Parse YAML; missing keys take defaults
    ///
    /// # Errors
    ///
    /// Returns error on malformed YAML or an invalid result
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Serialize as YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply `BLAZEPROBE_*` environment overrides
    ///
    /// # Errors
    ///
    /// Returns error if an override has an invalid value
    pub fn with_env_overrides(self) -> ProbeResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    ///
    /// # Errors
    ///
    /// Returns error if an override has an invalid value
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ProbeResult<Self> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(url) = lookup(ENV_WEBDRIVER_URL) {
            self.webdriver_url = url;
        }
        if let Some(flag) = lookup(ENV_HEADLESS) {
            self.headless = parse_flag(ENV_HEADLESS, &flag)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check internal consistency
    ///
    /// # Errors
    ///
    /// Returns error for non-HTTP URLs or zero budgets
    pub fn validate(&self) -> ProbeResult<()> {
        for (name, url) in [("base_url", &self.base_url), ("webdriver_url", &self.webdriver_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ProbeError::config(format!("{name} must be an http(s) URL, got {url:?}")));
            }
        }
        let t = &self.timeouts;
        if t.default_ms == 0 || t.poll_ms == 0 || t.alert_grace_ms == 0 || t.probe_ms == 0 {
            return Err(ProbeError::config("timeouts must be greater than zero"));
        }
        Ok(())
    }

    /// Settings for sessions created from this configuration
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            base_url: self.base_url.clone(),
            timeouts: self.timeouts,
            fixtures: self.fixtures.clone(),
        }
    }
}

fn parse_flag(name: &str, value: &str) -> ProbeResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ProbeError::config(format!("{name}: expected a boolean, got {other:?}"))),
    }
}
