//! Suite configuration
//!
//! Layering: built-in defaults, then an optional YAML file named by
//! `SAUCE_E2E_CONFIG`, then individual environment overrides.

use crate::browser::{self, BrowserConfig};
use crate::checkout::CheckoutInfo;
use crate::result::{SauceError, SauceResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Fixed origin of the storefront under test
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// Env var naming a YAML config file
pub const CONFIG_PATH_ENV: &str = "SAUCE_E2E_CONFIG";

/// Login credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Username typed into `#user-name`
    pub username: String,
    /// Password typed into `#password`
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("standard_user", "secret_sauce")
    }
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bounds for the explicit waits, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Login form and landing view
    pub long_ms: u64,
    /// Cart, checkout and add-to-cart confirmation
    pub short_ms: u64,
    /// Side menu reset link
    pub menu_ms: u64,
    /// Polling interval for every wait
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            long_ms: 10_000,
            short_ms: 5_000,
            menu_ms: 2_000,
            poll_interval_ms: 100,
        }
    }
}

impl Timeouts {
    /// Wait options for the login form and landing view
    #[must_use]
    pub const fn long(&self) -> WaitOptions {
        WaitOptions::new(self.long_ms, self.poll_interval_ms)
    }

    /// Wait options for page transitions inside the shop
    #[must_use]
    pub const fn short(&self) -> WaitOptions {
        WaitOptions::new(self.short_ms, self.poll_interval_ms)
    }

    /// Wait options for the side menu
    #[must_use]
    pub const fn menu(&self) -> WaitOptions {
        WaitOptions::new(self.menu_ms, self.poll_interval_ms)
    }
}

/// Configuration for one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Origin of the storefront, with trailing slash
    pub base_url: String,
    /// Account used by every scenario
    pub credentials: Credentials,
    /// Default checkout form data
    pub checkout: CheckoutInfo,
    /// Wait bounds
    pub timeouts: Timeouts,
    /// Browser launch options
    pub browser: BrowserConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
            checkout: CheckoutInfo::default(),
            timeouts: Timeouts::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl SuiteConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the configuration from the process environment.
    ///
    /// Reads the YAML file named by `SAUCE_E2E_CONFIG` if set, then applies
    /// `CI`, `SAUCE_BASE_URL`, `SAUCE_USERNAME`, `SAUCE_PASSWORD` and `CHROME`.
    pub fn load() -> SauceResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document. Missing fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> SauceResult<Self> {
        let mut config: Self = serde_yaml_ng::from_str(yaml)?;
        config.base_url = normalize_base_url(&config.base_url);
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SauceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if browser::ci_requested(&lookup) {
            self.browser = std::mem::take(&mut self.browser).for_ci();
        }
        if let Some(url) = lookup("SAUCE_BASE_URL") {
            self.base_url = normalize_base_url(&url);
        }
        if let Some(username) = lookup("SAUCE_USERNAME") {
            self.credentials.username = username;
        }
        if let Some(password) = lookup("SAUCE_PASSWORD") {
            self.credentials.password = password;
        }
        if let Some(path) = lookup("CHROME") {
            self.browser.chromium_path = Some(path);
        }
    }

    /// Check invariants the helpers rely on
    pub fn validate(&self) -> SauceResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SauceError::Config {
                message: format!("base_url must be http(s), got {:?}", self.base_url),
            });
        }
        let t = &self.timeouts;
        if t.poll_interval_ms == 0 || t.poll_interval_ms > t.menu_ms.min(t.short_ms) {
            return Err(SauceError::Config {
                message: format!(
                    "poll interval {}ms must be non-zero and below every wait bound",
                    t.poll_interval_ms
                ),
            });
        }
        Ok(())
    }

    /// Set the origin
    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = normalize_base_url(url);
        self
    }

    /// Set the account
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the wait bounds
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Absolute URL of a page below the origin
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}
