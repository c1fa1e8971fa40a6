//! Browser session bootstrap.
//!
//! [`BrowserConfig`] decides how chromium is launched. It is plain data and
//! always available; the [`Session`] that actually spawns chromium over CDP
//! needs the `browser` feature.

use serde::{Deserialize, Serialize};

/// Flag that keeps shared-memory use off `/dev/shm` in containers
pub const DISABLE_DEV_SHM: &str = "--disable-dev-shm-usage";

/// Flag that opens the window maximized in headed mode
pub const START_MAXIMIZED: &str = "--start-maximized";

/// Env var that selects the CI profile
pub const CI_ENV: &str = "CI";

/// Whether `lookup` asks for the CI profile. Only the exact value `"true"` does.
pub fn ci_requested(lookup: impl Fn(&str) -> Option<String>) -> bool {
    lookup(CI_ENV).is_some_and(|v| v == "true")
}

/// Browser launch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,
    /// Chromium sandbox (disable for containers)
    pub sandbox: bool,
    /// Maximize the window and let the viewport follow it
    pub maximized: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Extra command-line flags
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            sandbox: true,
            maximized: true,
            chromium_path: None,
            args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Configuration selected by the `CI` environment variable
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration selected by `CI` as reported by `lookup`
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if ci_requested(lookup) {
            Self::default().for_ci()
        } else {
            Self::default()
        }
    }

    /// Headless, unsandboxed, and off `/dev/shm`
    #[must_use]
    pub fn for_ci(mut self) -> Self {
        self.headless = true;
        self.sandbox = false;
        if !self.args.iter().any(|a| a == DISABLE_DEV_SHM) {
            self.args.push(DISABLE_DEV_SHM.to_string());
        }
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Append a command-line flag
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Flags passed to chromium on top of what the launcher adds itself
    #[must_use]
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        if self.maximized && !self.headless {
            args.push(START_MAXIMIZED.to_string());
        }
        args
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::ChromiumDriver;
    use crate::result::{SauceError, SauceResult};
    use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
    use chromiumoxide::handler::viewport::Viewport;
    use futures::StreamExt;

    fn launch_error(e: impl std::fmt::Display) -> SauceError {
        SauceError::BrowserLaunch {
            message: e.to_string(),
        }
    }

    /// One chromium process with a single page, shared by every scenario
    #[derive(Debug)]
    pub struct Session {
        browser: Browser,
        handler: tokio::task::JoinHandle<()>,
        driver: ChromiumDriver,
    }

    impl Session {
        /// Launch chromium and open a blank page
        pub async fn launch(config: &BrowserConfig) -> SauceResult<Self> {
            let mut builder = CdpConfig::builder();

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            for arg in config.launch_args() {
                builder = builder.arg(arg);
            }

            if config.maximized {
                builder = builder.viewport(None::<Viewport>);
            }

            let cdp_config = builder.build().map_err(launch_error)?;

            let (browser, mut handler) = Browser::launch(cdp_config).await.map_err(launch_error)?;

            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(launch_error)?;
            tracing::info!(
                headless = config.headless,
                sandbox = config.sandbox,
                "browser session started"
            );

            Ok(Self {
                browser,
                handler,
                driver: ChromiumDriver::new(page),
            })
        }

        /// Driver for the session's page
        #[must_use]
        pub const fn driver(&self) -> &ChromiumDriver {
            &self.driver
        }

        /// Shut chromium down and stop the event loop
        pub async fn close(mut self) -> SauceResult<()> {
            let closed = self.browser.close().await.map_err(SauceError::driver);
            if let Err(e) = self.browser.wait().await {
                tracing::warn!(error = %e, "browser process did not exit cleanly");
            }
            self.handler.abort();
            tracing::info!("browser session closed");
            closed.map(|_| ())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::Session;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_interactive() {
        let config = BrowserConfig::default();
        assert!(!config.headless);
        assert!(config.sandbox);
        assert!(config.maximized);
        assert_eq!(config.launch_args(), vec![START_MAXIMIZED.to_string()]);
    }

    #[test]
    fn test_ci_profile() {
        let config = BrowserConfig::default().for_ci();
        assert!(config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.launch_args(), vec![DISABLE_DEV_SHM.to_string()]);
    }

    #[test]
    fn test_ci_flag_must_be_exactly_true() {
        let lookup = |value: &'static str| move |key: &str| (key == CI_ENV).then(|| value.to_string());
        assert!(ci_requested(lookup("true")));
        for value in ["1", "TRUE", "yes", ""] {
            assert!(!ci_requested(lookup(value)), "CI={value:?}");
        }
        assert!(!ci_requested(|_| None));
    }

    #[test]
    fn test_from_lookup() {
        let ci = BrowserConfig::from_lookup(|key| (key == CI_ENV).then(|| "true".to_string()));
        assert_eq!(ci, BrowserConfig::default().for_ci());
        assert_eq!(BrowserConfig::from_lookup(|_| None), BrowserConfig::default());
    }

    #[test]
    fn test_ci_profile_is_idempotent() {
        let config = BrowserConfig::default().for_ci().for_ci();
        assert_eq!(config.args.len(), 1);
    }

    #[test]
    fn test_builders() {
        let config = BrowserConfig::default()
            .with_headless(true)
            .with_no_sandbox()
            .with_chromium_path("/opt/chromium/chrome")
            .with_arg("--lang=en-US");
        assert!(config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.chromium_path.as_deref(), Some("/opt/chromium/chrome"));
        assert_eq!(config.launch_args(), vec!["--lang=en-US".to_string()]);
    }

    #[test]
    fn test_yaml_fields_default() {
        let config: BrowserConfig = serde_yaml_ng::from_str("headless: true\n").unwrap();
        assert!(config.headless);
        assert!(config.sandbox);
        assert!(config.args.is_empty());
    }
}
