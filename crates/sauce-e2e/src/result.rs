//! Result and error types for the storefront suite.

use thiserror::Error;

/// Result type for suite operations
pub type SauceResult<T> = Result<T, SauceError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum SauceError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// The automation backend reported a failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// A required control is absent from the rendered page
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Locator that matched nothing
        locator: String,
    },

    /// An element handle was used after the page it was located on went away
    #[error("Stale element handle: {message}")]
    StaleElement {
        /// Error message
        message: String,
    },

    /// A wait condition never materialized within its bound
    #[error("Timed out after {timeout_ms}ms waiting for {locator} to be {condition}")]
    WaitTimeout {
        /// Locator (or probe descriptions) being waited on
        locator: String,
        /// Condition that never held
        condition: String,
        /// Bound in milliseconds
        timeout_ms: u64,
    },

    /// The post-login landing view never appeared
    #[error(
        "Login as {username} did not reach the inventory within {timeout_ms}ms{}",
        banner_suffix(.page_error)
    )]
    LoginTimeout {
        /// Username that was submitted
        username: String,
        /// Bound in milliseconds
        timeout_ms: u64,
        /// Error banner text rendered by the login form, if any
        page_error: Option<String>,
    },

    /// A scenario expectation was violated
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message with the captured values
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn banner_suffix(page_error: &Option<String>) -> String {
    page_error
        .as_ref()
        .map(|e| format!(" (page said: {e})"))
        .unwrap_or_default()
}

impl SauceError {
    /// Errors a polling wait treats as "condition not met yet"
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StaleElement { .. } | Self::ElementNotFound { .. })
    }

    /// Whether this is a wait (or login) timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::WaitTimeout { .. } | Self::LoginTimeout { .. })
    }

    pub(crate) fn driver(message: impl std::fmt::Display) -> Self {
        Self::Driver {
            message: message.to_string(),
        }
    }

    pub(crate) fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }
}
