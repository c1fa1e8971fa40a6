//! sauce-e2e: browser-driven end-to-end suite for the Sauce Demo storefront
//!
//! Three scenarios (order confirmation, order cancellation, checkout details)
//! drive `https://www.saucedemo.com/` through Chromium. The interesting part
//! is the helper layer between the scenarios and the browser: every step
//! waits for an explicit DOM condition, never for a fixed time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    sauce-e2e Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Storefront │    │ StoreDriver│            │
//! │   │ Suite      │───►│ helpers    │───►│ chromium / │            │
//! │   │ (harness)  │    │ + waits    │    │ mock       │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Offline, everything runs against [`MockStorefront`]. With the `browser`
//! feature, `run_live` launches Chromium and runs the suite for real.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod auth;
pub mod browser;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod driver;
pub mod harness;
pub mod locator;
pub mod logging;
#[allow(clippy::missing_panics_doc, clippy::too_many_lines)]
pub mod mock;
pub mod page;
pub mod reset;
mod result;
pub mod scenarios;
pub mod storefront;
#[allow(clippy::cast_possible_truncation)]
pub mod wait;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::Session;
pub use cart::{LineItem, ProductCard};
pub use checkout::CheckoutInfo;
pub use config::{Credentials, SuiteConfig, Timeouts};
#[cfg(feature = "browser")]
pub use driver::ChromiumDriver;
pub use driver::StoreDriver;
#[cfg(feature = "browser")]
pub use harness::run_live;
pub use harness::{Scenario, ScenarioResult, ScenarioSuite, SuiteResults};
pub use locator::{dom, Locator};
pub use mock::MockStorefront;
pub use page::Stage;
pub use reset::ResetOutcome;
pub use result::{SauceError, SauceResult};
pub use storefront::Storefront;
pub use wait::{Condition, Probe, WaitOptions};
