//! The helper façade.
//!
//! [`Storefront`] pairs a driver with the suite configuration. The page
//! helpers are `impl` blocks on it, spread over [`auth`](crate::auth),
//! [`cart`](crate::cart), [`checkout`](crate::checkout) and
//! [`reset`](crate::reset).

use crate::config::SuiteConfig;
use crate::driver::StoreDriver;
use crate::locator::Locator;
use crate::result::SauceResult;
use crate::wait::{self, Condition, WaitOptions};

/// A driver bound to one suite configuration
#[derive(Debug)]
pub struct Storefront<'a, D: StoreDriver> {
    driver: &'a D,
    config: &'a SuiteConfig,
}

impl<'a, D: StoreDriver> Storefront<'a, D> {
    /// Bind `driver` to `config`
    #[must_use]
    pub const fn new(driver: &'a D, config: &'a SuiteConfig) -> Self {
        Self { driver, config }
    }

    /// The underlying driver
    #[must_use]
    pub const fn driver(&self) -> &'a D {
        self.driver
    }

    /// The suite configuration
    #[must_use]
    pub const fn config(&self) -> &'a SuiteConfig {
        self.config
    }

    pub(crate) async fn wait(
        &self,
        locator: &Locator,
        condition: Condition,
        options: &WaitOptions,
    ) -> SauceResult<D::Element> {
        wait::until_first(self.driver, locator, condition, options).await
    }

    /// Click the first match of a required control
    pub(crate) async fn click(&self, locator: &Locator) -> SauceResult<()> {
        let element = self.driver.find(locator).await?;
        tracing::debug!(%locator, "click");
        self.driver.click(&element).await
    }

    /// Type into the first match of a required field
    pub(crate) async fn type_into(&self, locator: &Locator, text: &str) -> SauceResult<()> {
        let element = self.driver.find(locator).await?;
        self.driver.send_keys(&element, text).await
    }

    /// Text of the first match, without surrounding whitespace
    pub(crate) async fn text_of(&self, locator: &Locator) -> SauceResult<String> {
        let element = self.driver.find(locator).await?;
        Ok(self.driver.text(&element).await?.trim().to_string())
    }
}
