//! Checkout flow helpers.
//!
//! Each step clicks one control and then waits for the signature of the
//! page it leads to (see [`Stage`](crate::page::Stage)).

use crate::driver::StoreDriver;
use crate::locator::dom;
use crate::result::SauceResult;
use crate::storefront::Storefront;
use crate::wait::Condition;
use serde::{Deserialize, Serialize};

/// Shipping details typed into the checkout information form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutInfo {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Postal code
    pub postal_code: String,
}

impl Default for CheckoutInfo {
    fn default() -> Self {
        Self::new("Test", "User", "12345")
    }
}

impl CheckoutInfo {
    /// Create checkout details
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postal_code: postal_code.into(),
        }
    }
}

impl<D: StoreDriver> Storefront<'_, D> {
    /// Open the cart from the header link
    pub async fn open_cart(&self) -> SauceResult<()> {
        self.click(&dom::CART_LINK).await?;
        self.wait(&dom::CART_LIST, Condition::Visible, &self.config().timeouts.short())
            .await?;
        tracing::debug!("cart open");
        Ok(())
    }

    /// From the cart, start checkout
    pub async fn proceed_to_checkout(&self) -> SauceResult<()> {
        let short = self.config().timeouts.short();
        let checkout = self.wait(&dom::CHECKOUT, Condition::Clickable, &short).await?;
        self.driver().click(&checkout).await?;
        self.wait(&dom::CHECKOUT_INFO, Condition::Visible, &short).await?;
        tracing::debug!("checkout information form open");
        Ok(())
    }

    /// Open the cart and start checkout
    pub async fn go_to_cart_and_checkout(&self) -> SauceResult<()> {
        self.open_cart().await?;
        self.proceed_to_checkout().await
    }

    /// Leave the checkout information form back to the cart
    pub async fn cancel_checkout(&self) -> SauceResult<()> {
        self.click(&dom::CANCEL).await?;
        self.wait(&dom::CART_LIST, Condition::Visible, &self.config().timeouts.short())
            .await?;
        tracing::info!("checkout cancelled");
        Ok(())
    }

    /// Fill and submit the checkout information form.
    ///
    /// Does not wait for the next page; follow with [`Self::wait_for_summary`]
    /// or [`Self::finish_checkout`].
    pub async fn submit_checkout_info(&self, info: &CheckoutInfo) -> SauceResult<()> {
        self.type_into(&dom::FIRST_NAME, &info.first_name).await?;
        self.type_into(&dom::LAST_NAME, &info.last_name).await?;
        self.type_into(&dom::POSTAL_CODE, &info.postal_code).await?;
        self.click(&dom::CONTINUE).await
    }

    /// Wait for the checkout overview
    pub async fn wait_for_summary(&self) -> SauceResult<()> {
        self.wait(
            &dom::CHECKOUT_SUMMARY,
            Condition::Visible,
            &self.config().timeouts.short(),
        )
        .await?;
        Ok(())
    }

    /// Place the order and return the confirmation banner text
    pub async fn finish_checkout(&self) -> SauceResult<String> {
        let short = self.config().timeouts.short();
        self.wait_for_summary().await?;
        self.click(&dom::FINISH).await?;
        let header = self
            .wait(&dom::COMPLETE_HEADER, Condition::Visible, &short)
            .await?;
        let banner = self.driver().text(&header).await?.trim().to_string();
        tracing::info!(%banner, "order placed");
        Ok(banner)
    }

    /// Quantity shown on the first row of the cart or overview
    pub async fn summary_quantity(&self) -> SauceResult<String> {
        self.text_of(&dom::CART_QUANTITY).await
    }
}
