//! Authentication helper.

use crate::config::Credentials;
use crate::driver::StoreDriver;
use crate::locator::dom;
use crate::result::{SauceError, SauceResult};
use crate::storefront::Storefront;
use crate::wait::Condition;

impl<D: StoreDriver> Storefront<'_, D> {
    /// Log in with the configured account
    pub async fn login(&self) -> SauceResult<()> {
        self.login_as(&self.config().credentials).await
    }

    /// Log in and wait for the product listing.
    ///
    /// A landing timeout becomes [`SauceError::LoginTimeout`], carrying the
    /// login form's error banner when one is shown.
    pub async fn login_as(&self, credentials: &Credentials) -> SauceResult<()> {
        let long = self.config().timeouts.long();
        tracing::info!(username = %credentials.username, "logging in");

        self.driver().navigate(&self.config().base_url).await?;

        let username = self.wait(&dom::USERNAME, Condition::Visible, &long).await?;
        self.driver().send_keys(&username, &credentials.username).await?;
        self.type_into(&dom::PASSWORD, &credentials.password).await?;
        self.click(&dom::LOGIN_BUTTON).await?;

        match self
            .wait(&dom::INVENTORY_CONTAINER, Condition::Visible, &long)
            .await
        {
            Ok(_) => {
                tracing::info!(username = %credentials.username, "logged in");
                Ok(())
            }
            Err(e) if e.is_timeout() => Err(SauceError::LoginTimeout {
                username: credentials.username.clone(),
                timeout_ms: long.timeout_ms,
                page_error: self.login_error_text().await,
            }),
            Err(e) => Err(e),
        }
    }

    /// Text of the login form's error banner, if one is rendered
    pub async fn login_error_text(&self) -> Option<String> {
        let banner = self.text_of(&dom::login_error()).await.ok()?;
        (!banner.is_empty()).then_some(banner)
    }
}
