//! Cart-reset helper.
//!
//! Best-effort cleanup run before each scenario. It never fails: every
//! problem is logged at `warn` and folded into the returned [`ResetOutcome`].

use crate::driver::StoreDriver;
use crate::locator::dom;
use crate::result::SauceResult;
use crate::storefront::Storefront;
use crate::wait::Condition;

/// How the cart was cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The side menu's reset link was used
    Reset,
    /// The menu path failed; this many "Remove" buttons were clicked instead
    RemovedItems(usize),
    /// Both paths failed
    Abandoned,
}

impl ResetOutcome {
    /// Whether a cleanup path ran to completion
    #[must_use]
    pub const fn completed(&self) -> bool {
        !matches!(self, Self::Abandoned)
    }
}

impl<D: StoreDriver> Storefront<'_, D> {
    /// Empty the cart from the product listing.
    pub async fn clear_cart(&self) -> ResetOutcome {
        let short = self.config().timeouts.short();
        let inventory = self.config().url_for("inventory.html");

        if let Err(e) = self.driver().navigate(&inventory).await {
            tracing::warn!(error = %e, "could not open the product listing for reset");
        } else if let Err(e) = self
            .wait(&dom::INVENTORY_CONTAINER, Condition::Visible, &short)
            .await
        {
            tracing::warn!(error = %e, "product listing not ready, resetting anyway");
        }

        match self.reset_via_menu().await {
            Ok(()) => {
                tracing::info!("cart reset via side menu");
                return ResetOutcome::Reset;
            }
            Err(e) => tracing::warn!(error = %e, "menu reset failed, removing items one by one"),
        }

        match self.remove_all_items().await {
            Ok(removed) => {
                tracing::info!(removed, "cart reset via remove buttons");
                ResetOutcome::RemovedItems(removed)
            }
            Err(e) => {
                tracing::warn!(error = %e, "cart reset abandoned");
                ResetOutcome::Abandoned
            }
        }
    }

    async fn reset_via_menu(&self) -> SauceResult<()> {
        self.click(&dom::MENU_OPEN).await?;
        let link = self
            .wait(&dom::MENU_RESET, Condition::Clickable, &self.config().timeouts.menu())
            .await?;
        self.driver().click(&link).await?;
        self.click(&dom::MENU_CLOSE).await
    }

    async fn remove_all_items(&self) -> SauceResult<usize> {
        let driver = self.driver();
        let mut removed = 0;
        for button in driver.find_all(&dom::BUTTON).await? {
            let label = match driver.text(&button).await {
                Ok(label) => label,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable button");
                    continue;
                }
            };
            if label.trim() != "Remove" {
                continue;
            }
            match driver.click(&button).await {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(error = %e, "could not click a Remove button"),
            }
        }
        Ok(removed)
    }
}
