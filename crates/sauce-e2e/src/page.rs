//! Page signatures and the checkout state machine.
//!
//! Each [`Stage`] is recognised by one signature element. The helpers move
//! along the edges below; [`Stage::can_transition_to`] encodes them.
//!
//! ```text
//! Login ─▶ Inventory ─▶ Cart ─▶ CheckoutInfo ─▶ CheckoutSummary ─▶ OrderComplete
//!                        ▲            │
//!                        └── cancel ──┘
//! ```

use crate::driver::StoreDriver;
use crate::locator::{dom, Locator};
use crate::result::SauceResult;
use crate::storefront::Storefront;
use std::fmt;

/// A page of the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Login form
    Login,
    /// Product listing
    Inventory,
    /// Cart contents
    Cart,
    /// Checkout information form
    CheckoutInfo,
    /// Checkout overview
    CheckoutSummary,
    /// Order confirmation
    OrderComplete,
}

impl Stage {
    /// Every stage in flow order
    pub const ALL: [Self; 6] = [
        Self::Login,
        Self::Inventory,
        Self::Cart,
        Self::CheckoutInfo,
        Self::CheckoutSummary,
        Self::OrderComplete,
    ];

    /// Path below the origin
    #[must_use]
    pub const fn url_path(&self) -> &'static str {
        match self {
            Self::Login => "",
            Self::Inventory => "inventory.html",
            Self::Cart => "cart.html",
            Self::CheckoutInfo => "checkout-step-one.html",
            Self::CheckoutSummary => "checkout-step-two.html",
            Self::OrderComplete => "checkout-complete.html",
        }
    }

    /// Element whose visibility identifies the stage
    #[must_use]
    pub const fn signature(&self) -> Locator {
        match self {
            Self::Login => dom::LOGIN_BUTTON,
            Self::Inventory => dom::INVENTORY_CONTAINER,
            Self::Cart => dom::CART_LIST,
            Self::CheckoutInfo => dom::CHECKOUT_INFO,
            Self::CheckoutSummary => dom::CHECKOUT_SUMMARY,
            Self::OrderComplete => dom::COMPLETE_HEADER,
        }
    }

    /// Next stage on the happy path
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Login => Some(Self::Inventory),
            Self::Inventory => Some(Self::Cart),
            Self::Cart => Some(Self::CheckoutInfo),
            Self::CheckoutInfo => Some(Self::CheckoutSummary),
            Self::CheckoutSummary => Some(Self::OrderComplete),
            Self::OrderComplete => None,
        }
    }

    /// Whether the helpers ever move directly from `self` to `to`
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to) || matches!((self, to), (Self::CheckoutInfo, Self::Cart))
    }

    /// Human-readable page name
    #[must_use]
    pub const fn page_name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Inventory => "inventory",
            Self::Cart => "cart",
            Self::CheckoutInfo => "checkout information",
            Self::CheckoutSummary => "checkout overview",
            Self::OrderComplete => "order complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.page_name())
    }
}

impl<D: StoreDriver> Storefront<'_, D> {
    /// The stage whose signature is currently visible, if any.
    ///
    /// Checks the flow from its far end so the summary wins over the cart
    /// listing it embeds.
    pub async fn current_stage(&self) -> SauceResult<Option<Stage>> {
        for stage in Stage::ALL.iter().rev() {
            for element in self.driver().find_all(&stage.signature()).await? {
                if self.driver().is_displayed(&element).await? {
                    return Ok(Some(*stage));
                }
            }
        }
        Ok(None)
    }
}
