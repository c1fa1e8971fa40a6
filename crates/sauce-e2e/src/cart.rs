//! Cart helper and cart readers.
//!
//! Product cards are located by their rendered name on every call. Nothing
//! here caches a handle across pages.

use crate::driver::StoreDriver;
use crate::locator::dom;
use crate::result::{SauceError, SauceResult};
use crate::storefront::Storefront;
use crate::wait::{self, Probe};

/// A product card on the listing, paired with its rendered name
#[derive(Debug, Clone)]
pub struct ProductCard<E> {
    /// Trimmed product name
    pub name: String,
    /// The `.inventory_item` card
    pub element: E,
}

/// The first row of the cart listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Product name
    pub name: String,
    /// Product description
    pub description: String,
    /// Price text, e.g. `$15.99`
    pub price: String,
}

/// Whether a rendered product name refers to `wanted`
#[must_use]
pub fn name_matches(rendered: &str, wanted: &str) -> bool {
    rendered.trim() == wanted
}

/// A price reads as a currency amount: a `$` followed by at least one character
#[must_use]
pub fn price_is_well_formed(price: &str) -> bool {
    price.starts_with('$') && price.len() > 1
}

impl<D: StoreDriver> Storefront<'_, D> {
    /// Every product card with a readable name, in listing order
    pub async fn product_cards(&self) -> SauceResult<Vec<ProductCard<D::Element>>> {
        let driver = self.driver();
        let mut cards = Vec::new();
        for element in driver.find_all(&dom::INVENTORY_ITEM).await? {
            let label = match driver.find_in(&element, &dom::ITEM_NAME).await {
                Ok(label) => label,
                Err(e) if e.is_transient() => continue,
                Err(e) => return Err(e),
            };
            let name = driver.text(&label).await?.trim().to_string();
            cards.push(ProductCard { name, element });
        }
        Ok(cards)
    }

    /// First product card named exactly `name`
    pub async fn find_product(&self, name: &str) -> SauceResult<Option<ProductCard<D::Element>>> {
        Ok(self
            .product_cards()
            .await?
            .into_iter()
            .find(|card| name_matches(&card.name, name)))
    }

    /// Add the named product and wait for the page to confirm it.
    ///
    /// Confirmation is whichever comes first within the short bound: the
    /// card's button switching to "Remove", or the cart badge count rising
    /// above what it showed before the click.
    /// Returns `false` when no card matches, the card has no button, or no
    /// confirmation shows up.
    pub async fn add_to_cart(&self, name: &str) -> SauceResult<bool> {
        let driver = self.driver();

        let Some(card) = self.find_product(name).await? else {
            tracing::warn!(product = name, "no product card with that name");
            return Ok(false);
        };

        let button = match driver.find_in(&card.element, &dom::BUTTON).await {
            Ok(button) => button,
            Err(e) if e.is_transient() => {
                tracing::warn!(product = name, "product card has no button");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        let before = self.cart_badge_count().await?;
        driver.click(&button).await?;

        let button = &button;
        let probes = [
            Probe::new("add button reads Remove", move || async move {
                let label = driver.text(button).await?;
                Ok::<_, SauceError>(label.trim().eq_ignore_ascii_case("remove"))
            }),
            Probe::new(format!("cart badge above {before}"), move || async move {
                Ok::<_, SauceError>(self.cart_badge_count().await? > before)
            }),
        ];

        match wait::any_of(&probes, &self.config().timeouts.short()).await {
            Ok(winner) => {
                tracing::info!(
                    product = name,
                    signal = probes[winner].description(),
                    "added to cart"
                );
                Ok(true)
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(product = name, error = %e, "add to cart not confirmed");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Count on the cart badge; `0` when the badge is not rendered
    pub async fn cart_badge_count(&self) -> SauceResult<usize> {
        let Some(badge) = self.driver().find_all(&dom::CART_BADGE).await?.into_iter().next() else {
            return Ok(0);
        };
        let text = self.driver().text(&badge).await?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse()
            .map_err(|_| SauceError::driver(format!("cart badge shows {text:?}")))
    }

    /// Product names listed on the cart page, in listing order
    pub async fn cart_item_names(&self) -> SauceResult<Vec<String>> {
        let mut names = Vec::new();
        for label in self.driver().find_all(&dom::ITEM_NAME).await? {
            names.push(self.driver().text(&label).await?.trim().to_string());
        }
        Ok(names)
    }

    /// Name, description and price of the first cart row
    pub async fn first_line_item(&self) -> SauceResult<LineItem> {
        Ok(LineItem {
            name: self.text_of(&dom::ITEM_NAME).await?,
            description: self.text_of(&dom::ITEM_DESCRIPTION).await?,
            price: self.text_of(&dom::ITEM_PRICE).await?,
        })
    }
}
