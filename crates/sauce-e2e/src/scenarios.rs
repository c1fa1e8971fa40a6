//! The three storefront scenarios.
//!
//! Every scenario isolates itself: log in, reset the cart, check the badge is
//! empty, then run its flow. Failed expectations surface as
//! [`SauceError::AssertionFailed`] with the observed values in the message.

use crate::cart::price_is_well_formed;
use crate::driver::StoreDriver;
use crate::result::{SauceError, SauceResult};
use crate::storefront::Storefront;

/// Product ordered by [`order_confirmation`]
pub const BACKPACK: &str = "Sauce Labs Backpack";
/// Product used by [`order_cancellation`]
pub const BIKE_LIGHT: &str = "Sauce Labs Bike Light";
/// Product inspected by [`checkout_details_verification`]
pub const BOLT_TSHIRT: &str = "Sauce Labs Bolt T-Shirt";

/// Phrase the order confirmation banner must contain, upper-cased
pub const THANK_YOU: &str = "THANK YOU FOR YOUR ORDER";

fn ensure(holds: bool, message: impl FnOnce() -> String) -> SauceResult<()> {
    if holds {
        Ok(())
    } else {
        Err(SauceError::assertion(message()))
    }
}

/// Log in, empty the cart, and check the badge reads zero
pub async fn prepare<D: StoreDriver>(shop: &Storefront<'_, D>) -> SauceResult<()> {
    shop.login().await?;
    let outcome = shop.clear_cart().await;
    let badge = shop.cart_badge_count().await?;
    ensure(badge == 0, || {
        format!("cart badge shows {badge} after reset ({outcome:?})")
    })
}

async fn add_or_fail<D: StoreDriver>(shop: &Storefront<'_, D>, product: &str) -> SauceResult<()> {
    let added = shop.add_to_cart(product).await?;
    ensure(added, || format!("could not add {product:?} to the cart"))
}

/// Buy one backpack with the default details and read the thank-you banner
pub async fn order_confirmation<D: StoreDriver>(shop: &Storefront<'_, D>) -> SauceResult<()> {
    prepare(shop).await?;
    add_or_fail(shop, BACKPACK).await?;
    shop.go_to_cart_and_checkout().await?;
    shop.submit_checkout_info(&shop.config().checkout).await?;
    let banner = shop.finish_checkout().await?;
    ensure(banner.to_uppercase().contains(THANK_YOU), || {
        format!("confirmation banner {banner:?} does not contain {THANK_YOU:?}")
    })
}

/// Enter checkout with a bike light, cancel, and find it still in the cart
pub async fn order_cancellation<D: StoreDriver>(shop: &Storefront<'_, D>) -> SauceResult<()> {
    prepare(shop).await?;
    add_or_fail(shop, BIKE_LIGHT).await?;
    shop.go_to_cart_and_checkout().await?;
    shop.cancel_checkout().await?;
    let names = shop.cart_item_names().await?;
    ensure(names.iter().any(|n| n == BIKE_LIGHT), || {
        format!("cart lists {names:?} after cancelling, expected {BIKE_LIGHT:?}")
    })
}

/// Check the cart row for a bolt T-shirt, then its quantity on the overview
pub async fn checkout_details_verification<D: StoreDriver>(
    shop: &Storefront<'_, D>,
) -> SauceResult<()> {
    prepare(shop).await?;
    add_or_fail(shop, BOLT_TSHIRT).await?;
    shop.open_cart().await?;

    let item = shop.first_line_item().await?;
    ensure(item.name == BOLT_TSHIRT, || {
        format!("first cart row is {:?}, expected {BOLT_TSHIRT:?}", item.name)
    })?;
    ensure(item.description.len() > 5, || {
        format!("description {:?} is too short", item.description)
    })?;
    ensure(price_is_well_formed(&item.price), || {
        format!("price {:?} is not a dollar amount", item.price)
    })?;

    shop.proceed_to_checkout().await?;
    shop.submit_checkout_info(&shop.config().checkout).await?;
    shop.wait_for_summary().await?;
    let quantity = shop.summary_quantity().await?;
    ensure(quantity == "1", || {
        format!("overview quantity is {quantity:?}, expected \"1\"")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::mock::{Confirmation, MockPage, MockStorefront, Product};
    use std::time::Duration;

    fn slow_shop() -> MockStorefront {
        MockStorefront::new()
            .with_render_delay(Duration::from_millis(450))
            .with_confirm_delay(Duration::from_millis(300))
            .with_checkout_settle(Duration::from_millis(600))
            .with_cart(&[BACKPACK, BIKE_LIGHT])
    }

    mod passing_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_order_confirmation() {
            let shop = slow_shop();
            let config = SuiteConfig::default();
            order_confirmation(&Storefront::new(&shop, &config))
                .await
                .unwrap();
            assert_eq!(shop.page(), Some(MockPage::Complete));
            assert!(shop.cart_contents().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_order_cancellation() {
            let shop = slow_shop();
            let config = SuiteConfig::default();
            order_cancellation(&Storefront::new(&shop, &config))
                .await
                .unwrap();
            assert_eq!(shop.cart_contents(), vec![BIKE_LIGHT]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_checkout_details_verification() {
            let shop = slow_shop();
            let config = SuiteConfig::default();
            checkout_details_verification(&Storefront::new(&shop, &config))
                .await
                .unwrap();
            assert_eq!(shop.page(), Some(MockPage::CheckoutSummary));
        }
    }

    mod failing_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_silent_add_fails_with_product_name() {
            let shop = MockStorefront::new().with_confirmation(Confirmation::Silent);
            let config = SuiteConfig::default();
            let err = order_confirmation(&Storefront::new(&shop, &config))
                .await
                .unwrap_err();
            assert!(matches!(err, SauceError::AssertionFailed { .. }));
            assert!(err.to_string().contains(BACKPACK));
        }

        #[tokio::test(start_paused = true)]
        async fn test_malformed_price_is_reported() {
            let shop = MockStorefront::new().with_catalog(vec![Product::new(
                BOLT_TSHIRT,
                "Get your testing superhero on.",
                "15.99",
            )]);
            let config = SuiteConfig::default();
            let err = checkout_details_verification(&Storefront::new(&shop, &config))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("\"15.99\""));
        }

        #[tokio::test(start_paused = true)]
        async fn test_short_description_is_reported() {
            let shop = MockStorefront::new().with_catalog(vec![Product::new(
                BOLT_TSHIRT,
                "Tee",
                "$15.99",
            )]);
            let config = SuiteConfig::default();
            let err = checkout_details_verification(&Storefront::new(&shop, &config))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("too short"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_bad_credentials_fail_at_login() {
            let shop = MockStorefront::new();
            let config = SuiteConfig::default().with_credentials(
                crate::config::Credentials::new("standard_user", "wrong"),
            );
            let err = order_cancellation(&Storefront::new(&shop, &config))
                .await
                .unwrap_err();
            assert!(matches!(err, SauceError::LoginTimeout { .. }));
        }
    }
}
