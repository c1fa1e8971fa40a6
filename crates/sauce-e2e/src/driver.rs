//! StoreDriver - the seam over the browser-automation backend
//!
//! Every helper in this crate talks to the page through [`StoreDriver`].
//! Two implementations exist:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StoreDriver (trait)                                          │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────────┐    ┌──────────────────────────┐   │
//! │  │  ChromiumDriver        │    │  MockStorefront          │   │
//! │  │  (`browser` feature)   │    │  (always available)      │   │
//! │  │  CDP via chromiumoxide │    │  in-memory DOM contract  │   │
//! │  └────────────────────────┘    └──────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Element handles are only valid on the page they were found on. Using one
//! after navigation yields [`SauceError::StaleElement`].

use crate::locator::Locator;
use crate::result::{SauceError, SauceResult};
use async_trait::async_trait;
use std::fmt::Debug;

/// Abstract driver for the storefront's rendered DOM
#[async_trait]
pub trait StoreDriver: Send + Sync {
    /// Handle to one DOM element
    type Element: Debug + Send + Sync;

    /// Navigate to an absolute URL
    async fn navigate(&self, url: &str) -> SauceResult<()>;

    /// URL of the current page
    async fn current_url(&self) -> SauceResult<String>;

    /// All elements matching `locator`, in document order
    async fn find_all(&self, locator: &Locator) -> SauceResult<Vec<Self::Element>>;

    /// All descendants of `scope` matching `locator`, in document order
    async fn find_all_in(
        &self,
        scope: &Self::Element,
        locator: &Locator,
    ) -> SauceResult<Vec<Self::Element>>;

    /// Rendered text of the element
    async fn text(&self, element: &Self::Element) -> SauceResult<String>;

    /// Whether the element is rendered with a non-empty box
    async fn is_displayed(&self, element: &Self::Element) -> SauceResult<bool>;

    /// Whether the element accepts interaction
    async fn is_enabled(&self, element: &Self::Element) -> SauceResult<bool>;

    /// Click the element
    async fn click(&self, element: &Self::Element) -> SauceResult<()>;

    /// Type text into the element
    async fn send_keys(&self, element: &Self::Element, text: &str) -> SauceResult<()>;

    /// First element matching `locator`
    async fn find(&self, locator: &Locator) -> SauceResult<Self::Element> {
        self.find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SauceError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    /// First descendant of `scope` matching `locator`
    async fn find_in(&self, scope: &Self::Element, locator: &Locator) -> SauceResult<Self::Element> {
        self.find_all_in(scope, locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SauceError::ElementNotFound {
                locator: locator.to_string(),
            })
    }
}

/// Displayed: attached, not hidden by style, a non-empty box, and inside the
/// viewport. Off-canvas menus translated out of view count as hidden.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub(crate) const IS_DISPLAYED_JS: &str = "function() { \
    if (!this.isConnected) { return false; } \
    const style = window.getComputedStyle(this); \
    if (style.display === 'none' || style.visibility === 'hidden' || Number(style.opacity) === 0) { return false; } \
    const rect = this.getBoundingClientRect(); \
    if (rect.width <= 0 || rect.height <= 0) { return false; } \
    const vw = window.innerWidth || document.documentElement.clientWidth; \
    const vh = window.innerHeight || document.documentElement.clientHeight; \
    return rect.right > 0 && rect.bottom > 0 && rect.left < vw && rect.top < vh; \
}";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub(crate) const IS_ENABLED_JS: &str = "function() { return !this.disabled; }";

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{Locator, SauceError, SauceResult, StoreDriver, IS_DISPLAYED_JS, IS_ENABLED_JS};
    use async_trait::async_trait;
    use chromiumoxide::element::Element;
    use chromiumoxide::error::CdpError;
    use chromiumoxide::page::Page;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Messages chromium uses for nodes that left the document
    const STALE_MARKERS: [&str; 4] = [
        "Could not find node",
        "No node with given id",
        "Node is detached",
        "Cannot find context with specified id",
    ];

    fn classify(err: CdpError) -> SauceError {
        let message = err.to_string();
        if STALE_MARKERS.iter().any(|m| message.contains(m)) {
            SauceError::StaleElement { message }
        } else {
            SauceError::Driver { message }
        }
    }

    /// Driver over one chromium page
    #[derive(Debug, Clone)]
    pub struct ChromiumDriver {
        page: Arc<Mutex<Page>>,
    }

    impl ChromiumDriver {
        /// Wrap an open CDP page
        #[must_use]
        pub fn new(page: Page) -> Self {
            Self {
                page: Arc::new(Mutex::new(page)),
            }
        }

        async fn eval_bool(element: &Element, function: &str) -> SauceResult<bool> {
            let returns = element
                .call_js_fn(function, false)
                .await
                .map_err(classify)?;
            Ok(returns
                .result
                .value
                .and_then(|v| v.as_bool())
                .unwrap_or(false))
        }
    }

    #[async_trait]
    impl StoreDriver for ChromiumDriver {
        type Element = Element;

        async fn navigate(&self, url: &str) -> SauceResult<()> {
            let page = self.page.lock().await;
            page.goto(url)
                .await
                .map_err(|e| SauceError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> SauceResult<String> {
            let page = self.page.lock().await;
            let url = page.url().await.map_err(classify)?;
            Ok(url.unwrap_or_default())
        }

        async fn find_all(&self, locator: &Locator) -> SauceResult<Vec<Element>> {
            let page = self.page.lock().await;
            page.find_elements(locator.to_css())
                .await
                .map_err(classify)
        }

        async fn find_all_in(&self, scope: &Element, locator: &Locator) -> SauceResult<Vec<Element>> {
            scope
                .find_elements(locator.to_css())
                .await
                .map_err(classify)
        }

        async fn text(&self, element: &Element) -> SauceResult<String> {
            let text = element.inner_text().await.map_err(classify)?;
            Ok(text.unwrap_or_default())
        }

        async fn is_displayed(&self, element: &Element) -> SauceResult<bool> {
            Self::eval_bool(element, IS_DISPLAYED_JS).await
        }

        async fn is_enabled(&self, element: &Element) -> SauceResult<bool> {
            Self::eval_bool(element, IS_ENABLED_JS).await
        }

        async fn click(&self, element: &Element) -> SauceResult<()> {
            element.click().await.map_err(classify)?;
            Ok(())
        }

        async fn send_keys(&self, element: &Element, text: &str) -> SauceResult<()> {
            element.focus().await.map_err(classify)?;
            element.type_str(text).await.map_err(classify)?;
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::locator::dom;
    use crate::mock::MockStorefront;

    mod script_tests {
        use super::*;

        #[test]
        fn test_displayed_requires_viewport_intersection() {
            for term in ["rect.right > 0", "rect.bottom > 0", "rect.left < vw", "rect.top < vh"] {
                assert!(IS_DISPLAYED_JS.contains(term), "missing {term}");
            }
            assert!(IS_DISPLAYED_JS.contains("window.innerWidth"));
        }

        #[test]
        fn test_scripts_are_function_declarations() {
            for script in [IS_DISPLAYED_JS, IS_ENABLED_JS] {
                assert!(script.starts_with("function() {"));
                assert!(script.ends_with('}'));
            }
        }
    }

    mod provided_method_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_find_returns_first_match() {
            let shop = MockStorefront::new();
            shop.navigate("https://www.saucedemo.com/").await.unwrap();
            let field = shop.find(&dom::USERNAME).await.unwrap();
            assert!(shop.is_enabled(&field).await.unwrap());
        }

        #[tokio::test(start_paused = true)]
        async fn test_find_reports_missing_locator() {
            let shop = MockStorefront::new();
            shop.navigate("https://www.saucedemo.com/").await.unwrap();
            let err = shop.find(&dom::CHECKOUT).await.unwrap_err();
            match err {
                SauceError::ElementNotFound { locator } => assert_eq!(locator, "id=checkout"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_find_in_is_scoped() {
            let shop = MockStorefront::new().logged_in();
            shop.navigate("https://www.saucedemo.com/inventory.html")
                .await
                .unwrap();
            let cards = shop.find_all(&dom::INVENTORY_ITEM).await.unwrap();
            assert!(cards.len() > 1);
            let name = shop.find_in(&cards[1], &dom::ITEM_NAME).await.unwrap();
            assert_eq!(shop.text(&name).await.unwrap(), "Sauce Labs Bike Light");
            let err = shop.find_in(&cards[1], &dom::CART_LIST).await.unwrap_err();
            assert!(err.is_transient());
        }
    }
}
