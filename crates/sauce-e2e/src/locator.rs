//! Locators and the storefront's DOM contract.
//!
//! A [`Locator`] is a query by identifier, class, tag or CSS selector. Every
//! backend lowers it to a CSS selector string via [`Locator::to_css`], so the
//! helpers never build selector strings by hand.
//!
//! The [`dom`] module names every element the suite consumes. If the
//! storefront changes its markup, this is the one place to update.

use std::borrow::Cow;
use std::fmt;
use std::fmt::Write as _;

/// A query for one or more DOM elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Element `id` attribute
    Id(Cow<'static, str>),
    /// A single class name
    ClassName(Cow<'static, str>),
    /// Tag name (e.g. `button`)
    TagName(Cow<'static, str>),
    /// Raw CSS selector
    Css(Cow<'static, str>),
}

impl Locator {
    /// Locate by `id`
    #[must_use]
    pub const fn id(id: &'static str) -> Self {
        Self::Id(Cow::Borrowed(id))
    }

    /// Locate by class name
    #[must_use]
    pub const fn class(class: &'static str) -> Self {
        Self::ClassName(Cow::Borrowed(class))
    }

    /// Locate by tag name
    #[must_use]
    pub const fn tag(tag: &'static str) -> Self {
        Self::TagName(Cow::Borrowed(tag))
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<Cow<'static, str>>) -> Self {
        Self::Css(selector.into())
    }

    /// Locate by the storefront's `data-test` attribute
    #[must_use]
    pub fn data_test(value: &str) -> Self {
        Self::Css(Cow::Owned(format!("[data-test={value:?}]")))
    }

    /// Lower to a CSS selector
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(id) => format!("#{}", escape_ident(id)),
            Self::ClassName(class) => format!(".{}", escape_ident(class)),
            Self::TagName(tag) => tag.to_ascii_lowercase(),
            Self::Css(css) => css.to_string(),
        }
    }

    /// Short name of the strategy, used in diagnostics
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::ClassName(_) => "class",
            Self::TagName(_) => "tag",
            Self::Css(_) => "css",
        }
    }

    /// The raw value the locator was built from
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v) | Self::ClassName(v) | Self::TagName(v) | Self::Css(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

/// Escape a CSS identifier (id or class) so it can be used after `#` or `.`
fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for (i, c) in ident.chars().enumerate() {
        let plain = c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii();
        if plain && !(i == 0 && c.is_ascii_digit()) {
            out.push(c);
        } else if c.is_ascii_digit() {
            // leading digit must be a code point escape
            let _ = write!(out, "\\{:x} ", c as u32);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// The DOM contract consumed from the storefront.
#[allow(missing_docs)]
pub mod dom {
    use super::Locator;

    // Login form
    pub const USERNAME: Locator = Locator::id("user-name");
    pub const PASSWORD: Locator = Locator::id("password");
    pub const LOGIN_BUTTON: Locator = Locator::id("login-button");

    /// `[data-test="error"]`, the login form's error banner
    #[must_use]
    pub fn login_error() -> Locator {
        Locator::data_test("error")
    }

    // Inventory
    pub const INVENTORY_CONTAINER: Locator = Locator::id("inventory_container");
    pub const INVENTORY_ITEM: Locator = Locator::class("inventory_item");
    pub const ITEM_NAME: Locator = Locator::class("inventory_item_name");
    pub const ITEM_DESCRIPTION: Locator = Locator::class("inventory_item_desc");
    pub const ITEM_PRICE: Locator = Locator::class("inventory_item_price");
    pub const BUTTON: Locator = Locator::tag("button");

    // Cart
    pub const CART_BADGE: Locator = Locator::class("shopping_cart_badge");
    pub const CART_LINK: Locator = Locator::class("shopping_cart_link");
    pub const CART_LIST: Locator = Locator::class("cart_list");
    pub const CART_QUANTITY: Locator = Locator::class("cart_quantity");

    // Checkout
    pub const CHECKOUT: Locator = Locator::id("checkout");
    pub const CANCEL: Locator = Locator::id("cancel");
    pub const CONTINUE: Locator = Locator::id("continue");
    pub const FINISH: Locator = Locator::id("finish");
    pub const FIRST_NAME: Locator = Locator::id("first-name");
    pub const LAST_NAME: Locator = Locator::id("last-name");
    pub const POSTAL_CODE: Locator = Locator::id("postal-code");
    pub const CHECKOUT_INFO: Locator = Locator::id("checkout_info_container");
    pub const CHECKOUT_SUMMARY: Locator = Locator::id("checkout_summary_container");
    pub const COMPLETE_HEADER: Locator = Locator::class("complete-header");

    // Side menu
    pub const MENU_OPEN: Locator = Locator::id("react-burger-menu-btn");
    pub const MENU_CLOSE: Locator = Locator::id("react-burger-cross-btn");
    pub const MENU_RESET: Locator = Locator::id("reset_sidebar_link");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod lowering_tests {
        use super::*;

        #[test]
        fn test_id_to_css() {
            assert_eq!(dom::USERNAME.to_css(), "#user-name");
            assert_eq!(dom::CHECKOUT_INFO.to_css(), "#checkout_info_container");
        }

        #[test]
        fn test_class_to_css() {
            assert_eq!(dom::INVENTORY_ITEM.to_css(), ".inventory_item");
            assert_eq!(dom::COMPLETE_HEADER.to_css(), ".complete-header");
        }

        #[test]
        fn test_tag_is_lowercased() {
            assert_eq!(Locator::tag("BUTTON").to_css(), "button");
        }

        #[test]
        fn test_css_passthrough() {
            let locator = Locator::css("div.cart_item > .cart_quantity");
            assert_eq!(locator.to_css(), "div.cart_item > .cart_quantity");
        }

        #[test]
        fn test_data_test_attribute() {
            assert_eq!(dom::login_error().to_css(), "[data-test=\"error\"]");
        }

        #[test]
        fn test_special_chars_are_escaped() {
            let locator = Locator::Id("item:4.title".into());
            assert_eq!(locator.to_css(), "#item\\:4\\.title");
        }

        #[test]
        fn test_leading_digit_is_escaped() {
            let locator = Locator::ClassName("4col".into());
            assert_eq!(locator.to_css(), ".\\34 col");
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_display_names_strategy() {
            assert_eq!(dom::CART_BADGE.to_string(), "class=shopping_cart_badge");
            assert_eq!(dom::FINISH.to_string(), "id=finish");
            assert_eq!(dom::BUTTON.to_string(), "tag=button");
        }

        #[test]
        fn test_value_roundtrips_input() {
            assert_eq!(dom::MENU_RESET.value(), "reset_sidebar_link");
            assert_eq!(dom::MENU_RESET.strategy(), "id");
        }
    }
}
