//! In-memory storefront for offline tests.
//!
//! [`MockStorefront`] implements [`StoreDriver`] over a small model of the
//! storefront's DOM contract: the same ids, classes and `data-test` hooks,
//! the same page transitions, and the same asynchronous rendering. Timing
//! knobs (render delay, add-to-cart confirmation delay, checkout button
//! settle time) read `tokio::time`, so tests run on a paused clock.
//!
//! Element handles carry the page epoch they were found on. Any page change
//! bumps the epoch, which turns old handles stale the way a real navigation
//! does.

use crate::driver::StoreDriver;
use crate::locator::Locator;
use crate::result::{SauceError, SauceResult};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// How long the side menu takes to slide in
pub const MENU_ANIMATION: Duration = Duration::from_millis(250);

const DEFAULT_ORIGIN: &str = "https://www.saucedemo.com";
const PASSWORD: &str = "secret_sauce";
const ACCEPTED_USERS: [&str; 6] = [
    "standard_user",
    "locked_out_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

/// One product in the mock catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Display name
    pub name: String,
    /// Description text
    pub description: String,
    /// Rendered price, e.g. `$29.99`
    pub price: String,
}

impl Product {
    /// Create a product
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price: price.into(),
        }
    }

    fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }
}

/// The storefront's six products, in default (name ascending) order
#[must_use]
pub fn default_catalog() -> Vec<Product> {
    vec![
        Product::new(
            "Sauce Labs Backpack",
            "carry.allTheThings() with the sleek, streamlined Sly Pack that melds uncompromising style with unequaled laptop and tablet protection.",
            "$29.99",
        ),
        Product::new(
            "Sauce Labs Bike Light",
            "A red light isn't the desired state in testing but it sure helps when riding your bike at night. Water-resistant with 3 lighting modes, 1 AAA battery included.",
            "$9.99",
        ),
        Product::new(
            "Sauce Labs Bolt T-Shirt",
            "Get your testing superhero on with the Sauce Labs bolt T-shirt. From American Apparel, 100% ringspun combed cotton, heather gray with red bolt.",
            "$15.99",
        ),
        Product::new(
            "Sauce Labs Fleece Jacket",
            "It's not every day that you come across a midweight quarter-zip fleece jacket capable of handling everything from a relaxing day outdoors to a busy day at the office.",
            "$49.99",
        ),
        Product::new(
            "Sauce Labs Onesie",
            "Rib snap infant onesie for the junior automation engineer in development. Reinforced 3-snap bottom closure, two-needle hemmed sleeved and bottom won't unravel.",
            "$7.99",
        ),
        Product::new(
            "Test.allTheThings() T-Shirt (Red)",
            "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests. Super-soft and comfy ringspun combed cotton.",
            "$15.99",
        ),
    ]
}

/// Which signals confirm an add-to-cart click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Confirmation {
    /// Button flips to "Remove" and the badge updates
    #[default]
    Both,
    /// Only the badge updates
    BadgeOnly,
    /// Only the button flips
    ButtonOnly,
    /// The click is swallowed
    Silent,
}

impl Confirmation {
    const fn shows_badge(self) -> bool {
        matches!(self, Self::Both | Self::BadgeOnly)
    }

    const fn flips_button(self) -> bool {
        matches!(self, Self::Both | Self::ButtonOnly)
    }
}

/// Behavior of the side menu's reset link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMenu {
    /// Opens, and the reset link clears the cart
    #[default]
    Working,
    /// The menu opens but has no reset link
    Missing,
    /// The burger button does nothing
    Unresponsive,
}

/// Pages the mock can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockPage {
    /// Login form at the origin
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
    Complete,
}

impl MockPage {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "" | "index.html" => Some(Self::Login),
            "inventory.html" => Some(Self::Inventory),
            "cart.html" => Some(Self::Cart),
            "checkout-step-one.html" => Some(Self::CheckoutInfo),
            "checkout-step-two.html" => Some(Self::CheckoutSummary),
            "checkout-complete.html" => Some(Self::Complete),
            _ => None,
        }
    }

    const fn path(self) -> &'static str {
        match self {
            Self::Login => "",
            Self::Inventory => "inventory.html",
            Self::Cart => "cart.html",
            Self::CheckoutInfo => "checkout-step-one.html",
            Self::CheckoutSummary => "checkout-step-two.html",
            Self::Complete => "checkout-complete.html",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Username,
    Password,
    LoginError,
    LoginButton,
    MenuOpen,
    MenuReset,
    MenuClose,
    CartLink,
    CartBadge,
    InventoryContainer,
    Card(usize),
    CardName(usize),
    CardDescription(usize),
    CardPrice(usize),
    CardButton(usize),
    CartList,
    CartItem(usize),
    CartItemQuantity(usize),
    CartItemName(usize),
    CartItemDescription(usize),
    CartItemPrice(usize),
    CartItemRemove(usize),
    ContinueShopping,
    Checkout,
    CheckoutInfo,
    FirstName,
    LastName,
    PostalCode,
    FormError,
    Cancel,
    Continue,
    CheckoutSummary,
    Finish,
    CompleteHeader,
    BackHome,
}

impl Node {
    const fn tag(self) -> &'static str {
        match self {
            Self::Username
            | Self::Password
            | Self::LoginButton
            | Self::FirstName
            | Self::LastName
            | Self::PostalCode
            | Self::Continue => "input",
            Self::LoginError | Self::FormError => "h3",
            Self::CompleteHeader => "h2",
            Self::MenuOpen
            | Self::MenuClose
            | Self::CardButton(_)
            | Self::CartItemRemove(_)
            | Self::ContinueShopping
            | Self::Checkout
            | Self::Cancel
            | Self::Finish
            | Self::BackHome => "button",
            Self::MenuReset | Self::CartLink => "a",
            Self::CartBadge => "span",
            _ => "div",
        }
    }

    const fn classes(self) -> &'static [&'static str] {
        match self {
            Self::Username | Self::Password | Self::FirstName | Self::LastName | Self::PostalCode => {
                &["input_error", "form_input"]
            }
            Self::LoginButton | Self::Continue => &["submit-button", "btn", "btn_action"],
            Self::MenuReset => &["bm-item", "menu-item"],
            Self::CartLink => &["shopping_cart_link"],
            Self::CartBadge => &["shopping_cart_badge"],
            Self::Card(_) => &["inventory_item"],
            Self::CardName(_) | Self::CartItemName(_) => &["inventory_item_name"],
            Self::CardDescription(_) | Self::CartItemDescription(_) => &["inventory_item_desc"],
            Self::CardPrice(_) | Self::CartItemPrice(_) => &["inventory_item_price"],
            Self::CardButton(_) => &["btn", "btn_primary", "btn_small", "btn_inventory"],
            Self::CartList => &["cart_list"],
            Self::CartItem(_) => &["cart_item"],
            Self::CartItemQuantity(_) => &["cart_quantity"],
            Self::CartItemRemove(_) => &["btn", "btn_secondary", "btn_small", "cart_button"],
            Self::CompleteHeader => &["complete-header"],
            _ => &[],
        }
    }

    const fn fixed_id(self) -> Option<&'static str> {
        match self {
            Self::Username => Some("user-name"),
            Self::Password => Some("password"),
            Self::LoginButton => Some("login-button"),
            Self::MenuOpen => Some("react-burger-menu-btn"),
            Self::MenuReset => Some("reset_sidebar_link"),
            Self::MenuClose => Some("react-burger-cross-btn"),
            Self::InventoryContainer => Some("inventory_container"),
            Self::ContinueShopping => Some("continue-shopping"),
            Self::Checkout => Some("checkout"),
            Self::CheckoutInfo => Some("checkout_info_container"),
            Self::FirstName => Some("first-name"),
            Self::LastName => Some("last-name"),
            Self::PostalCode => Some("postal-code"),
            Self::Cancel => Some("cancel"),
            Self::Continue => Some("continue"),
            Self::CheckoutSummary => Some("checkout_summary_container"),
            Self::Finish => Some("finish"),
            Self::BackHome => Some("back-to-products"),
            _ => None,
        }
    }

    const fn data_test(self) -> Option<&'static str> {
        match self {
            Self::LoginError | Self::FormError => Some("error"),
            _ => None,
        }
    }

    const fn parent(self) -> Option<Self> {
        match self {
            Self::Card(_) => Some(Self::InventoryContainer),
            Self::CardName(i) | Self::CardDescription(i) | Self::CardPrice(i) | Self::CardButton(i) => {
                Some(Self::Card(i))
            }
            Self::CartItem(_) => Some(Self::CartList),
            Self::CartItemQuantity(i)
            | Self::CartItemName(i)
            | Self::CartItemDescription(i)
            | Self::CartItemPrice(i)
            | Self::CartItemRemove(i) => Some(Self::CartItem(i)),
            Self::CartBadge => Some(Self::CartLink),
            Self::FirstName | Self::LastName | Self::PostalCode | Self::FormError => {
                Some(Self::CheckoutInfo)
            }
            _ => None,
        }
    }

    const fn is_input(self) -> bool {
        matches!(
            self,
            Self::Username | Self::Password | Self::FirstName | Self::LastName | Self::PostalCode
        )
    }

    fn is_within(self, scope: Self) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node == scope {
                return true;
            }
            current = node.parent();
        }
        false
    }
}

/// Handle to a node of the mock DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockElement {
    epoch: u64,
    node: Node,
}

#[derive(Debug, Clone, Copy)]
struct CartEntry {
    product: usize,
    confirmed_at: Instant,
}

#[derive(Debug, Default)]
struct Form {
    first: String,
    second: String,
    third: String,
}

#[derive(Debug)]
struct State {
    origin: String,
    page: MockPage,
    epoch: u64,
    loaded_at: Instant,
    logged_in: bool,
    cart: Vec<CartEntry>,
    menu_opened_at: Option<Instant>,
    login: Form,
    login_error: Option<String>,
    shipping: Form,
    form_error: Option<String>,
    history: Vec<String>,
}

impl State {
    fn new() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            page: MockPage::Login,
            epoch: 0,
            loaded_at: Instant::now(),
            logged_in: false,
            cart: Vec::new(),
            menu_opened_at: None,
            login: Form::default(),
            login_error: None,
            shipping: Form::default(),
            form_error: None,
            history: Vec::new(),
        }
    }

    fn show(&mut self, page: MockPage) {
        self.page = page;
        self.epoch += 1;
        self.loaded_at = Instant::now();
        self.menu_opened_at = None;
        self.form_error = None;
        if page != MockPage::Login {
            self.login_error = None;
        }
    }

    fn url(&self) -> String {
        format!("{}/{}", self.origin, self.page.path())
    }

    fn confirmed(&self) -> impl Iterator<Item = usize> + '_ {
        let now = Instant::now();
        self.cart
            .iter()
            .filter(move |e| e.confirmed_at <= now)
            .map(|e| e.product)
    }

    fn is_confirmed(&self, product: usize) -> bool {
        self.confirmed().any(|p| p == product)
    }
}

/// Scriptable in-memory storefront
#[derive(Debug)]
pub struct MockStorefront {
    catalog: Vec<Product>,
    render_delay: Duration,
    confirm_delay: Duration,
    checkout_settle: Duration,
    confirmation: Confirmation,
    reset_menu: ResetMenu,
    state: Mutex<State>,
}

impl Default for MockStorefront {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStorefront {
    /// Storefront with the default catalogue, rendering instantly
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: default_catalog(),
            render_delay: Duration::ZERO,
            confirm_delay: Duration::ZERO,
            checkout_settle: Duration::ZERO,
            confirmation: Confirmation::default(),
            reset_menu: ResetMenu::default(),
            state: Mutex::new(State::new()),
        }
    }

    /// Start with an authenticated session
    #[must_use]
    pub fn logged_in(mut self) -> Self {
        if let Ok(state) = self.state.get_mut() {
            state.logged_in = true;
        }
        self
    }

    /// Start with products already in the cart, as a previous run would leave it
    #[must_use]
    pub fn with_cart(mut self, names: &[&str]) -> Self {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|name| self.catalog.iter().position(|p| p.name == *name))
            .collect();
        if let Ok(state) = self.state.get_mut() {
            let now = Instant::now();
            state.cart.extend(indices.into_iter().map(|product| CartEntry {
                product,
                confirmed_at: now,
            }));
        }
        self
    }

    /// Delay between a page change and its content becoming visible
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Delay between an add-to-cart click and its confirmation
    #[must_use]
    pub const fn with_confirm_delay(mut self, delay: Duration) -> Self {
        self.confirm_delay = delay;
        self
    }

    /// Time the cart's checkout button stays disabled after the cart renders
    #[must_use]
    pub const fn with_checkout_settle(mut self, settle: Duration) -> Self {
        self.checkout_settle = settle;
        self
    }

    /// Which signals confirm an add-to-cart click
    #[must_use]
    pub const fn with_confirmation(mut self, confirmation: Confirmation) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Behavior of the side menu
    #[must_use]
    pub const fn with_reset_menu(mut self, reset_menu: ResetMenu) -> Self {
        self.reset_menu = reset_menu;
        self
    }

    /// Replace the product catalogue
    #[must_use]
    pub fn with_catalog(mut self, catalog: Vec<Product>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Every navigation, click and keystroke batch so far
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Whether `entry` appears in the history
    #[must_use]
    pub fn was_called(&self, entry: &str) -> bool {
        self.history().iter().any(|h| h == entry)
    }

    /// Names of the products currently in the cart, in the order they were added
    #[must_use]
    pub fn cart_contents(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| {
                s.confirmed()
                    .map(|i| self.catalog[i].name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Page currently rendered
    #[must_use]
    pub fn page(&self) -> Option<MockPage> {
        self.state.lock().ok().map(|s| s.page)
    }

    fn lock(&self) -> SauceResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| SauceError::driver("mock storefront state poisoned"))
    }

    fn render(&self, state: &State) -> Vec<Node> {
        let mut nodes = Vec::new();
        if state.page == MockPage::Login {
            nodes.extend([Node::Username, Node::Password]);
            if state.login_error.is_some() {
                nodes.push(Node::LoginError);
            }
            nodes.push(Node::LoginButton);
            return nodes;
        }

        nodes.push(Node::MenuOpen);
        if self.reset_menu != ResetMenu::Missing {
            nodes.push(Node::MenuReset);
        }
        nodes.extend([Node::MenuClose, Node::CartLink]);
        if self.confirmation.shows_badge() && state.confirmed().next().is_some() {
            nodes.push(Node::CartBadge);
        }

        match state.page {
            MockPage::Login => {}
            MockPage::Inventory => {
                nodes.push(Node::InventoryContainer);
                for i in 0..self.catalog.len() {
                    nodes.extend([
                        Node::Card(i),
                        Node::CardName(i),
                        Node::CardDescription(i),
                        Node::CardPrice(i),
                        Node::CardButton(i),
                    ]);
                }
            }
            MockPage::Cart | MockPage::CheckoutSummary => {
                let summary = state.page == MockPage::CheckoutSummary;
                if summary {
                    nodes.push(Node::CheckoutSummary);
                }
                nodes.push(Node::CartList);
                for i in state.confirmed() {
                    nodes.extend([
                        Node::CartItem(i),
                        Node::CartItemQuantity(i),
                        Node::CartItemName(i),
                        Node::CartItemDescription(i),
                        Node::CartItemPrice(i),
                    ]);
                    if !summary {
                        nodes.push(Node::CartItemRemove(i));
                    }
                }
                if summary {
                    nodes.extend([Node::Cancel, Node::Finish]);
                } else {
                    nodes.extend([Node::ContinueShopping, Node::Checkout]);
                }
            }
            MockPage::CheckoutInfo => {
                nodes.extend([
                    Node::CheckoutInfo,
                    Node::FirstName,
                    Node::LastName,
                    Node::PostalCode,
                ]);
                if state.form_error.is_some() {
                    nodes.push(Node::FormError);
                }
                nodes.extend([Node::Cancel, Node::Continue]);
            }
            MockPage::Complete => nodes.extend([Node::CompleteHeader, Node::BackHome]),
        }
        nodes
    }

    fn resolve(&self, state: &State, element: &MockElement) -> SauceResult<Node> {
        if element.epoch != state.epoch || !self.render(state).contains(&element.node) {
            return Err(SauceError::StaleElement {
                message: format!("{:?} is no longer attached to the document", element.node),
            });
        }
        Ok(element.node)
    }

    fn matches(&self, state: &State, node: Node, locator: &Locator) -> SauceResult<bool> {
        Ok(match locator {
            Locator::Id(id) => node.fixed_id().map_or_else(
                || self.dynamic_id(state, node).as_deref() == Some(id.as_ref()),
                |fixed| fixed == id,
            ),
            Locator::ClassName(class) => node.classes().iter().any(|c| *c == class),
            Locator::TagName(tag) => node.tag().eq_ignore_ascii_case(tag),
            Locator::Css(css) => {
                let value = css
                    .strip_prefix("[data-test=\"")
                    .and_then(|rest| rest.strip_suffix("\"]"))
                    .ok_or_else(|| SauceError::driver(format!("unsupported selector {css:?}")))?;
                node.data_test() == Some(value)
            }
        })
    }

    fn dynamic_id(&self, state: &State, node: Node) -> Option<String> {
        match node {
            Node::CardButton(i) => {
                let verb = if self.confirmation.flips_button() && state.is_confirmed(i) {
                    "remove"
                } else {
                    "add-to-cart"
                };
                Some(format!("{verb}-{}", self.catalog[i].slug()))
            }
            Node::CartItemRemove(i) => Some(format!("remove-{}", self.catalog[i].slug())),
            _ => None,
        }
    }

    fn label(&self, node: Node) -> String {
        if let Some(id) = node.fixed_id() {
            return format!("#{id}");
        }
        match node {
            Node::CardButton(i) => format!("button[{}]", self.catalog[i].name),
            Node::CartItemRemove(i) => format!("remove[{}]", self.catalog[i].name),
            other => node
                .classes()
                .first()
                .map_or_else(|| format!("{other:?}"), |class| format!(".{class}")),
        }
    }

    fn is_visible(&self, state: &State, node: Node) -> bool {
        let now = Instant::now();
        if now < state.loaded_at + self.render_delay {
            return false;
        }
        match node {
            Node::MenuReset | Node::MenuClose => state
                .menu_opened_at
                .is_some_and(|opened| now >= opened + MENU_ANIMATION),
            _ => true,
        }
    }

    fn is_interactive(&self, state: &State, node: Node) -> bool {
        match node {
            Node::Checkout => Instant::now() >= state.loaded_at + self.checkout_settle,
            _ => true,
        }
    }

    fn node_text(&self, state: &State, node: Node) -> String {
        let product = |i: usize| &self.catalog[i];
        match node {
            Node::LoginError => state.login_error.clone().unwrap_or_default(),
            Node::FormError => state.form_error.clone().unwrap_or_default(),
            Node::MenuOpen => "Open Menu".to_string(),
            Node::MenuClose => "Close Menu".to_string(),
            Node::MenuReset => "Reset App State".to_string(),
            Node::CartBadge | Node::CartLink => {
                let count = state.confirmed().count();
                if node == Node::CartBadge || (self.confirmation.shows_badge() && count > 0) {
                    count.to_string()
                } else {
                    String::new()
                }
            }
            Node::CardName(i) | Node::CartItemName(i) => product(i).name.clone(),
            Node::CardDescription(i) | Node::CartItemDescription(i) => {
                product(i).description.clone()
            }
            Node::CardPrice(i) | Node::CartItemPrice(i) => product(i).price.clone(),
            Node::CardButton(i) => {
                if self.confirmation.flips_button() && state.is_confirmed(i) {
                    "Remove".to_string()
                } else {
                    "Add to cart".to_string()
                }
            }
            Node::CartItemQuantity(_) => "1".to_string(),
            Node::CartItemRemove(_) => "Remove".to_string(),
            Node::ContinueShopping => "Continue Shopping".to_string(),
            Node::Checkout => "Checkout".to_string(),
            Node::Cancel => "Cancel".to_string(),
            Node::Finish => "Finish".to_string(),
            Node::CompleteHeader => "Thank you for your order!".to_string(),
            Node::BackHome => "Back Home".to_string(),
            _ => String::new(),
        }
    }

    fn submit_login(state: &mut State) {
        let username = state.login.first.clone();
        let password = state.login.second.clone();
        let error = if username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if !(password == PASSWORD && ACCEPTED_USERS.contains(&username.as_str())) {
            Some("Epic sadface: Username and password do not match any user in this service")
        } else if username == "locked_out_user" {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else {
            None
        };

        match error {
            Some(message) => {
                tracing::debug!(%username, message, "mock login rejected");
                state.login_error = Some(message.to_string());
            }
            None => {
                state.logged_in = true;
                state.login = Form::default();
                state.show(MockPage::Inventory);
            }
        }
    }

    fn submit_shipping(state: &mut State) {
        let error = if state.shipping.first.is_empty() {
            Some("Error: First Name is required")
        } else if state.shipping.second.is_empty() {
            Some("Error: Last Name is required")
        } else if state.shipping.third.is_empty() {
            Some("Error: Postal Code is required")
        } else {
            None
        };
        match error {
            Some(message) => state.form_error = Some(message.to_string()),
            None => {
                state.shipping = Form::default();
                state.show(MockPage::CheckoutSummary);
            }
        }
    }

    fn toggle_product(&self, state: &mut State, product: usize) {
        if self.confirmation == Confirmation::Silent {
            tracing::debug!(product = %self.catalog[product].name, "mock swallowed add-to-cart click");
            return;
        }
        if let Some(pos) = state.cart.iter().position(|e| e.product == product) {
            state.cart.remove(pos);
        } else {
            state.cart.push(CartEntry {
                product,
                confirmed_at: Instant::now() + self.confirm_delay,
            });
        }
    }

    fn activate(&self, state: &mut State, node: Node) {
        match node {
            Node::LoginButton => Self::submit_login(state),
            Node::MenuOpen => {
                if self.reset_menu != ResetMenu::Unresponsive {
                    state.menu_opened_at = Some(Instant::now());
                }
            }
            Node::MenuClose => state.menu_opened_at = None,
            Node::MenuReset => state.cart.clear(),
            Node::CartLink => state.show(MockPage::Cart),
            Node::CardButton(i) => self.toggle_product(state, i),
            Node::CartItemRemove(i) => state.cart.retain(|e| e.product != i),
            Node::ContinueShopping | Node::BackHome => state.show(MockPage::Inventory),
            Node::Checkout => state.show(MockPage::CheckoutInfo),
            Node::Continue => Self::submit_shipping(state),
            Node::Cancel => {
                let back = if state.page == MockPage::CheckoutInfo {
                    MockPage::Cart
                } else {
                    MockPage::Inventory
                };
                state.show(back);
            }
            Node::Finish => {
                state.cart.clear();
                state.show(MockPage::Complete);
            }
            _ => {}
        }
    }
}

fn split_url(url: &str) -> Option<(String, String)> {
    let (scheme, rest) = url.split_once("://")?;
    if scheme != "http" && scheme != "https" {
        return None;
    }
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let path = path.split(['?', '#']).next().unwrap_or_default();
    Some((format!("{scheme}://{host}"), path.to_string()))
}

#[async_trait]
impl StoreDriver for MockStorefront {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> SauceResult<()> {
        let mut state = self.lock()?;
        state.history.push(format!("navigate {url}"));

        let navigation_error = |message: &str| SauceError::Navigation {
            url: url.to_string(),
            message: message.to_string(),
        };
        let (origin, path) = split_url(url).ok_or_else(|| navigation_error("unsupported URL"))?;
        let page = MockPage::from_path(&path).ok_or_else(|| navigation_error("404 Not Found"))?;

        state.origin = origin;
        if page != MockPage::Login && !state.logged_in {
            state.show(MockPage::Login);
            state.login_error = Some(format!(
                "Epic sadface: You can only access '/{path}' when you are logged in."
            ));
        } else {
            state.show(page);
        }
        Ok(())
    }

    async fn current_url(&self) -> SauceResult<String> {
        Ok(self.lock()?.url())
    }

    async fn find_all(&self, locator: &Locator) -> SauceResult<Vec<MockElement>> {
        let state = self.lock()?;
        let mut found = Vec::new();
        for node in self.render(&state) {
            if self.matches(&state, node, locator)? {
                found.push(MockElement {
                    epoch: state.epoch,
                    node,
                });
            }
        }
        Ok(found)
    }

    async fn find_all_in(
        &self,
        scope: &MockElement,
        locator: &Locator,
    ) -> SauceResult<Vec<MockElement>> {
        let state = self.lock()?;
        let scope = self.resolve(&state, scope)?;
        let mut found = Vec::new();
        for node in self.render(&state) {
            if node.is_within(scope) && self.matches(&state, node, locator)? {
                found.push(MockElement {
                    epoch: state.epoch,
                    node,
                });
            }
        }
        Ok(found)
    }

    async fn text(&self, element: &MockElement) -> SauceResult<String> {
        let state = self.lock()?;
        let node = self.resolve(&state, element)?;
        Ok(self.node_text(&state, node))
    }

    async fn is_displayed(&self, element: &MockElement) -> SauceResult<bool> {
        let state = self.lock()?;
        let node = self.resolve(&state, element)?;
        Ok(self.is_visible(&state, node))
    }

    async fn is_enabled(&self, element: &MockElement) -> SauceResult<bool> {
        let state = self.lock()?;
        let node = self.resolve(&state, element)?;
        Ok(self.is_interactive(&state, node))
    }

    async fn click(&self, element: &MockElement) -> SauceResult<()> {
        let mut state = self.lock()?;
        let node = self.resolve(&state, element)?;
        let label = self.label(node);
        if !self.is_visible(&state, node) {
            return Err(SauceError::driver(format!(
                "element {label} is not interactable"
            )));
        }
        state.history.push(format!("click {label}"));
        if !self.is_interactive(&state, node) {
            tracing::debug!(element = %label, "click on disabled element ignored");
            return Ok(());
        }
        self.activate(&mut state, node);
        Ok(())
    }

    async fn send_keys(&self, element: &MockElement, text: &str) -> SauceResult<()> {
        let mut state = self.lock()?;
        let node = self.resolve(&state, element)?;
        let label = self.label(node);
        if !node.is_input() || !self.is_visible(&state, node) {
            return Err(SauceError::driver(format!(
                "element {label} does not accept keyboard input"
            )));
        }
        state.history.push(format!("type {label}"));
        let field = match node {
            Node::Username => &mut state.login.first,
            Node::Password => &mut state.login.second,
            Node::FirstName => &mut state.shipping.first,
            Node::LastName => &mut state.shipping.second,
            _ => &mut state.shipping.third,
        };
        field.push_str(text);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::locator::dom;

    const ROOT: &str = "https://www.saucedemo.com/";
    const INVENTORY: &str = "https://www.saucedemo.com/inventory.html";

    async fn login(shop: &MockStorefront, username: &str, password: &str) {
        shop.navigate(ROOT).await.unwrap();
        let user = shop.find(&dom::USERNAME).await.unwrap();
        shop.send_keys(&user, username).await.unwrap();
        let pass = shop.find(&dom::PASSWORD).await.unwrap();
        shop.send_keys(&pass, password).await.unwrap();
        let button = shop.find(&dom::LOGIN_BUTTON).await.unwrap();
        shop.click(&button).await.unwrap();
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_guarded_pages_redirect_to_login() {
            let shop = MockStorefront::new();
            shop.navigate(INVENTORY).await.unwrap();
            assert_eq!(shop.page(), Some(MockPage::Login));
            let banner = shop.find(&dom::login_error()).await.unwrap();
            assert_eq!(
                shop.text(&banner).await.unwrap(),
                "Epic sadface: You can only access '/inventory.html' when you are logged in."
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_unknown_path_is_navigation_error() {
            let shop = MockStorefront::new().logged_in();
            let err = shop.navigate("https://www.saucedemo.com/nope.html").await.unwrap_err();
            assert!(matches!(err, SauceError::Navigation { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_current_url_follows_clicks() {
            let shop = MockStorefront::new().logged_in();
            shop.navigate(INVENTORY).await.unwrap();
            let link = shop.find(&dom::CART_LINK).await.unwrap();
            shop.click(&link).await.unwrap();
            assert_eq!(
                shop.current_url().await.unwrap(),
                "https://www.saucedemo.com/cart.html"
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_handles_go_stale_after_navigation() {
            let shop = MockStorefront::new().logged_in();
            shop.navigate(INVENTORY).await.unwrap();
            let container = shop.find(&dom::INVENTORY_CONTAINER).await.unwrap();
            shop.navigate(INVENTORY).await.unwrap();
            let err = shop.is_displayed(&container).await.unwrap_err();
            assert!(matches!(err, SauceError::StaleElement { .. }));
        }
    }

    mod login_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_valid_login_lands_on_inventory() {
            let shop = MockStorefront::new();
            login(&shop, "standard_user", "secret_sauce").await;
            assert_eq!(shop.page(), Some(MockPage::Inventory));
            assert!(shop.was_called("click #login-button"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_locked_out_user() {
            let shop = MockStorefront::new();
            login(&shop, "locked_out_user", "secret_sauce").await;
            assert_eq!(shop.page(), Some(MockPage::Login));
            let banner = shop.find(&dom::login_error()).await.unwrap();
            assert!(shop.text(&banner).await.unwrap().contains("locked out"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_wrong_password() {
            let shop = MockStorefront::new();
            login(&shop, "standard_user", "nope").await;
            let banner = shop.find(&dom::login_error()).await.unwrap();
            assert!(shop
                .text(&banner)
                .await
                .unwrap()
                .contains("do not match any user"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_typing_into_a_button_fails() {
            let shop = MockStorefront::new();
            shop.navigate(ROOT).await.unwrap();
            let button = shop.find(&dom::LOGIN_BUTTON).await.unwrap();
            assert!(shop.send_keys(&button, "x").await.is_err());
        }
    }

    mod cart_tests {
        use super::*;

        async fn card_button(shop: &MockStorefront, index: usize) -> MockElement {
            let cards = shop.find_all(&dom::INVENTORY_ITEM).await.unwrap();
            shop.find_in(&cards[index], &dom::BUTTON).await.unwrap()
        }

        #[tokio::test(start_paused = true)]
        async fn test_add_flips_button_and_badge() {
            let shop = MockStorefront::new().logged_in();
            shop.navigate(INVENTORY).await.unwrap();
            let button = card_button(&shop, 0).await;
            assert_eq!(shop.text(&button).await.unwrap(), "Add to cart");
            shop.click(&button).await.unwrap();
            assert_eq!(shop.text(&button).await.unwrap(), "Remove");
            let badge = shop.find(&dom::CART_BADGE).await.unwrap();
            assert_eq!(shop.text(&badge).await.unwrap(), "1");
            assert_eq!(shop.cart_contents(), vec!["Sauce Labs Backpack"]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_confirmation_delay() {
            let shop = MockStorefront::new()
                .logged_in()
                .with_confirm_delay(Duration::from_millis(600));
            shop.navigate(INVENTORY).await.unwrap();
            let button = card_button(&shop, 2).await;
            shop.click(&button).await.unwrap();
            assert!(shop.find_all(&dom::CART_BADGE).await.unwrap().is_empty());
            tokio::time::advance(Duration::from_millis(600)).await;
            assert_eq!(shop.find_all(&dom::CART_BADGE).await.unwrap().len(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_badge_only_keeps_label() {
            let shop = MockStorefront::new()
                .logged_in()
                .with_confirmation(Confirmation::BadgeOnly);
            shop.navigate(INVENTORY).await.unwrap();
            let button = card_button(&shop, 0).await;
            shop.click(&button).await.unwrap();
            assert_eq!(shop.text(&button).await.unwrap(), "Add to cart");
            assert_eq!(shop.find_all(&dom::CART_BADGE).await.unwrap().len(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_silent_click_changes_nothing() {
            let shop = MockStorefront::new()
                .logged_in()
                .with_confirmation(Confirmation::Silent);
            shop.navigate(INVENTORY).await.unwrap();
            let button = card_button(&shop, 0).await;
            shop.click(&button).await.unwrap();
            assert!(shop.cart_contents().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_preloaded_cart_and_menu_reset() {
            let shop = MockStorefront::new()
                .logged_in()
                .with_cart(&["Sauce Labs Onesie", "Sauce Labs Backpack"]);
            shop.navigate(INVENTORY).await.unwrap();
            let open = shop.find(&dom::MENU_OPEN).await.unwrap();
            shop.click(&open).await.unwrap();

            let reset = shop.find(&dom::MENU_RESET).await.unwrap();
            assert!(!shop.is_displayed(&reset).await.unwrap());
            assert!(shop.click(&reset).await.is_err());

            tokio::time::advance(MENU_ANIMATION).await;
            shop.click(&reset).await.unwrap();
            assert!(shop.cart_contents().is_empty());
            assert!(shop.find_all(&dom::CART_BADGE).await.unwrap().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_cart_page_lists_items_in_add_order() {
            let shop = MockStorefront::new()
                .logged_in()
                .with_cart(&["Sauce Labs Onesie", "Sauce Labs Backpack"]);
            shop.navigate("https://www.saucedemo.com/cart.html")
                .await
                .unwrap();
            let names = shop.find_all(&dom::ITEM_NAME).await.unwrap();
            assert_eq!(shop.text(&names[0]).await.unwrap(), "Sauce Labs Onesie");
            assert_eq!(shop.text(&names[1]).await.unwrap(), "Sauce Labs Backpack");
        }
    }

    mod checkout_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_missing_first_name_is_rejected() {
            let shop = MockStorefront::new().logged_in();
            shop.navigate("https://www.saucedemo.com/checkout-step-one.html")
                .await
                .unwrap();
            let proceed = shop.find(&dom::CONTINUE).await.unwrap();
            shop.click(&proceed).await.unwrap();
            assert_eq!(shop.page(), Some(MockPage::CheckoutInfo));
            let banner = shop.find(&dom::login_error()).await.unwrap();
            assert_eq!(
                shop.text(&banner).await.unwrap(),
                "Error: First Name is required"
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_disabled_checkout_click_is_ignored() {
            let shop = MockStorefront::new()
                .logged_in()
                .with_checkout_settle(Duration::from_secs(1));
            shop.navigate("https://www.saucedemo.com/cart.html")
                .await
                .unwrap();
            let checkout = shop.find(&dom::CHECKOUT).await.unwrap();
            shop.click(&checkout).await.unwrap();
            assert_eq!(shop.page(), Some(MockPage::Cart));
        }

        #[tokio::test(start_paused = true)]
        async fn test_unsupported_selector() {
            let shop = MockStorefront::new();
            shop.navigate(ROOT).await.unwrap();
            let err = shop.find_all(&Locator::css("div > span")).await.unwrap_err();
            assert!(matches!(err, SauceError::Driver { .. }));
        }
    }
}
