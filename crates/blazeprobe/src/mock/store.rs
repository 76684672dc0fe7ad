//! In-memory DemoBlaze.
//!
//! [`MockStore`] wires a [`MockDriver`] to a small server-side state (users,
//! logged-in user, cart, orders) and rebuilds each document the way the live
//! storefront renders it:
//!
//! - `/` and `/index.html`: navbar, modals and a 9-per-page product grid that
//!   loads after the document and re-renders on category and paging clicks
//! - `/prod.html?idp_=N`: product details, "Add to cart" answered by an alert
//! - `/cart.html`: cart rows with asynchronous deletion, total, place-order
//!   modal and the purchase confirmation
//!
//! Modals fade in and out, requests take a little while; all delays come from
//! [`Timing`]. Server state survives navigation, the document does not.

use super::{MockDom, MockDriver, MockNode, NodeId};
use crate::locator::{Locator, Strategy, UrlMatcher};
use crate::pages::home::Category;
use crate::pages::{about, cart, contact, format_amount, home, login, nav, order, product, signup};
use crate::result::ProbeResult;
use crate::session::{BrowserSession, SessionFactory, SessionSettings};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Products per grid page
pub const PAGE_SIZE: usize = 9;

const ALERT_EMPTY_CREDENTIALS: &str = "Please fill out Username and Password.";
const ALERT_UNKNOWN_USER: &str = "User does not exist.";
const ALERT_WRONG_PASSWORD: &str = "Wrong password.";
const ALERT_USER_EXISTS: &str = "This user already exist.";
const ALERT_SIGN_UP_OK: &str = "Sign up successful.";
const ALERT_PRODUCT_ADDED: &str = "Product added.";
const ALERT_MESSAGE_SENT: &str = "Thanks for the message!!";
const ALERT_ORDER_INCOMPLETE: &str = "Please fill out Name and Creditcard.";
const PURCHASE_HEADING: &str = "Thank you for your purchase!";

/// A catalogue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Id used in `/prod.html?idp_=N`
    pub id: u32,
    /// Title
    pub name: &'static str,
    /// Sidebar category
    pub category: Category,
    /// Price in dollars
    pub price: u32,
    /// Description paragraph
    pub description: &'static str,
}

const fn item(
    id: u32,
    name: &'static str,
    category: Category,
    price: u32,
    description: &'static str,
) -> Product {
    Product {
        id,
        name,
        category,
        price,
        description,
    }
}

/// The storefront's catalogue, in grid order
pub const CATALOGUE: [Product; 15] = [
    item(1, "Samsung galaxy s6", Category::Phones, 360, "The Samsung Galaxy S6 is powered by 1.5GHz octa-core Samsung Exynos 7420 processor."),
    item(2, "Nokia lumia 1520", Category::Phones, 820, "The Nokia Lumia 1520 is powered by 2.2GHz quad-core Qualcomm Snapdragon 800 processor."),
    item(3, "Nexus 6", Category::Phones, 650, "The Motorola Google Nexus 6 is powered by 2.7GHz quad-core Qualcomm Snapdragon 805 processor."),
    item(4, "Samsung galaxy s7", Category::Phones, 800, "The Samsung Galaxy S7 is powered by 1.6GHz octa-core processor."),
    item(5, "Iphone 6 32gb", Category::Phones, 790, "It comes with 1GB of RAM. The phone packs 16GB of internal storage."),
    item(6, "Sony xperia z5", Category::Phones, 320, "Sony Xperia Z5 Dual smartphone was launched in September 2015."),
    item(7, "HTC One M9", Category::Phones, 700, "The HTC One M9 is powered by 1.5GHz octa-core Qualcomm Snapdragon 810 processor."),
    item(8, "Sony vaio i5", Category::Laptops, 790, "Sony is so confident that the VAIO S is a superior ultraportable laptop."),
    item(9, "Sony vaio i7", Category::Laptops, 790, "REVIEW: Sony is so confident that the VAIO S is a superior ultraportable laptop."),
    item(10, "Apple monitor 24", Category::Monitors, 400, "LED Cinema Display features a 27-inch glossy LED-backlit TFT active-matrix LCD display."),
    item(11, "MacBook air", Category::Laptops, 700, "1.6GHz dual-core Intel Core i5, 8GB memory, 128GB PCIe-based flash storage."),
    item(12, "Dell i7 8gb", Category::Laptops, 700, "6th Generation Intel Core i7-6500U Dual-Core Processor 2.5 GHz."),
    item(13, "2017 Dell 15.6 Inch", Category::Laptops, 700, "7th Gen Intel Core i7-7500U mobile processor 2.70 GHz with Turbo Boost."),
    item(14, "ASUS Full HD", Category::Monitors, 230, "ASUS VS247H-P 23.6- Inch Full HD."),
    item(15, "MacBook Pro", Category::Laptops, 1100, "Apple has introduced three new versions of its MacBook Pro line."),
];

/// Catalogue entry by id
#[must_use]
pub fn product_by_id(id: u32) -> Option<&'static Product> {
    CATALOGUE.iter().find(|p| p.id == id)
}

/// Catalogue entry by title
#[must_use]
pub fn product_by_name(name: &str) -> Option<&'static Product> {
    CATALOGUE.iter().find(|p| p.name == name)
}

/// Simulated latencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Modal fade-in and fade-out
    pub fade: Duration,
    /// Server round trip for form submissions and cart mutations
    pub request: Duration,
    /// Content fetched after a document loads (grid, product details)
    pub render: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(150),
            request: Duration::from_millis(100),
            render: Duration::from_millis(80),
        }
    }
}

impl Timing {
    /// No delays; mutations still land on the next driver call
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            fade: Duration::ZERO,
            request: Duration::ZERO,
            render: Duration::ZERO,
        }
    }
}

/// How the cart table reacts to a deletion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CartRefresh {
    /// Only the deleted row is removed
    #[default]
    Row,
    /// Every row is replaced in the same mutation
    Table,
    /// The table is emptied, then the remaining rows arrive after the delay
    Staged(Duration),
}

/// A completed order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Order id shown in the confirmation
    pub id: u64,
    /// Customer name
    pub name: String,
    /// Card number
    pub card: String,
    /// Charged amount
    pub amount: f64,
    /// Titles of the ordered items
    pub items: Vec<String>,
}

#[derive(Debug, Clone)]
struct CartEntry {
    id: u64,
    title: String,
    price: f64,
}

#[derive(Debug, Clone, Default)]
struct Backend {
    users: HashMap<String, String>,
    session_user: Option<String>,
    cart: Vec<CartEntry>,
    next_entry: u64,
    orders: Vec<OrderRecord>,
}

impl Backend {
    fn add_to_cart(&mut self, title: &str, price: f64) {
        self.next_entry += 1;
        self.cart.push(CartEntry {
            id: self.next_entry,
            title: title.to_string(),
            price,
        });
    }

    fn cart_total(&self) -> f64 {
        self.cart.iter().map(|e| e.price).sum()
    }
}

#[derive(Debug)]
struct Ctx {
    backend: Arc<Mutex<Backend>>,
    timing: Timing,
    cart_refresh: CartRefresh,
}

impl Ctx {
    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
struct GridState {
    category: Option<Category>,
    page: usize,
}

/// Offline DemoBlaze storefront
///
/// ```ignore
/// let store = MockStore::new().with_user("jane", "secret").with_timing(Timing::instant());
/// let session = store.session(SessionSettings::default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    backend: Arc<Mutex<Backend>>,
    timing: Timing,
    cart_refresh: CartRefresh,
}

impl MockStore {
    /// Empty store with default latencies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account
    #[must_use]
    pub fn with_user(self, username: &str, password: &str) -> Self {
        let _ = self
            .lock()
            .users
            .insert(username.to_string(), password.to_string());
        self
    }

    /// Put an arbitrary line into the cart
    #[must_use]
    pub fn with_cart_item(self, title: &str, price: f64) -> Self {
        self.lock().add_to_cart(title, price);
        self
    }

    /// Put a catalogue product into the cart; unknown ids are ignored
    #[must_use]
    pub fn with_product_in_cart(self, id: u32) -> Self {
        match product_by_id(id) {
            Some(p) => self.with_cart_item(p.name, f64::from(p.price)),
            None => {
                tracing::warn!(id, "unknown product id; cart left unchanged");
                self
            }
        }
    }

    /// Start with a logged-in user
    #[must_use]
    pub fn with_logged_in(self, username: &str) -> Self {
        self.lock().session_user = Some(username.to_string());
        self
    }

    /// Override latencies
    #[must_use]
    pub const fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Re-render the whole cart table after each deletion
    #[must_use]
    pub const fn with_full_cart_rerender(self) -> Self {
        self.with_cart_refresh(CartRefresh::Table)
    }

    /// Choose how the cart table reacts to a deletion
    #[must_use]
    pub const fn with_cart_refresh(mut self, refresh: CartRefresh) -> Self {
        self.cart_refresh = refresh;
        self
    }

    /// Independent copy of the current server state
    #[must_use]
    pub fn fresh(&self) -> Self {
        let backend = self.lock().clone();
        Self {
            backend: Arc::new(Mutex::new(backend)),
            timing: self.timing,
            cart_refresh: self.cart_refresh,
        }
    }

    /// Driver showing this store; drivers of one store share server state
    #[must_use]
    pub fn driver(&self) -> MockDriver {
        let ctx = Arc::new(Ctx {
            backend: Arc::clone(&self.backend),
            timing: self.timing,
            cart_refresh: self.cart_refresh,
        });
        MockDriver::with_router(Arc::new(move |dom: &mut MockDom, url: &str| {
            route(&ctx, dom, url);
        }))
    }

    /// Session over a new driver of this store
    #[must_use]
    pub fn session(&self, settings: SessionSettings) -> BrowserSession<MockDriver> {
        BrowserSession::new(self.driver(), settings)
    }

    /// Whether an account exists
    #[must_use]
    pub fn has_user(&self, username: &str) -> bool {
        self.lock().users.contains_key(username)
    }

    /// Logged-in username
    #[must_use]
    pub fn logged_in_user(&self) -> Option<String> {
        self.lock().session_user.clone()
    }

    /// Titles in the server-side cart
    #[must_use]
    pub fn cart_titles(&self) -> Vec<String> {
        self.lock().cart.iter().map(|e| e.title.clone()).collect()
    }

    /// Server-side cart total
    #[must_use]
    pub fn cart_total(&self) -> f64 {
        self.lock().cart_total()
    }

    /// Completed orders
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.lock().orders.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Session factory handing out isolated copies of a store
#[derive(Debug, Clone)]
pub struct MockStoreFactory {
    template: MockStore,
    settings: SessionSettings,
}

impl MockStoreFactory {
    /// Every session starts from a copy of `template`
    #[must_use]
    pub const fn new(template: MockStore, settings: SessionSettings) -> Self {
        Self { template, settings }
    }
}

#[async_trait]
impl SessionFactory for MockStoreFactory {
    type Driver = MockDriver;

    async fn create(&self) -> ProbeResult<BrowserSession<MockDriver>> {
        Ok(self.template.fresh().session(self.settings.clone()))
    }

    fn describe(&self) -> String {
        "in-memory storefront".to_string()
    }
}

// =============================================================================
// ROUTING
// =============================================================================

fn route(ctx: &Arc<Ctx>, dom: &mut MockDom, url: &str) {
    if UrlMatcher::new("/").matches(url) {
        build_home(ctx, dom);
    } else if UrlMatcher::new(cart::CART_PATH).matches(url) {
        build_cart(ctx, dom);
    } else if let Some(id) = product_id(url) {
        build_product(ctx, dom, id);
    } else {
        tracing::debug!(url, "mock store: no such page");
        let _ = dom.insert(MockNode::new(Locator::css("h1")).text("404 Not Found"));
    }
}

fn product_id(url: &str) -> Option<u32> {
    let matcher = UrlMatcher::new(product::PRODUCT_URL);
    if !matcher.matches(url) {
        return None;
    }
    matcher.extract_params(url).get("id")?.parse().ok()
}

fn go(dom: &mut MockDom, path: &str) {
    let url = format!("{}{path}", dom.origin());
    dom.navigate(&url);
}

// =============================================================================
// CHROME: NAVBAR AND MODALS
// =============================================================================

fn build_chrome(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    build_navbar(ctx, dom);
    build_login_modal(ctx, dom);
    build_sign_up_modal(ctx, dom);
    build_about_modal(ctx, dom);
    build_contact_modal(ctx, dom);
}

fn show_after(dom: &mut MockDom, delay: Duration, root: Locator, displayed: bool) {
    dom.after(delay, move |d| d.set_displayed_by(&root, displayed));
}

fn opens_modal(dom: &mut MockDom, trigger: NodeId, root: Locator, fade: Duration) {
    dom.on_click(trigger, move |d, _| show_after(d, fade, root.clone(), true));
}

fn build_modal(
    dom: &mut MockDom,
    fade: Duration,
    root: Locator,
    title: Locator,
    heading: &str,
    close_button: Locator,
    x_icon: Locator,
) -> NodeId {
    let root_id = dom.insert(MockNode::new(root.clone()).hidden());
    let _ = dom.insert(MockNode::new(title).text(heading).child_of(root_id));
    for (locator, label) in [(close_button, "Close"), (x_icon, "×")] {
        let id = dom.insert(MockNode::new(locator).text(label).child_of(root_id));
        let root = root.clone();
        dom.on_click(id, move |d, _| show_after(d, fade, root.clone(), false));
    }
    root_id
}

fn build_navbar(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    let user = ctx.backend().session_user.clone();
    let logged_in = user.is_some();
    let fade = ctx.timing.fade;

    let home_link = dom.insert(MockNode::new(nav::locators::HOME_LINK).text("Home"));
    dom.on_click(home_link, |d, _| go(d, home::HOME_PATH));

    let contact_link = dom.insert(MockNode::new(nav::locators::CONTACT_LINK).text("Contact"));
    opens_modal(dom, contact_link, contact::locators::MODAL, fade);

    let about_link = dom.insert(MockNode::new(nav::locators::ABOUT_LINK).text("About us"));
    opens_modal(dom, about_link, about::locators::MODAL, fade);

    let cart_link = dom.insert(MockNode::new(nav::locators::CART_LINK).text("Cart"));
    dom.on_click(cart_link, |d, _| go(d, cart::CART_PATH));

    let mut login_link = MockNode::new(nav::locators::LOGIN_LINK).text("Log in");
    let mut sign_up_link = MockNode::new(nav::locators::SIGN_UP_LINK).text("Sign up");
    let mut logout_link = MockNode::new(nav::locators::LOGOUT_LINK).text("Log out");
    let mut welcome = MockNode::new(nav::locators::WELCOME).text(format!(
        "Welcome {}",
        user.as_deref().unwrap_or_default()
    ));
    if logged_in {
        login_link = login_link.hidden();
        sign_up_link = sign_up_link.hidden();
    } else {
        logout_link = logout_link.hidden();
        welcome = welcome.hidden();
    }

    let login_id = dom.insert(login_link);
    opens_modal(dom, login_id, login::locators::MODAL, fade);
    let sign_up_id = dom.insert(sign_up_link);
    opens_modal(dom, sign_up_id, signup::locators::MODAL, fade);

    let logout_id = dom.insert(logout_link);
    let logout_ctx = Arc::clone(ctx);
    dom.on_click(logout_id, move |d, _| {
        logout_ctx.backend().session_user = None;
        go(d, home::HOME_PATH);
    });
    let _ = dom.insert(welcome);
}

fn build_login_modal(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    use login::locators as l;
    let root = build_modal(dom, ctx.timing.fade, l::MODAL, l::TITLE, "Log in", l::CLOSE_BUTTON, l::X_ICON);
    let _ = dom.insert(MockNode::new(l::USERNAME).child_of(root));
    let _ = dom.insert(MockNode::new(l::PASSWORD).child_of(root));
    let button = dom.insert(MockNode::new(l::LOGIN_BUTTON).text("Log in").child_of(root));
    let ctx = Arc::clone(ctx);
    dom.on_click(button, move |d, _| submit_login(&ctx, d));
}

fn submit_login(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    use login::locators as l;
    let username = dom.value_of(&l::USERNAME);
    let password = dom.value_of(&l::PASSWORD);
    if username.is_empty() || password.is_empty() {
        dom.raise_alert(ALERT_EMPTY_CREDENTIALS);
        return;
    }
    let ctx = Arc::clone(ctx);
    dom.after(ctx.timing.request, move |d| {
        let outcome = {
            let mut backend = ctx.backend();
            match backend.users.get(&username) {
                None => Err(ALERT_UNKNOWN_USER),
                Some(stored) if *stored != password => Err(ALERT_WRONG_PASSWORD),
                Some(_) => {
                    backend.session_user = Some(username.clone());
                    Ok(())
                }
            }
        };
        match outcome {
            Err(alert) => d.raise_alert(alert),
            Ok(()) => {
                // the live site reloads the current document
                let url = d.url().to_string();
                d.navigate(&url);
            }
        }
    });
}

fn build_sign_up_modal(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    use signup::locators as s;
    let root = build_modal(dom, ctx.timing.fade, s::MODAL, s::TITLE, "Sign up", s::CLOSE_BUTTON, s::X_ICON);
    let _ = dom.insert(MockNode::new(s::USERNAME).child_of(root));
    let _ = dom.insert(MockNode::new(s::PASSWORD).child_of(root));
    let button = dom.insert(MockNode::new(s::SIGN_UP_BUTTON).text("Sign up").child_of(root));
    let ctx = Arc::clone(ctx);
    dom.on_click(button, move |d, _| submit_sign_up(&ctx, d));
}

fn submit_sign_up(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    use signup::locators as s;
    let username = dom.value_of(&s::USERNAME);
    let password = dom.value_of(&s::PASSWORD);
    if username.is_empty() || password.is_empty() {
        dom.raise_alert(ALERT_EMPTY_CREDENTIALS);
        return;
    }
    let ctx = Arc::clone(ctx);
    dom.after(ctx.timing.request, move |d| {
        let created = {
            let mut backend = ctx.backend();
            if backend.users.contains_key(&username) {
                false
            } else {
                let _ = backend.users.insert(username, password);
                true
            }
        };
        if created {
            d.set_displayed_by(&s::MODAL, false);
            d.raise_alert(ALERT_SIGN_UP_OK);
        } else {
            d.raise_alert(ALERT_USER_EXISTS);
        }
    });
}

fn build_about_modal(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    use about::locators as a;
    let root = build_modal(dom, ctx.timing.fade, a::MODAL, a::TITLE, "About us", a::CLOSE_BUTTON, a::X_ICON);
    let _ = dom.insert(MockNode::new(a::VIDEO).child_of(root));
}

fn build_contact_modal(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    use contact::locators as c;
    let root = build_modal(dom, ctx.timing.fade, c::MODAL, c::TITLE, "New message", c::CLOSE_BUTTON, c::X_ICON);
    for field in [c::EMAIL, c::NAME, c::MESSAGE] {
        let _ = dom.insert(MockNode::new(field).child_of(root));
    }
    let send = dom.insert(MockNode::new(c::SEND_BUTTON).text("Send message").child_of(root));
    dom.on_click(send, |d, _| {
        d.set_displayed_by(&c::MODAL, false);
        d.raise_alert(ALERT_MESSAGE_SENT);
    });
}

// =============================================================================
// HOME
// =============================================================================

fn build_home(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    use home::locators as h;
    build_chrome(ctx, dom);

    let grid = dom.insert(MockNode::new(h::GRID));
    let state = Arc::new(Mutex::new(GridState::default()));
    let delay = ctx.timing.request;

    for category in Category::ALL {
        let link = dom.insert(MockNode::new(category.locator()).text(category.label()));
        let state = Arc::clone(&state);
        dom.on_click(link, move |d, _| {
            {
                let mut s = state.lock().unwrap_or_else(PoisonError::into_inner);
                s.category = Some(category);
                s.page = 0;
            }
            schedule_grid(d, delay, grid, Arc::clone(&state));
        });
    }

    for (locator, label, step) in [(h::NEXT, "Next", 1_isize), (h::PREVIOUS, "Previous", -1)] {
        let id = dom.insert(MockNode::new(locator).text(label).hidden());
        let state = Arc::clone(&state);
        dom.on_click(id, move |d, _| {
            {
                let mut s = state.lock().unwrap_or_else(PoisonError::into_inner);
                s.page = s.page.saturating_add_signed(step);
            }
            schedule_grid(d, delay, grid, Arc::clone(&state));
        });
    }

    schedule_grid(dom, ctx.timing.render, grid, state);
}

fn schedule_grid(dom: &mut MockDom, delay: Duration, grid: NodeId, state: Arc<Mutex<GridState>>) {
    dom.after(delay, move |d| render_grid(d, grid, &state));
}

fn render_grid(dom: &mut MockDom, grid: NodeId, state: &Mutex<GridState>) {
    use home::locators as h;
    let (category, page) = {
        let s = state.lock().unwrap_or_else(PoisonError::into_inner);
        (s.category, s.page)
    };
    let products: Vec<&Product> = CATALOGUE
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .collect();
    let pages = products.len().div_ceil(PAGE_SIZE).max(1);
    let page = page.min(pages - 1);

    dom.detach_all(&h::CARD);
    for p in products.iter().skip(page * PAGE_SIZE).take(PAGE_SIZE) {
        let card = dom.insert(MockNode::new(h::CARD).child_of(grid));
        let title = dom.insert(
            MockNode::new(h::CARD_TITLE)
                .or(Locator::dynamic(Strategy::LinkText, p.name))
                .text(p.name)
                .attr("href", format!("prod.html?idp_={}", p.id))
                .child_of(card),
        );
        let path = format!("/prod.html?idp_={}", p.id);
        dom.on_click(title, move |d, _| go(d, &path));
        let _ = dom.insert(
            MockNode::new(h::CARD_PRICE)
                .text(format!("${}", p.price))
                .child_of(card),
        );
    }
    dom.set_displayed_by(&h::NEXT, page + 1 < pages);
    dom.set_displayed_by(&h::PREVIOUS, page > 0);
}

// =============================================================================
// PRODUCT
// =============================================================================

fn build_product(ctx: &Arc<Ctx>, dom: &mut MockDom, id: u32) {
    use product::locators as p;
    build_chrome(ctx, dom);

    let container = dom.insert(MockNode::new(home::locators::GRID));
    let name = dom.insert(MockNode::new(p::NAME).child_of(container));
    let price = dom.insert(MockNode::new(p::PRICE).child_of(container));
    let description = dom.insert(MockNode::new(p::DESCRIPTION));
    let add = dom.insert(MockNode::new(p::ADD_TO_CART).text("Add to cart").child_of(container));

    let Some(item) = product_by_id(id) else {
        tracing::debug!(id, "mock store: unknown product");
        return;
    };
    dom.after(ctx.timing.render, move |d| {
        d.set_text(name, item.name);
        d.set_text(price, format!("${} *includes tax", item.price));
        d.set_text(description, item.description);
    });

    let ctx = Arc::clone(ctx);
    dom.on_click(add, move |d, _| {
        let ctx = Arc::clone(&ctx);
        d.after(ctx.timing.request, move |d| {
            ctx.backend().add_to_cart(item.name, f64::from(item.price));
            d.raise_alert(ALERT_PRODUCT_ADDED);
        });
    });
}

// =============================================================================
// CART AND CHECKOUT
// =============================================================================

fn build_cart(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    use cart::locators as c;
    build_chrome(ctx, dom);

    let table = dom.insert(MockNode::new(c::TABLE));
    let total = dom.insert(MockNode::new(c::TOTAL));
    let place_order = dom.insert(MockNode::new(c::PLACE_ORDER).text("Place Order"));
    build_order_modal(ctx, dom);

    let order_ctx = Arc::clone(ctx);
    dom.on_click(place_order, move |d, _| {
        let amount = order_ctx.backend().cart_total();
        if let Some(id) = d.find_first(&order::locators::TOTAL) {
            d.set_text(id, format!("Total: {}", format_amount(amount)));
        }
        show_after(d, order_ctx.timing.fade, order::locators::MODAL, true);
    });

    render_cart(ctx, dom, table, total);
}

fn render_cart(ctx: &Arc<Ctx>, dom: &mut MockDom, table: NodeId, total: NodeId) {
    use cart::locators as c;
    dom.detach_all(&c::ROWS);
    let entries = ctx.backend().cart.clone();
    for entry in &entries {
        let row = dom.insert(MockNode::new(c::ROWS).child_of(table));
        let _ = dom.insert(MockNode::new(c::TITLE_CELL).text(&entry.title).child_of(row));
        let _ = dom.insert(
            MockNode::new(c::PRICE_CELL)
                .text(format_amount(entry.price))
                .child_of(row),
        );
        let delete = dom.insert(MockNode::new(c::DELETE).text("Delete").child_of(row));
        let ctx = Arc::clone(ctx);
        let entry_id = entry.id;
        dom.on_click(delete, move |d, _| {
            let ctx = Arc::clone(&ctx);
            d.after(ctx.timing.request, move |d| {
                ctx.backend().cart.retain(|e| e.id != entry_id);
                match ctx.cart_refresh {
                    CartRefresh::Row => {
                        d.detach(row);
                        refresh_total(&ctx, d, total);
                    }
                    CartRefresh::Table => render_cart(&ctx, d, table, total),
                    CartRefresh::Staged(delay) => {
                        d.detach_all(&c::ROWS);
                        d.after(delay, move |d| render_cart(&ctx, d, table, total));
                    }
                }
            });
        });
    }
    refresh_total(ctx, dom, total);
}

fn refresh_total(ctx: &Ctx, dom: &mut MockDom, total: NodeId) {
    let (empty, amount) = {
        let backend = ctx.backend();
        (backend.cart.is_empty(), backend.cart_total())
    };
    dom.set_text(total, if empty { String::new() } else { format_amount(amount) });
}

fn build_order_modal(ctx: &Arc<Ctx>, dom: &mut MockDom) {
    use order::locators as o;
    let root = build_modal(dom, ctx.timing.fade, o::MODAL, o::TITLE, "Place order", o::CLOSE_BUTTON, o::X_ICON);
    let _ = dom.insert(MockNode::new(o::TOTAL).child_of(root));
    for field in [o::NAME, o::COUNTRY, o::CITY, o::CARD, o::MONTH, o::YEAR] {
        let _ = dom.insert(MockNode::new(field).child_of(root));
    }
    let purchase = dom.insert(MockNode::new(o::PURCHASE_BUTTON).text("Purchase").child_of(root));
    let ctx = Arc::clone(ctx);
    dom.on_click(purchase, move |d, _| submit_order(&ctx, d));
}

fn submit_order(ctx: &Ctx, dom: &mut MockDom) {
    use order::locators as o;
    let name = dom.value_of(&o::NAME);
    let card = dom.value_of(&o::CARD);
    if name.trim().is_empty() || card.trim().is_empty() {
        dom.raise_alert(ALERT_ORDER_INCOMPLETE);
        return;
    }
    let record = {
        let mut backend = ctx.backend();
        let record = OrderRecord {
            id: 7_000_000 + backend.orders.len() as u64 + 1,
            name,
            card,
            amount: backend.cart_total(),
            items: backend.cart.iter().map(|e| e.title.clone()).collect(),
        };
        backend.cart.clear();
        backend.orders.push(record.clone());
        record
    };
    dom.set_displayed_by(&o::MODAL, false);
    show_confirmation(dom, &record);
}

fn show_confirmation(dom: &mut MockDom, record: &OrderRecord) {
    use order::locators as o;
    let root = dom.insert(MockNode::new(o::CONFIRMATION));
    let _ = dom.insert(
        MockNode::new(o::CONFIRMATION_HEADING)
            .text(PURCHASE_HEADING)
            .child_of(root),
    );
    let details = format!(
        "Id: {}\nAmount: {} USD\nCard Number: {}\nName: {}\nDate: {}",
        record.id,
        format_amount(record.amount),
        record.card,
        record.name,
        chrono::Local::now().format("%-d/%-m/%Y"),
    );
    let _ = dom.insert(MockNode::new(o::CONFIRMATION_DETAILS).text(details).child_of(root));
    let ok = dom.insert(MockNode::new(o::CONFIRMATION_OK).text("OK").child_of(root));
    dom.on_click(ok, |d, _| go(d, home::HOME_PATH));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::BrowserDriver;

    const BASE: &str = "https://www.demoblaze.com";

    async fn visit(driver: &MockDriver, path: &str) {
        driver.navigate(&format!("{BASE}{path}")).await.unwrap();
    }

    mod catalogue_tests {
        use super::*;

        #[test]
        fn test_ids_are_unique_and_sequential() {
            for (idx, p) in CATALOGUE.iter().enumerate() {
                assert_eq!(p.id as usize, idx + 1);
            }
        }

        #[test]
        fn test_lookup() {
            assert_eq!(product_by_id(3).map(|p| p.name), Some("Nexus 6"));
            assert_eq!(product_by_name("MacBook Pro").map(|p| p.price), Some(1100));
            assert!(product_by_id(99).is_none());
        }

        #[test]
        fn test_two_grid_pages() {
            assert_eq!(CATALOGUE.len().div_ceil(PAGE_SIZE), 2);
        }
    }

    mod routing_tests {
        use super::*;

        #[tokio::test]
        async fn test_home_grid_renders_after_delay() {
            let driver = MockStore::new().driver();
            visit(&driver, "/").await;
            assert!(driver
                .find_all(&home::locators::CARD)
                .await
                .unwrap()
                .is_empty());
            tokio::time::sleep(Timing::default().render + Duration::from_millis(10)).await;
            assert_eq!(
                driver.find_all(&home::locators::CARD).await.unwrap().len(),
                PAGE_SIZE
            );
        }

        #[tokio::test]
        async fn test_unknown_path_is_404() {
            let driver = MockStore::new().driver();
            visit(&driver, "/nope.html").await;
            let h1 = driver.find(&Locator::css("h1")).await.unwrap();
            assert_eq!(driver.text(&h1).await.unwrap(), "404 Not Found");
        }

        #[tokio::test]
        async fn test_product_id_routing() {
            assert_eq!(product_id("https://x/prod.html?idp_=5"), Some(5));
            assert_eq!(product_id("https://x/prod.html?idp_=abc"), None);
            assert_eq!(product_id("https://x/cart.html"), None);
        }
    }

    mod state_tests {
        use super::*;

        #[tokio::test]
        async fn test_cart_survives_navigation() {
            let store = MockStore::new()
                .with_product_in_cart(1)
                .with_timing(Timing::instant());
            let driver = store.driver();
            visit(&driver, "/cart.html").await;
            assert_eq!(driver.find_all(&cart::locators::ROWS).await.unwrap().len(), 1);
            visit(&driver, "/index.html").await;
            visit(&driver, "/cart.html").await;
            assert_eq!(driver.find_all(&cart::locators::ROWS).await.unwrap().len(), 1);
            assert_eq!(store.cart_titles(), vec!["Samsung galaxy s6".to_string()]);
        }

        #[tokio::test]
        async fn test_fresh_copy_is_isolated() {
            let template = MockStore::new().with_user("jane", "pw");
            let copy = template.fresh().with_user("john", "pw");
            assert!(copy.has_user("jane"));
            assert!(!template.has_user("john"));
        }

        #[tokio::test]
        async fn test_logged_in_navbar() {
            let store = MockStore::new()
                .with_user("jane", "pw")
                .with_logged_in("jane")
                .with_timing(Timing::instant());
            let driver = store.driver();
            visit(&driver, "/").await;
            let welcome = driver.find(&nav::locators::WELCOME).await.unwrap();
            assert_eq!(driver.text(&welcome).await.unwrap(), "Welcome jane");
            let login = driver.find(&nav::locators::LOGIN_LINK).await.unwrap();
            assert!(!driver.is_displayed(&login).await.unwrap());
        }

        #[tokio::test]
        async fn test_empty_login_raises_alert_immediately() {
            let driver = MockStore::new().with_timing(Timing::instant()).driver();
            visit(&driver, "/").await;
            let button = driver.find(&login::locators::LOGIN_BUTTON).await.unwrap();
            driver.with_dom(|dom| dom.set_displayed_by(&login::locators::MODAL, true));
            driver.click(&button).await.unwrap();
            assert_eq!(
                driver.alert_text().await.unwrap(),
                "Please fill out Username and Password."
            );
        }

        #[tokio::test]
        async fn test_full_rerender_replaces_every_row() {
            let store = MockStore::new()
                .with_cart_item("a", 1.0)
                .with_cart_item("b", 2.0)
                .with_timing(Timing::instant())
                .with_full_cart_rerender();
            let driver = store.driver();
            visit(&driver, "/cart.html").await;
            let rows = driver.find_all(&cart::locators::ROWS).await.unwrap();
            let delete = driver.find_in(&rows[0], &cart::locators::DELETE).await.unwrap();
            driver.click(&delete).await.unwrap();
            assert!(matches!(
                driver.is_displayed(&rows[1]).await,
                Err(crate::result::ProbeError::StaleElement { .. })
            ));
            assert_eq!(driver.find_all(&cart::locators::ROWS).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_staged_rerender_empties_table_first() {
            let store = MockStore::new()
                .with_cart_item("a", 1.0)
                .with_cart_item("b", 2.0)
                .with_cart_item("c", 3.0)
                .with_timing(Timing::instant())
                .with_cart_refresh(CartRefresh::Staged(Duration::from_millis(60)));
            let driver = store.driver();
            visit(&driver, "/cart.html").await;
            let rows = driver.find_all(&cart::locators::ROWS).await.unwrap();
            let delete = driver.find_in(&rows[0], &cart::locators::DELETE).await.unwrap();
            driver.click(&delete).await.unwrap();
            assert!(driver.find_all(&cart::locators::ROWS).await.unwrap().is_empty());

            tokio::time::sleep(Duration::from_millis(120)).await;
            assert_eq!(driver.find_all(&cart::locators::ROWS).await.unwrap().len(), 2);
        }
    }
}
