//! End-to-end journeys against the storefront.
//!
//! Each [`Journey`] drives page objects through one user-visible flow and
//! writes its steps and verdicts to a [`TestLog`]. A failed check is logged
//! and ends the journey with `ProbeError::Assertion`; any other error ends it
//! as-is. [`Suite`] runs a selection with a fresh browser per journey.
//!
//! Journeys create their own accounts (`Credentials::unique`) so they run
//! unchanged against the live site and the in-memory store.

use crate::driver::BrowserDriver;
use crate::fixtures::{Credentials, OrderForm};
use crate::pages::{about, contact, login, signup};
use crate::pages::cart::TOTAL_TOLERANCE;
use crate::pages::{CartPage, Category, HomePage, PageObject, ProductPage};
use crate::reporter::{Reporter, TestLog};
use crate::result::{ProbeError, ProbeResult};
use crate::session::{BrowserSession, SessionFactory};
use crate::wait::ElementInvisible;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::time::Duration;

/// A named end-to-end flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Journey {
    /// Register, log in, see the greeting, log out
    LoginValid,
    /// Empty login form is rejected with an alert
    LoginEmptyFields,
    /// Wrong password is rejected with an alert
    LoginWrongPassword,
    /// Unknown username is rejected with an alert
    LoginUnknownUser,
    /// A fresh username registers
    SignUpNewUser,
    /// A taken username is rejected
    SignUpDuplicateUser,
    /// Empty sign-up form is rejected
    SignUpEmptyFields,
    /// Login modal opens and closes both ways
    LoginModal,
    /// Sign-up modal opens and closes both ways
    SignUpModal,
    /// About-us modal opens and closes both ways
    AboutUsModal,
    /// Category filters change the grid
    Categories,
    /// Grid paging forward and back
    Pagination,
    /// Navbar links between home and cart
    NavigationLinks,
    /// Contact form sends
    ContactForm,
    /// Product details and add to cart
    ProductDetails,
    /// Cart rows, total and deleting one row
    CartAddDelete,
    /// Deleting every cart row
    CartDeleteAll,
    /// Checkout with a complete form
    CheckoutComplete,
    /// Checkout with name and card missing
    CheckoutMissingFields,
    /// Sign up, log in, shop, check out, log out
    UserJourney,
}

impl Journey {
    /// Every journey, in run order
    pub const ALL: [Self; 20] = [
        Self::LoginValid,
        Self::LoginEmptyFields,
        Self::LoginWrongPassword,
        Self::LoginUnknownUser,
        Self::SignUpNewUser,
        Self::SignUpDuplicateUser,
        Self::SignUpEmptyFields,
        Self::LoginModal,
        Self::SignUpModal,
        Self::AboutUsModal,
        Self::Categories,
        Self::Pagination,
        Self::NavigationLinks,
        Self::ContactForm,
        Self::ProductDetails,
        Self::CartAddDelete,
        Self::CartDeleteAll,
        Self::CheckoutComplete,
        Self::CheckoutMissingFields,
        Self::UserJourney,
    ];

    /// Name used on the command line and in reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LoginValid => "login_valid",
            Self::LoginEmptyFields => "login_empty_fields",
            Self::LoginWrongPassword => "login_wrong_password",
            Self::LoginUnknownUser => "login_unknown_user",
            Self::SignUpNewUser => "sign_up_new_user",
            Self::SignUpDuplicateUser => "sign_up_duplicate_user",
            Self::SignUpEmptyFields => "sign_up_empty_fields",
            Self::LoginModal => "login_modal",
            Self::SignUpModal => "sign_up_modal",
            Self::AboutUsModal => "about_us_modal",
            Self::Categories => "categories",
            Self::Pagination => "pagination",
            Self::NavigationLinks => "navigation_links",
            Self::ContactForm => "contact_form",
            Self::ProductDetails => "product_details",
            Self::CartAddDelete => "cart_add_delete",
            Self::CartDeleteAll => "cart_delete_all",
            Self::CheckoutComplete => "checkout_complete",
            Self::CheckoutMissingFields => "checkout_missing_fields",
            Self::UserJourney => "user_journey",
        }
    }

    /// One-line description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::LoginValid => "Register a fresh user, log in, check the greeting, log out",
            Self::LoginEmptyFields => "Submitting an empty login form raises the fill-out alert",
            Self::LoginWrongPassword => "A wrong password raises the wrong-password alert",
            Self::LoginUnknownUser => "An unknown username raises the user-does-not-exist alert",
            Self::SignUpNewUser => "A fresh username signs up successfully",
            Self::SignUpDuplicateUser => "Signing up a taken username raises the already-exist alert",
            Self::SignUpEmptyFields => "Submitting an empty sign-up form raises the fill-out alert",
            Self::LoginModal => "Login modal shows its fields and closes with Close and X",
            Self::SignUpModal => "Sign-up modal shows its fields and closes with Close and X",
            Self::AboutUsModal => "About-us modal shows the video and closes with Close and X",
            Self::Categories => "Phones, Laptops and Monitors filter the product grid",
            Self::Pagination => "Next and Previous page through the product grid",
            Self::NavigationLinks => "Navbar links move between home and cart",
            Self::ContactForm => "The contact form sends and confirms",
            Self::ProductDetails => "Product page shows name, price, description and adds to cart",
            Self::CartAddDelete => "Cart lists added products, totals them and deletes one",
            Self::CartDeleteAll => "Every cart row can be deleted",
            Self::CheckoutComplete => "A complete order is confirmed and empties the cart",
            Self::CheckoutMissingFields => "An order without name and card is rejected",
            Self::UserJourney => "Sign up, log in, shop two products, drop one, buy, log out",
        }
    }

    /// Run against `session`, logging to `log`
    ///
    /// # Errors
    ///
    /// `Assertion` for a failed check, or whatever error stopped the flow
    pub async fn run<D: BrowserDriver>(
        self,
        session: &BrowserSession<D>,
        log: &mut TestLog,
    ) -> ProbeResult<()> {
        match self {
            Self::LoginValid => login_valid(session, log).await,
            Self::LoginEmptyFields => login_empty_fields(session, log).await,
            Self::LoginWrongPassword => login_wrong_password(session, log).await,
            Self::LoginUnknownUser => login_unknown_user(session, log).await,
            Self::SignUpNewUser => register_new_user(session, log).await.map(|_| ()),
            Self::SignUpDuplicateUser => sign_up_duplicate_user(session, log).await,
            Self::SignUpEmptyFields => sign_up_empty_fields(session, log).await,
            Self::LoginModal => login_modal(session, log).await,
            Self::SignUpModal => sign_up_modal(session, log).await,
            Self::AboutUsModal => about_us_modal(session, log).await,
            Self::Categories => categories(session, log).await,
            Self::Pagination => pagination(session, log).await,
            Self::NavigationLinks => navigation_links(session, log).await,
            Self::ContactForm => contact_form(session, log).await,
            Self::ProductDetails => product_details(session, log).await,
            Self::CartAddDelete => cart_add_delete(session, log).await,
            Self::CartDeleteAll => cart_delete_all(session, log).await,
            Self::CheckoutComplete => checkout_complete(session, log).await,
            Self::CheckoutMissingFields => checkout_missing_fields(session, log).await,
            Self::UserJourney => user_journey(session, log).await,
        }
    }

    /// Resolve names; an empty list selects every journey
    ///
    /// # Errors
    ///
    /// `Config` naming the first unknown journey
    pub fn select<S: AsRef<str>>(names: &[S]) -> ProbeResult<Vec<Self>> {
        if names.is_empty() {
            return Ok(Self::ALL.to_vec());
        }
        names.iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Journey {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|j| j.name() == wanted)
            .ok_or_else(|| ProbeError::config(format!("unknown journey: {s}")))
    }
}

// =============================================================================
// CHECKS
// =============================================================================

fn verify(log: &mut TestLog, ok: bool, what: impl Into<String>) -> ProbeResult<()> {
    let what = what.into();
    if ok {
        log.log_pass(what);
        Ok(())
    } else {
        log.log_fail(what.clone());
        Err(ProbeError::assertion(what))
    }
}

fn verify_eq<T: PartialEq + fmt::Debug>(
    log: &mut TestLog,
    what: &str,
    actual: T,
    expected: T,
) -> ProbeResult<()> {
    if actual == expected {
        verify(log, true, format!("{what}: {actual:?}"))
    } else {
        verify(log, false, format!("{what}: expected {expected:?}, got {actual:?}"))
    }
}

fn verify_amount(log: &mut TestLog, what: &str, actual: f64, expected: f64) -> ProbeResult<()> {
    let ok = (actual - expected).abs() < TOTAL_TOLERANCE;
    verify(log, ok, format!("{what}: expected {expected}, got {actual}"))
}

fn verify_contains(log: &mut TestLog, what: &str, text: &str, fragment: &str) -> ProbeResult<()> {
    verify(
        log,
        text.contains(fragment),
        format!("{what}: {text:?} contains {fragment:?}"),
    )
}

fn verify_alert(
    log: &mut TestLog,
    what: &str,
    alert: Option<String>,
    fragment: &str,
) -> ProbeResult<()> {
    match alert {
        Some(text) => verify_contains(log, what, &text, fragment),
        None => verify(log, false, format!("{what}: no alert appeared, expected {fragment:?}")),
    }
}

// =============================================================================
// SHARED STEPS
// =============================================================================

async fn register_new_user<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<Credentials> {
    let credentials = Credentials::unique("blaze");
    log.log_step(format!("sign up {}", credentials.username));
    let home = HomePage::open(session).await?;
    let alert = home.click_sign_up_link().await?.register(&credentials).await?;
    verify_contains(
        log,
        "sign-up alert",
        &alert,
        &session.fixtures().sign_up_success_alert,
    )?;
    Ok(credentials)
}

async fn add_products<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
    ids: &[u32],
) -> ProbeResult<()> {
    for &id in ids {
        let product = ProductPage::open(session, id).await?;
        let name = product.name().await?;
        log.log_step(format!("add {name} to cart"));
        let alert = product.add_to_cart().await?;
        verify_contains(
            log,
            "add-to-cart alert",
            &alert,
            &session.fixtures().product_added_alert,
        )?;
    }
    Ok(())
}

// =============================================================================
// LOGIN AND SIGN-UP
// =============================================================================

async fn login_valid<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let credentials = register_new_user(session, log).await?;
    log.log_step("log in");
    let home = HomePage::open(session)
        .await?
        .click_login_link()
        .await?
        .login_and_wait(&credentials)
        .await?;
    let greeting = format!("{} {}", session.fixtures().welcome_prefix, credentials.username);
    verify_eq(log, "navbar greeting", home.welcome_text().await, Some(greeting))?;

    log.log_step("log out");
    let home = home.logout().await?;
    verify(log, !home.is_logged_in().await, "logged out")
}

async fn login_empty_fields<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    log.log_step("submit the login form empty");
    let modal = HomePage::open(session)
        .await?
        .click_login_link()
        .await?
        .login(&Credentials::empty())
        .await?;
    let alert = modal.accept_alert().await;
    verify_alert(
        log,
        "empty-credentials alert",
        alert,
        &session.fixtures().empty_credentials_alert,
    )?;
    verify(log, modal.is_displayed().await, "login modal stays open")
}

async fn login_wrong_password<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let credentials = register_new_user(session, log).await?;
    log.log_step("log in with a wrong password");
    let modal = HomePage::open(session)
        .await?
        .click_login_link()
        .await?
        .login(&credentials.with_wrong_password())
        .await?;
    let alert = modal.accept_alert().await;
    verify_alert(
        log,
        "wrong-password alert",
        alert,
        &session.fixtures().wrong_password_alert,
    )
}

async fn login_unknown_user<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let stranger = Credentials::unique("ghost");
    log.log_step(format!("log in as unregistered {}", stranger.username));
    let modal = HomePage::open(session)
        .await?
        .click_login_link()
        .await?
        .login(&stranger)
        .await?;
    let alert = modal.accept_alert().await;
    verify_alert(
        log,
        "unknown-user alert",
        alert,
        &session.fixtures().unknown_user_alert,
    )
}

async fn sign_up_duplicate_user<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let credentials = register_new_user(session, log).await?;
    log.log_step("sign up the same username again");
    let alert = HomePage::open(session)
        .await?
        .click_sign_up_link()
        .await?
        .register(&credentials)
        .await?;
    verify_contains(
        log,
        "duplicate-user alert",
        &alert,
        &session.fixtures().user_exists_alert,
    )
}

async fn sign_up_empty_fields<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    log.log_step("submit the sign-up form empty");
    let modal = HomePage::open(session)
        .await?
        .click_sign_up_link()
        .await?
        .sign_up(&Credentials::empty())
        .await?;
    let alert = modal.accept_alert().await;
    verify_alert(
        log,
        "empty-credentials alert",
        alert,
        &session.fixtures().empty_credentials_alert,
    )
}

// =============================================================================
// MODALS
// =============================================================================

async fn login_modal<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let home = HomePage::open(session).await?;
    log.log_step("open login modal");
    let modal = home.click_login_link().await?;
    verify_eq(
        log,
        "login modal title",
        modal.get_modal_title().await?,
        session.fixtures().login_title.clone(),
    )?;
    let fields = modal.is_username_field_displayed().await && modal.is_password_field_displayed().await;
    verify(log, fields, "username and password fields shown")?;
    verify(log, modal.is_login_button_displayed().await, "Log in button shown")?;
    verify(
        log,
        modal.is_close_button_displayed().await && modal.is_x_icon_displayed().await,
        "Close and X shown",
    )?;

    log.log_step("close with Close");
    let home = modal.click_close().await?;
    verify(log, !session.is_visible(&login::locators::MODAL).await, "closed by Close")?;

    log.log_step("reopen and close with X");
    home.click_login_link().await?.click_x().await?;
    verify(log, !session.is_visible(&login::locators::MODAL).await, "closed by X")
}

async fn sign_up_modal<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let home = HomePage::open(session).await?;
    log.log_step("open sign-up modal");
    let modal = home.click_sign_up_link().await?;
    verify_eq(
        log,
        "sign-up modal title",
        modal.get_modal_title().await?,
        session.fixtures().sign_up_title.clone(),
    )?;
    let fields = modal.is_username_field_displayed().await && modal.is_password_field_displayed().await;
    verify(log, fields, "username and password fields shown")?;
    verify(log, modal.is_sign_up_button_displayed().await, "Sign up button shown")?;

    log.log_step("close with Close");
    let home = modal.click_close().await?;
    verify(log, !session.is_visible(&signup::locators::MODAL).await, "closed by Close")?;

    log.log_step("reopen and close with X");
    home.click_sign_up_link().await?.click_x().await?;
    verify(log, !session.is_visible(&signup::locators::MODAL).await, "closed by X")
}

async fn about_us_modal<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let home = HomePage::open(session).await?;
    log.log_step("open about-us modal");
    let modal = home.click_about_us().await?;
    verify_eq(
        log,
        "about-us modal title",
        modal.get_modal_title().await?,
        session.fixtures().about_title.clone(),
    )?;
    verify(log, modal.is_video_displayed().await, "video player shown")?;

    log.log_step("close with Close");
    let home = modal.click_close().await?;
    verify(log, !session.is_visible(&about::locators::MODAL).await, "closed by Close")?;

    log.log_step("reopen and close with X");
    home.click_about_us().await?.click_x().await?;
    verify(log, !session.is_visible(&about::locators::MODAL).await, "closed by X")
}

// =============================================================================
// NAVIGATION
// =============================================================================

async fn categories<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let mut home = HomePage::open(session).await?;
    for (category, listed, absent) in [
        (Category::Phones, "Samsung galaxy s6", "MacBook air"),
        (Category::Laptops, "Sony vaio i5", "Nexus 6"),
        (Category::Monitors, "Apple monitor 24", "Sony vaio i5"),
    ] {
        log.log_step(format!("filter by {category}"));
        home = home.select_category(category).await?;
        let titles = home.product_titles().await?;
        log.log_info(format!("{category}: {}", titles.join(", ")));
        verify(
            log,
            titles.iter().any(|t| t == listed),
            format!("{category} lists {listed}"),
        )?;
        verify(
            log,
            !titles.iter().any(|t| t == absent),
            format!("{category} hides {absent}"),
        )?;
    }
    Ok(())
}

async fn pagination<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let home = HomePage::open(session).await?;
    let first = home.product_titles().await?;
    verify(log, home.has_next_page().await, "first page offers Next")?;

    log.log_step("next page");
    let home = home.next_page().await?;
    let second = home.product_titles().await?;
    verify(
        log,
        !second.is_empty() && second != first,
        "Next shows different products",
    )?;
    verify(log, home.has_previous_page().await, "second page offers Previous")?;

    log.log_step("previous page");
    let home = home.previous_page().await?;
    verify_eq(log, "back on the first page", home.product_titles().await?, first)
}

async fn navigation_links<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let home = HomePage::open(session).await?;
    log.log_step("navbar Cart");
    let cart = home.click_cart().await?;
    verify(log, cart.is_loaded().await, "cart page shown")?;

    log.log_step("navbar Home");
    let home = cart.nav().click_home().await?;
    verify(log, home.is_loaded().await, "home page shown")
}

async fn contact_form<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    log.log_step("open contact modal");
    let modal = HomePage::open(session).await?.click_contact().await?;
    verify_eq(
        log,
        "contact modal title",
        modal.get_modal_title().await?,
        session.fixtures().contact_title.clone(),
    )?;

    log.log_step("send a message");
    let alert = modal
        .send_message("jane@example.com", "Jane Tester", "Is the MacBook Pro in stock?")
        .await?;
    verify_contains(
        log,
        "message-sent alert",
        &alert,
        &session.fixtures().message_sent_alert,
    )?;
    session
        .wait()
        .until(ElementInvisible(contact::locators::MODAL))
        .await?;
    log.log_pass("contact modal closed");
    Ok(())
}

// =============================================================================
// PRODUCT AND CART
// =============================================================================

async fn product_details<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let home = HomePage::open(session).await?;
    log.log_step("open Samsung galaxy s6");
    let product = home.click_product("Samsung galaxy s6").await?;
    verify_eq(log, "name", product.name().await?, "Samsung galaxy s6".to_string())?;
    verify_amount(log, "price", product.price().await?, 360.0)?;
    verify(log, !product.description().await?.is_empty(), "description shown")?;
    verify_eq(log, "product id", product.product_id().await?, Some(1))?;

    log.log_step("add to cart");
    let alert = product.add_to_cart().await?;
    verify_contains(
        log,
        "add-to-cart alert",
        &alert,
        &session.fixtures().product_added_alert,
    )
}

async fn cart_add_delete<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    add_products(session, log, &[1, 2]).await?;
    let cart = CartPage::open(session).await?;
    cart.wait_for_item_count(2).await?;
    let prices = cart.item_prices().await?;
    let sum: f64 = prices.iter().sum();
    verify_amount(log, "total matches rows", cart.wait_for_total(sum).await?, sum)?;
    verify_amount(log, "cart total", sum, 1180.0)?;

    log.log_step("delete Samsung galaxy s6");
    let cart = cart.delete_item("Samsung galaxy s6").await?;
    verify_eq(
        log,
        "remaining rows",
        cart.item_titles().await?,
        vec!["Nokia lumia 1520".to_string()],
    )?;
    verify_amount(log, "total after delete", cart.wait_for_total(820.0).await?, 820.0)
}

async fn cart_delete_all<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    add_products(session, log, &[1, 2, 3]).await?;
    let cart = CartPage::open(session).await?;
    cart.wait_for_item_count(3).await?;

    log.log_step("delete every row");
    let (cart, clicks) = cart.delete_all_items().await?;
    log.log_info(format!("{clicks} delete clicks"));
    verify_eq(log, "rows left", cart.get_cart_item_count().await?, 0)?;
    verify_amount(log, "total of empty cart", cart.get_total_price().await?, 0.0)
}

// =============================================================================
// CHECKOUT
// =============================================================================

async fn checkout_complete<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    add_products(session, log, &[5]).await?;
    let cart = CartPage::open(session).await?;
    cart.wait_for_item_count(1).await?;
    let total = cart.get_total_price().await?;

    log.log_step("place order");
    let modal = cart.click_place_order().await?;
    verify_eq(
        log,
        "place-order modal title",
        modal.get_modal_title().await?,
        session.fixtures().place_order_title.clone(),
    )?;
    verify_amount(log, "order total", modal.total().await?, total)?;

    let order = OrderForm::sample();
    log.log_step(format!("purchase as {}", order.name));
    let confirmation = modal.fill_order_form(&order).await?.click_purchase().await?;
    verify(log, confirmation.is_successful().await?, "thank-you heading shown")?;
    let details = confirmation.details().await?;
    log.log_info(format!("order {} on {}", details.id, details.date));
    verify_amount(log, "charged amount", details.amount, total)?;
    verify_eq(log, "name on order", details.name.as_str(), order.name.as_str())?;
    verify_eq(log, "card on order", details.card.as_str(), order.card.as_str())?;

    log.log_step("confirm");
    let cart = confirmation.click_ok().await?.click_cart().await?;
    verify_eq(log, "cart rows after purchase", cart.get_cart_item_count().await?, 0)
}

async fn checkout_missing_fields<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    add_products(session, log, &[1]).await?;
    let cart = CartPage::open(session).await?;
    cart.wait_for_item_count(1).await?;

    let incomplete = OrderForm {
        name: String::new(),
        card: String::new(),
        ..OrderForm::sample()
    };
    log.log_step("purchase without name and card");
    let alert = cart
        .click_place_order()
        .await?
        .fill_order_form(&incomplete)
        .await?
        .submit_expecting_alert()
        .await?;
    verify_alert(
        log,
        "incomplete-order alert",
        alert,
        &session.fixtures().order_incomplete_alert,
    )
}

async fn user_journey<D: BrowserDriver>(
    session: &BrowserSession<D>,
    log: &mut TestLog,
) -> ProbeResult<()> {
    let credentials = register_new_user(session, log).await?;
    log.log_step("log in");
    let home = HomePage::open(session)
        .await?
        .click_login_link()
        .await?
        .login_and_wait(&credentials)
        .await?;
    verify(log, home.is_logged_in().await, "logged in")?;

    log.log_step("browse laptops");
    let home = home.select_category(Category::Laptops).await?;
    let laptop = home.click_product("Sony vaio i5").await?;
    let laptop_price = laptop.price().await?;
    let alert = laptop.add_to_cart().await?;
    verify_contains(log, "laptop added", &alert, &session.fixtures().product_added_alert)?;

    log.log_step("browse phones");
    let home = laptop.nav().click_home().await?.select_category(Category::Phones).await?;
    let phone = home.click_product("Nexus 6").await?;
    let phone_price = phone.price().await?;
    let alert = phone.add_to_cart().await?;
    verify_contains(log, "phone added", &alert, &session.fixtures().product_added_alert)?;

    log.log_step("review cart");
    let cart = phone.go_to_cart().await?;
    cart.wait_for_item_count(2).await?;
    let expected = laptop_price + phone_price;
    verify_amount(log, "cart total", cart.wait_for_total(expected).await?, expected)?;

    log.log_step("drop the phone");
    let cart = cart.delete_item("Nexus 6").await?;
    verify_amount(
        log,
        "total after delete",
        cart.wait_for_total(laptop_price).await?,
        laptop_price,
    )?;

    log.log_step("check out");
    let home = cart.complete_purchase(&OrderForm::sample()).await?;
    log.log_pass("purchase confirmed");
    verify(log, home.is_logged_in().await, "still logged in after purchase")?;

    log.log_step("log out");
    let home = home.logout().await?;
    verify(log, !home.is_logged_in().await, "logged out")
}

// =============================================================================
// SUITE
// =============================================================================

/// Counts of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    /// Journeys attempted or skipped
    pub total: usize,
    /// Passed journeys
    pub passed: usize,
    /// Failed journeys
    pub failed: usize,
    /// Journeys skipped after a stop
    pub skipped: usize,
    /// Time spent in journeys
    pub duration: Duration,
}

impl SuiteSummary {
    fn from_reporter(reporter: &Reporter) -> Self {
        Self {
            total: reporter.total_count(),
            passed: reporter.passed_count(),
            failed: reporter.failed_count(),
            skipped: reporter.skipped_count(),
            duration: reporter.total_duration(),
        }
    }

    /// No journey failed
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs journeys, one fresh session each
///
/// ```ignore
/// let suite = Suite::new(MockStoreFactory::new(MockStore::new(), settings));
/// let mut reporter = Reporter::new();
/// let summary = suite.run(&mut reporter).await;
/// reporter.flush(Path::new("target/report"))?;
/// ```
#[derive(Debug)]
pub struct Suite<F: SessionFactory> {
    factory: F,
    journeys: Vec<Journey>,
    screenshot_on_failure: bool,
}

impl<F: SessionFactory> Suite<F> {
    /// Every journey over sessions from `factory`
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            journeys: Journey::ALL.to_vec(),
            screenshot_on_failure: true,
        }
    }

    /// Run only these journeys, in this order
    #[must_use]
    pub fn with_journeys(mut self, journeys: Vec<Journey>) -> Self {
        self.journeys = journeys;
        self
    }

    /// Skip the failure screenshot
    #[must_use]
    pub const fn without_screenshots(mut self) -> Self {
        self.screenshot_on_failure = false;
        self
    }

    /// Selected journeys
    #[must_use]
    pub fn journeys(&self) -> &[Journey] {
        &self.journeys
    }

    /// Run every selected journey
    pub async fn run(&self, reporter: &mut Reporter) -> SuiteSummary {
        self.run_with(reporter, |_| {}).await
    }

    /// Run every selected journey, calling `on_finished` after each one
    pub async fn run_with(
        &self,
        reporter: &mut Reporter,
        mut on_finished: impl FnMut(&TestLog),
    ) -> SuiteSummary {
        tracing::info!(
            factory = %self.factory.describe(),
            journeys = self.journeys.len(),
            "suite start"
        );
        for &journey in &self.journeys {
            let stop = reporter.should_stop();
            let log = reporter.create_test(journey.name(), journey.description());
            if stop {
                log.skip("skipped after an earlier failure");
            } else {
                self.run_one(journey, log).await;
            }
            log.finish();
            on_finished(log);
        }
        let summary = SuiteSummary::from_reporter(reporter);
        tracing::info!(passed = summary.passed, failed = summary.failed, "suite finished");
        summary
    }

    async fn run_one(&self, journey: Journey, log: &mut TestLog) {
        let session = match self.factory.create().await {
            Ok(session) => session,
            Err(err) => {
                log.log_fail(format!("could not start browser session: {err}"));
                return;
            }
        };

        let outcome = AssertUnwindSafe(journey.run(&session, log))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if log.error.is_none() {
                    log.log_fail(err.to_string());
                }
            }
            Err(payload) => log.log_fail(format!("journey panicked: {}", panic_message(&*payload))),
        }

        if log.status.is_failed() && self.screenshot_on_failure {
            capture_failure(&session, log).await;
        }
        if let Err(err) = session.close().await {
            log.log_warning(format!("closing the browser failed: {err}"));
        }
    }
}

async fn capture_failure<D: BrowserDriver>(session: &BrowserSession<D>, log: &mut TestLog) {
    let shot = match session.screenshot().await {
        Err(ProbeError::UnexpectedAlert { text }) => {
            log.log_info(format!("dismissing alert {text:?} before screenshot"));
            let _ = session.alerts().dismiss_if_present().await;
            session.screenshot().await
        }
        other => other,
    };
    match shot {
        Ok(shot) => log.attach_screenshot("on failure", &shot),
        Err(err) => log.log_warning(format!("no failure screenshot: {err}")),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod registry_tests {
        use super::*;

        #[test]
        fn test_names_are_unique_and_parse_back() {
            let mut seen = std::collections::HashSet::new();
            for journey in Journey::ALL {
                assert!(seen.insert(journey.name()));
                assert_eq!(journey.name().parse::<Journey>().unwrap(), journey);
                assert!(!journey.description().is_empty());
            }
        }

        #[test]
        fn test_parse_accepts_dashes_and_case() {
            assert_eq!("Login-Valid".parse::<Journey>().unwrap(), Journey::LoginValid);
        }

        #[test]
        fn test_select() {
            assert_eq!(Journey::select::<&str>(&[]).unwrap().len(), Journey::ALL.len());
            assert_eq!(
                Journey::select(&["pagination", "contact_form"]).unwrap(),
                vec![Journey::Pagination, Journey::ContactForm]
            );
            assert!(matches!(
                Journey::select(&["nope"]),
                Err(ProbeError::Config { .. })
            ));
        }
    }

    mod verify_tests {
        use super::*;

        #[test]
        fn test_failed_check_fails_the_log() {
            let mut reporter = Reporter::new();
            let log = reporter.create_test("t", "");
            assert!(verify(log, true, "fine").is_ok());
            let err = verify_eq(log, "count", 1, 2).unwrap_err();
            assert!(matches!(err, ProbeError::Assertion { .. }));
            assert!(log.status.is_failed());
            assert_eq!(log.error.as_deref(), Some("count: expected 2, got 1"));
        }

        #[test]
        fn test_missing_alert_fails() {
            let mut reporter = Reporter::new();
            let log = reporter.create_test("t", "");
            assert!(verify_alert(log, "alert", None, "fill out").is_err());
            assert!(verify_alert(log, "alert", Some("Please fill out".into()), "fill out").is_ok());
        }

        #[test]
        fn test_amount_tolerance() {
            let mut reporter = Reporter::new();
            let log = reporter.create_test("t", "");
            assert!(verify_amount(log, "total", 150.504, 150.5).is_ok());
            assert!(verify_amount(log, "total", 150.6, 150.5).is_err());
        }

        #[test]
        fn test_panic_message() {
            let boxed: Box<dyn Any + Send> = Box::new("boom");
            assert_eq!(panic_message(&*boxed), "boom");
            let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
            assert_eq!(panic_message(&*boxed), "bang");
            let boxed: Box<dyn Any + Send> = Box::new(7_u8);
            assert_eq!(panic_message(&*boxed), "non-string panic payload");
        }
    }
}
