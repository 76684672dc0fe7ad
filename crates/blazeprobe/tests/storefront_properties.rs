//! Page-object guarantees checked against the in-memory storefront.

use blazeprobe::mock::{CartRefresh, MockDriver, MockStore, Timing};
use blazeprobe::pages::{cart, login, CartPage, HomePage};
use blazeprobe::{BrowserSession, Credentials, OrderForm, ProbeError, SessionSettings, Timeouts};
use std::time::{Duration, Instant};

fn settings() -> SessionSettings {
    SessionSettings::default().with_timeouts(Timeouts::fast())
}

fn session(store: &MockStore) -> BrowserSession<MockDriver> {
    store.session(settings())
}

mod existence_query_tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_login_controls_report_false() {
        let store = MockStore::new();
        let session = session(&store);
        let home = HomePage::open(&session).await.unwrap();
        let modal = home.click_login_link().await.unwrap();
        assert!(modal.is_username_field_displayed().await);

        session.driver().with_dom(|dom| {
            for locator in [
                login::locators::USERNAME,
                login::locators::PASSWORD,
                login::locators::LOGIN_BUTTON,
                login::locators::CLOSE_BUTTON,
                login::locators::X_ICON,
            ] {
                dom.detach_all(&locator);
            }
        });

        assert!(!modal.is_username_field_displayed().await);
        assert!(!modal.is_password_field_displayed().await);
        assert!(!modal.is_login_button_displayed().await);
        assert!(!modal.is_close_button_displayed().await);
        assert!(!modal.is_x_icon_displayed().await);
    }

    #[tokio::test]
    async fn test_existence_query_under_pending_alert_is_false() {
        let store = MockStore::new();
        let session = session(&store);
        let modal = HomePage::open(&session)
            .await
            .unwrap()
            .click_login_link()
            .await
            .unwrap();
        session.driver().with_dom(|dom| dom.raise_alert("blocking"));
        assert!(!modal.is_username_field_displayed().await);
        assert_eq!(modal.accept_alert().await.as_deref(), Some("blocking"));
    }
}

mod delete_first_tests {
    use super::*;

    #[tokio::test]
    async fn test_each_delete_removes_exactly_one_row() {
        let store = MockStore::new()
            .with_product_in_cart(1)
            .with_product_in_cart(3)
            .with_product_in_cart(10);
        let session = session(&store);
        let mut page = CartPage::open(&session).await.unwrap();
        for expected in (0..3).rev() {
            page = page.delete_first_item().await.unwrap();
            assert_eq!(page.get_cart_item_count().await.unwrap(), expected);
        }
        assert!(store.cart_titles().is_empty());
    }

    #[tokio::test]
    async fn test_delete_on_empty_cart_is_a_precondition_failure() {
        let store = MockStore::new();
        let session = session(&store);
        let page = CartPage::open(&session).await.unwrap();
        let err = page.delete_first_item().await.unwrap_err();
        assert!(matches!(err, ProbeError::Precondition { .. }));
    }
}

mod modal_title_tests {
    use super::*;

    #[tokio::test]
    async fn test_modal_titles() {
        let store = MockStore::new();
        let session = session(&store);
        let home = HomePage::open(&session).await.unwrap();

        let login = home.click_login_link().await.unwrap();
        assert_eq!(login.get_modal_title().await.unwrap(), "Log in");
        let home = login.click_close().await.unwrap();

        let sign_up = home.click_sign_up_link().await.unwrap();
        assert_eq!(sign_up.get_modal_title().await.unwrap(), "Sign up");
        let _ = sign_up.click_x().await.unwrap();
    }
}

mod alert_contract_tests {
    use super::*;

    #[tokio::test]
    async fn test_no_alert_returns_none_within_grace() {
        let store = MockStore::new();
        let session = session(&store);
        let modal = HomePage::open(&session)
            .await
            .unwrap()
            .click_login_link()
            .await
            .unwrap();

        let started = Instant::now();
        assert_eq!(modal.get_alert_text().await, None);
        let grace = Duration::from_millis(Timeouts::fast().alert_grace_ms);
        assert!(started.elapsed() < grace + Duration::from_millis(500));
        assert_eq!(modal.accept_alert().await, None);
    }

    #[tokio::test]
    async fn test_empty_login_alert_mentions_fill_out() {
        let store = MockStore::new();
        let session = session(&store);
        let modal = HomePage::open(&session)
            .await
            .unwrap()
            .click_login_link()
            .await
            .unwrap()
            .login(&Credentials::empty())
            .await
            .unwrap();

        let text = modal.get_alert_text().await.unwrap();
        assert!(text.contains("fill out"), "alert was {text:?}");
        assert!(modal.accept_alert().await.is_some());
        assert!(modal.is_displayed().await);
    }
}

mod bulk_delete_tests {
    use super::*;

    async fn delete_all(store: MockStore, rows: usize) {
        let store = (0..rows).fold(store, |s, i| s.with_cart_item(&format!("Item {i}"), 10.0));
        let session = session(&store);
        let page = CartPage::open(&session).await.unwrap();
        assert_eq!(page.get_cart_item_count().await.unwrap(), rows);

        let (page, clicks) = page.delete_all_items().await.unwrap();
        assert_eq!(clicks, rows);
        assert_eq!(page.get_cart_item_count().await.unwrap(), 0);
        assert_eq!(session.driver().count_calls("click:link=Delete"), rows);
    }

    #[tokio::test]
    async fn test_empty_cart_needs_no_clicks() {
        delete_all(MockStore::new(), 0).await;
    }

    #[tokio::test]
    async fn test_rows_removed_one_by_one() {
        delete_all(MockStore::new(), 3).await;
    }

    #[tokio::test]
    async fn test_table_rerendered_after_each_delete() {
        delete_all(MockStore::new().with_full_cart_rerender(), 4).await;
    }

    #[tokio::test]
    async fn test_table_emptied_then_refilled_later() {
        let store = MockStore::new()
            .with_timing(Timing::instant())
            .with_cart_refresh(CartRefresh::Staged(Duration::from_millis(80)));
        delete_all(store.clone(), 3).await;
        assert!(store.cart_titles().is_empty());
    }

    #[tokio::test]
    async fn test_staged_refill_with_request_latency() {
        let store = MockStore::new().with_cart_refresh(CartRefresh::Staged(Duration::from_millis(50)));
        delete_all(store, 2).await;
    }

    #[tokio::test]
    async fn test_instant_backend() {
        delete_all(MockStore::new().with_timing(Timing::instant()), 2).await;
    }
}

mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_total_of_two_rows() {
        let store = MockStore::new()
            .with_cart_item("Row A", 100.0)
            .with_cart_item("Row B", 50.5);
        let session = session(&store);
        let page = CartPage::open(&session).await.unwrap();
        let total = page.wait_for_total(150.5).await.unwrap();
        assert!((total - 150.5).abs() < cart::TOTAL_TOLERANCE);
        assert!((page.get_total_price().await.unwrap() - 150.5).abs() < cart::TOTAL_TOLERANCE);
        assert_eq!(page.item_prices().await.unwrap(), vec![100.0, 50.5]);
    }

    #[tokio::test]
    async fn test_purchase_empties_cart() {
        let store = MockStore::new().with_product_in_cart(1);
        let session = session(&store);
        let page = CartPage::open(&session).await.unwrap();
        assert_eq!(page.get_cart_item_count().await.unwrap(), 1);

        let _home = page.complete_purchase(&OrderForm::sample()).await.unwrap();
        let page = CartPage::open(&session).await.unwrap();
        assert_eq!(page.get_cart_item_count().await.unwrap(), 0);
        assert!(page.get_total_price().await.unwrap().abs() < cart::TOTAL_TOLERANCE);

        let orders = store.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].name, "Jane Tester");
    }

    #[tokio::test]
    async fn test_incomplete_order_is_rejected() {
        let store = MockStore::new().with_product_in_cart(2);
        let session = session(&store);
        let form = OrderForm {
            card: String::new(),
            ..OrderForm::sample()
        };
        let alert = CartPage::open(&session)
            .await
            .unwrap()
            .click_place_order()
            .await
            .unwrap()
            .fill_order_form(&form)
            .await
            .unwrap()
            .submit_expecting_alert()
            .await
            .unwrap();
        assert!(alert.unwrap().contains("fill out"));
        assert!(store.orders().is_empty());
        assert_eq!(store.cart_titles().len(), 1);
    }
}
