//! Integration tests for the cart store.
//!
//! Run with: cargo test -p giftshop-integration-tests --test cart_store

use std::time::Duration;

use giftshop_client::{ErrorCategory, MutationKind, MutationState, NoticeKind, Session, StoreEvent};
use giftshop_integration_tests::{CANDLE, FakeBackend, HAMPER, UNKNOWN, pid};

async fn setup() -> (FakeBackend, Session) {
    let backend = FakeBackend::start().await;
    backend.add_product(HAMPER, "Festive Hamper", "100.00", 10);
    backend.add_product(CANDLE, "Soy Candle", "49.50", 5);
    let session = Session::start(backend.config()).expect("Failed to start session");
    (backend, session)
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_snapshot_totals_from_server_lines() {
    let (backend, session) = setup().await;
    backend.seed_cart(HAMPER, 2);
    backend.seed_cart(CANDLE, 1);

    let snapshot = session.cart().snapshot().await.expect("snapshot");

    assert_eq!(snapshot.lines.len(), 2);
    assert_eq!(snapshot.totals.total_items, 3);
    assert_eq!(snapshot.totals.total_price.to_string(), "₹249.50");
    assert_eq!(snapshot.totals.unpriced_lines, 0);
}

#[tokio::test]
async fn test_empty_cart() {
    let (_backend, session) = setup().await;

    let snapshot = session.cart().snapshot().await.expect("snapshot");

    assert!(snapshot.is_empty());
    assert_eq!(snapshot.totals.total_items, 0);
    assert_eq!(snapshot.totals.total_price.to_string(), "₹0.00");
}

#[tokio::test]
async fn test_reads_are_cached_until_invalidated() {
    let (backend, session) = setup().await;
    let cart = session.cart();

    cart.lines().await.expect("first read");
    cart.lines().await.expect("second read");
    assert_eq!(backend.hits("GET /api/cart"), 1);

    cart.add_item(&pid(HAMPER), 1).await.expect("add");
    assert_eq!(cart.quantity_of(&pid(HAMPER)).await.expect("read"), 1);
    assert_eq!(backend.hits("GET /api/cart"), 2);
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_add_item_invalidates_and_emits() {
    let (backend, session) = setup().await;
    let mut events = session.subscribe();
    let cart = session.cart();

    cart.add_item(&pid(HAMPER), 2).await.expect("add");

    assert_eq!(backend.cart_quantity(HAMPER), 2);
    assert_eq!(events.recv().await.expect("event"), StoreEvent::CartInvalidated);
    assert!(cart.contains(&pid(HAMPER)).await.expect("read"));
    assert!(!cart.contains(&pid(CANDLE)).await.expect("read"));
}

#[tokio::test]
async fn test_add_one_accumulates() {
    let (backend, session) = setup().await;
    let cart = session.cart();

    cart.add_one(&pid(CANDLE)).await.expect("first add");
    cart.add_one(&pid(CANDLE)).await.expect("second add");

    assert_eq!(backend.cart_quantity(CANDLE), 2);
    assert_eq!(cart.quantity_of(&pid(CANDLE)).await.expect("read"), 2);
}

#[tokio::test]
async fn test_update_quantity() {
    let (backend, session) = setup().await;
    backend.seed_cart(HAMPER, 1);
    let cart = session.cart();
    assert_eq!(cart.quantity_of(&pid(HAMPER)).await.expect("read"), 1);

    cart.update_quantity(&pid(HAMPER), 4).await.expect("update");

    let snapshot = cart.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.totals.total_items, 4);
    assert_eq!(snapshot.totals.total_price.to_string(), "₹400.00");
}

#[tokio::test]
async fn test_remove_and_clear() {
    let (backend, session) = setup().await;
    backend.seed_cart(HAMPER, 1);
    backend.seed_cart(CANDLE, 3);
    let cart = session.cart();

    cart.remove_item(&pid(HAMPER)).await.expect("remove");
    let snapshot = cart.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.lines.len(), 1);
    assert!(snapshot.line(&pid(HAMPER)).is_none());

    cart.clear_cart().await.expect("clear");
    assert!(cart.snapshot().await.expect("snapshot").is_empty());
    assert_eq!(backend.hits("DELETE /api/cart"), 1);
}

#[tokio::test]
async fn test_pending_while_request_in_flight() {
    let (backend, session) = setup().await;
    backend.set_mutation_delay(Duration::from_millis(150));
    let cart = session.cart();
    assert_eq!(cart.state(), MutationState::Idle);

    let in_flight = {
        let cart = cart.clone();
        tokio::spawn(async move { cart.add_item(&pid(HAMPER), 1).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(cart.is_pending());

    in_flight.await.expect("join").expect("add");
    assert_eq!(cart.state(), MutationState::Idle);
}

#[tokio::test]
async fn test_failed_mutation_returns_to_idle() {
    let (_backend, session) = setup().await;
    let cart = session.cart();

    let _ = cart.add_item(&pid(HAMPER), 50).await;

    assert_eq!(cart.state(), MutationState::Idle);
}

// ============================================================================
// Error classification
// ============================================================================

#[tokio::test]
async fn test_insufficient_stock_notice() {
    let (backend, session) = setup().await;
    let mut events = session.subscribe();

    let notice = session
        .cart()
        .add_item(&pid(CANDLE), 6)
        .await
        .expect_err("stock is 5");

    assert_eq!(notice.kind, NoticeKind::InsufficientStock);
    assert_eq!(notice.title, "Limited Stock Available");
    assert_eq!(notice.message, "Insufficient stock. Only 5 available");
    assert_eq!(notice.mutation, MutationKind::AddToCart);
    assert_eq!(notice.category(), ErrorCategory::ValidationFailure);
    assert_eq!(backend.cart_quantity(CANDLE), 0);
    assert_eq!(
        events.recv().await.expect("event"),
        StoreEvent::Notice(notice)
    );
}

#[tokio::test]
async fn test_minimum_order_quantity_notice() {
    let (backend, session) = setup().await;
    backend.set_min_order_quantity(HAMPER, 3);

    let notice = session
        .cart()
        .add_item(&pid(HAMPER), 1)
        .await
        .expect_err("minimum is 3");

    assert_eq!(notice.kind, NoticeKind::MinimumOrderQuantity);
    assert_eq!(notice.title, "Minimum Order Quantity");
}

#[tokio::test]
async fn test_below_minimum_on_update() {
    let (backend, session) = setup().await;
    backend.set_min_order_quantity(HAMPER, 3);
    backend.seed_cart(HAMPER, 3);

    let notice = session
        .cart()
        .update_quantity(&pid(HAMPER), 2)
        .await
        .expect_err("minimum is 3");

    assert_eq!(notice.kind, NoticeKind::BelowMinimum);
    assert_eq!(notice.title, "Cannot Reduce Quantity");
    assert_eq!(backend.cart_quantity(HAMPER), 3);
}

#[tokio::test]
async fn test_structured_code_wins_over_message() {
    let (backend, session) = setup().await;
    backend.fail_next(409, "Request rejected", Some("INSUFFICIENT_STOCK"));

    let notice = session
        .cart()
        .add_item(&pid(HAMPER), 1)
        .await
        .expect_err("injected failure");

    assert_eq!(notice.kind, NoticeKind::InsufficientStock);
    assert_eq!(notice.message, "Request rejected");
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let (_backend, session) = setup().await;

    let notice = session
        .cart()
        .add_item(&pid(UNKNOWN), 1)
        .await
        .expect_err("unknown product");

    assert_eq!(notice.kind, NoticeKind::NotFound);
    assert_eq!(notice.category(), ErrorCategory::NotFound);
}

#[tokio::test]
async fn test_server_error_is_generic_with_server_message() {
    let (backend, session) = setup().await;
    backend.fail_next(500, "Database unavailable", None);

    let notice = session
        .cart()
        .clear_cart()
        .await
        .expect_err("injected failure");

    assert_eq!(notice.kind, NoticeKind::Generic);
    assert_eq!(notice.title, "Something Went Wrong");
    assert_eq!(notice.message, "Database unavailable");
    assert_eq!(notice.category(), ErrorCategory::Unknown);
}

#[tokio::test]
async fn test_failed_mutation_keeps_cached_lines() {
    let (backend, session) = setup().await;
    backend.seed_cart(HAMPER, 1);
    let cart = session.cart();
    cart.lines().await.expect("read");

    let _ = cart.add_item(&pid(CANDLE), 99).await;
    cart.lines().await.expect("read");

    assert_eq!(backend.hits("GET /api/cart"), 1);
}
