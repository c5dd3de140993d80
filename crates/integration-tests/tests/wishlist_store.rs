//! Integration tests for the wishlist store.
//!
//! Run with: cargo test -p giftshop-integration-tests --test wishlist_store

use giftshop_client::{MutationKind, MutationState, NoticeKind, Session, StoreEvent};
use giftshop_integration_tests::{CANDLE, FakeBackend, HAMPER, pid};

async fn setup() -> (FakeBackend, Session) {
    let backend = FakeBackend::start().await;
    backend.add_product(HAMPER, "Festive Hamper", "100.00", 10);
    backend.add_product(CANDLE, "Soy Candle", "49.50", 5);
    let session = Session::start(backend.config()).expect("Failed to start session");
    (backend, session)
}

#[tokio::test]
async fn test_entries_accept_wrapped_list() {
    let (backend, session) = setup().await;
    backend.seed_wishlist(HAMPER);
    backend.seed_wishlist(CANDLE);

    let entries = session.wishlist().entries().await.expect("entries");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].product_id, pid(HAMPER));
    let product = entries[1].product.as_ref().expect("product snapshot");
    assert_eq!(product.name, "Soy Candle");
    assert!(entries[0].created_at.is_some());
}

#[tokio::test]
async fn test_add_then_contains() {
    let (backend, session) = setup().await;
    let wishlist = session.wishlist();
    let mut events = session.subscribe();

    assert!(!wishlist.contains(&pid(HAMPER)).await.expect("check"));
    wishlist.add(&pid(HAMPER)).await.expect("add");

    assert!(backend.wishlist_contains(HAMPER));
    assert_eq!(
        events.recv().await.expect("event"),
        StoreEvent::WishlistInvalidated
    );
    assert!(wishlist.contains(&pid(HAMPER)).await.expect("check"));
    assert_eq!(backend.hits("GET /api/wishlist/check/{id}"), 2);
}

#[tokio::test]
async fn test_check_is_cached_per_product() {
    let (backend, session) = setup().await;
    backend.seed_wishlist(HAMPER);
    let wishlist = session.wishlist();

    assert!(wishlist.contains(&pid(HAMPER)).await.expect("check"));
    assert!(wishlist.contains(&pid(HAMPER)).await.expect("check"));
    assert!(!wishlist.contains(&pid(CANDLE)).await.expect("check"));

    assert_eq!(backend.hits("GET /api/wishlist/check/{id}"), 2);
}

#[tokio::test]
async fn test_remove_refreshes_entries() {
    let (backend, session) = setup().await;
    backend.seed_wishlist(HAMPER);
    backend.seed_wishlist(CANDLE);
    let wishlist = session.wishlist();
    assert_eq!(wishlist.entries().await.expect("entries").len(), 2);

    wishlist.remove(&pid(HAMPER)).await.expect("remove");

    let entries = wishlist.entries().await.expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].product_id, pid(CANDLE));
    assert_eq!(wishlist.state(), MutationState::Idle);
}

#[tokio::test]
async fn test_remove_absent_is_not_found() {
    let (_backend, session) = setup().await;

    let notice = session
        .wishlist()
        .remove(&pid(HAMPER))
        .await
        .expect_err("not saved");

    assert_eq!(notice.kind, NoticeKind::NotFound);
    assert_eq!(notice.mutation, MutationKind::RemoveFromWishlist);
}

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let (backend, session) = setup().await;
    let wishlist = session.wishlist();

    assert!(wishlist.toggle(&pid(CANDLE)).await.expect("toggle on"));
    assert!(backend.wishlist_contains(CANDLE));

    assert!(!wishlist.toggle(&pid(CANDLE)).await.expect("toggle off"));
    assert!(!backend.wishlist_contains(CANDLE));
}

#[tokio::test]
async fn test_stock_messages_do_not_apply_to_wishlist() {
    let (backend, session) = setup().await;
    backend.fail_next(400, "Insufficient stock", None);

    let notice = session
        .wishlist()
        .add(&pid(HAMPER))
        .await
        .expect_err("injected failure");

    assert_eq!(notice.kind, NoticeKind::Generic);
}

#[tokio::test]
async fn test_toggle_with_expired_session() {
    let (backend, session) = setup().await;
    backend.expire_session();
    let mut events = session.subscribe();

    let notice = session
        .wishlist()
        .toggle(&pid(HAMPER))
        .await
        .expect_err("expired");

    assert_eq!(notice.kind, NoticeKind::Unauthorized);
    assert_eq!(events.recv().await.expect("event"), StoreEvent::SessionExpired);
    assert_eq!(
        events.recv().await.expect("event"),
        StoreEvent::Notice(notice)
    );
}
