//! Integration tests for loading the location table over HTTP.
//!
//! Run with: cargo test -p giftshop-integration-tests --test address_resolver

use giftshop_client::{LoadState, Session};
use giftshop_core::{AddressError, AddressField, AddressSelection};
use giftshop_integration_tests::FakeBackend;

async fn setup() -> (FakeBackend, Session) {
    let backend = FakeBackend::start().await;
    let session = Session::start(backend.config()).expect("Failed to start session");
    (backend, session)
}

#[tokio::test]
async fn test_loads_from_backend() {
    let (backend, session) = setup().await;
    let address = session.address();
    assert_eq!(address.load_state(), LoadState::Loading);

    session.load_address_data().await;

    assert!(address.load_state().is_ready());
    assert_eq!(backend.hits("GET /addressData.json"), 1);
    assert_eq!(address.list_states(), vec!["Karnataka", "Tamil Nadu"]);
    assert_eq!(
        address.list_districts("Karnataka"),
        vec!["Bengaluru Urban", "Mysuru"]
    );
    assert_eq!(
        address.list_areas("Tamil Nadu", "Chennai"),
        vec!["Adyar", "T. Nagar"]
    );
}

#[tokio::test]
async fn test_unknown_names_yield_empty_lists() {
    let (_backend, session) = setup().await;
    session.load_address_data().await;
    let address = session.address();

    assert!(address.list_districts("Atlantis").is_empty());
    assert!(address.list_areas("Karnataka", "Chennai").is_empty());
    assert!(address.list_areas("", "").is_empty());
}

#[tokio::test]
async fn test_malformed_document_is_error_state() {
    let (backend, session) = setup().await;
    backend.set_address_data("{\"KA\": [oops");

    session.load_address_data().await;

    let state = session.address().load_state();
    assert!(state.error().is_some());
    assert!(session.address().list_states().is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_error_state() {
    for status in [404, 503] {
        let (backend, session) = setup().await;
        backend.set_address_status(status);

        session.load_address_data().await;

        let state = session.address().load_state();
        assert!(
            state.error().is_some_and(|e| e.contains("failed to fetch")),
            "expected error state for {status}, got {state:?}"
        );
        assert!(session.address().list_states().is_empty());
        assert_eq!(backend.hits("GET /addressData.json"), 1);
    }
}

#[tokio::test]
async fn test_watchers_see_ready() {
    let (_backend, session) = setup().await;
    let mut rx = session.address().watch();

    session.load_address_data().await;

    rx.changed().await.expect("sender alive");
    assert!(rx.borrow().is_ready());
}

#[tokio::test]
async fn test_form_flow_with_cascade_reset() {
    let (_backend, session) = setup().await;
    session.load_address_data().await;
    let address = session.address();

    let mut selection = AddressSelection::default();
    for (field, value) in [
        (AddressField::State, "Karnataka"),
        (AddressField::District, "Mysuru"),
        (AddressField::Area, "Chamundipuram"),
        (AddressField::Pincode, "570004"),
    ] {
        selection = address.apply_field_change(&selection, field, value);
    }
    assert_eq!(address.validate(&selection), Ok(()));

    // Changing the state wipes everything below it.
    selection = address.apply_field_change(&selection, AddressField::State, "Tamil Nadu");
    assert_eq!(selection.district, "");
    assert_eq!(selection.area, "");
    assert_eq!(selection.pincode, "");
    assert_eq!(
        address.validate(&selection),
        Err(AddressError::Missing(AddressField::District))
    );
}

#[tokio::test]
async fn test_area_must_belong_to_district() {
    let (_backend, session) = setup().await;
    session.load_address_data().await;

    let selection = AddressSelection {
        state: "Karnataka".to_string(),
        district: "Bengaluru Urban".to_string(),
        area: "Adyar".to_string(),
        pincode: "560038".to_string(),
    };

    assert!(matches!(
        session.address().validate(&selection),
        Err(AddressError::UnknownArea { .. })
    ));
}
