//! Integration tests for the Giftshop client.
//!
//! Tests run the real [`giftshop_client::Session`] against [`FakeBackend`],
//! an in-process axum server bound to `127.0.0.1:0` that serves the cart,
//! wishlist, auth and address-data endpoints from in-memory state.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p giftshop-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = FakeBackend::start().await;
//! backend.add_product(HAMPER, "Festive Hamper", "100.00", 10);
//!
//! let session = Session::start(backend.config()).unwrap();
//! session.cart().add_item(&pid(HAMPER), 2).await.unwrap();
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use giftshop_client::ClientConfig;
use giftshop_core::ProductId;

/// Redirect delay used by test sessions.
pub const TEST_REDIRECT_DELAY: Duration = Duration::from_millis(20);

/// Product id used across tests.
pub const HAMPER: &str = "65f1c0ffee0000000000aaaa";
/// Product id used across tests.
pub const CANDLE: &str = "65f1c0ffee0000000000bbbb";
/// Product id the backend does not know.
pub const UNKNOWN: &str = "65f1c0ffee0000000000ffff";

/// Parse a product id constant.
///
/// # Panics
///
/// Panics if `raw` is not a valid id.
#[must_use]
#[allow(clippy::expect_used)]
pub fn pid(raw: &str) -> ProductId {
    ProductId::parse(raw).expect("test product id must be valid")
}

/// Location table served at `/addressData.json` unless overridden.
pub const SAMPLE_ADDRESS_DATA: &str = r#"{
    "KA": {"statename": "Karnataka", "districts": [
        {"districtname": "Bengaluru Urban", "areas": [{"areaname": "Indiranagar"}, {"areaname": "Jayanagar"}]},
        {"districtname": "Mysuru", "areas": [{"areaname": "Chamundipuram"}]}
    ]},
    "TN": {"statename": "Tamil Nadu", "districts": [
        {"districtname": "Chennai", "areas": [{"areaname": "Adyar"}, {"areaname": "T. Nagar"}]}
    ]}
}"#;

#[derive(Debug, Clone)]
struct Product {
    name: String,
    price: String,
    stock: u32,
    min_order_quantity: Option<u32>,
}

impl Product {
    fn snapshot(&self, id: &str) -> Value {
        json!({
            "_id": id,
            "name": self.name,
            "price": self.price,
            "images": [],
            "stock": self.stock,
            "minOrderQuantity": self.min_order_quantity,
        })
    }
}

#[derive(Debug)]
struct Failure {
    status: StatusCode,
    body: Value,
}

#[derive(Debug)]
struct BackendState {
    products: HashMap<String, Product>,
    cart: Vec<(String, u32)>,
    wishlist: Vec<String>,
    authenticated: bool,
    next_failure: Option<Failure>,
    mutation_delay: Duration,
    address_data: String,
    address_status: StatusCode,
    hits: HashMap<String, usize>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            products: HashMap::new(),
            cart: Vec::new(),
            wishlist: Vec::new(),
            authenticated: true,
            next_failure: None,
            mutation_delay: Duration::ZERO,
            address_data: SAMPLE_ADDRESS_DATA.to_string(),
            address_status: StatusCode::OK,
            hits: HashMap::new(),
        }
    }
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Count the request and apply auth and any injected failure.
fn preflight(state: &mut BackendState, route: &str) -> Option<Response> {
    *state.hits.entry(route.to_string()).or_default() += 1;

    if !state.authenticated {
        return Some(error(StatusCode::UNAUTHORIZED, "Not authorized, token failed"));
    }
    state
        .next_failure
        .take()
        .map(|f| (f.status, Json(f.body)).into_response())
}

async fn mutation_delay(state: &Shared) {
    let delay = lock(state).mutation_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn current_user(State(state): State<Shared>) -> Response {
    let mut state = lock(&state);
    if let Some(response) = preflight(&mut state, "GET /api/auth/user") {
        return response;
    }
    Json(json!({
        "_id": "65f1c0ffee000000000000c1",
        "name": "Asha Rao",
        "email": "asha@example.in",
        "role": "customer",
    }))
    .into_response()
}

async fn get_cart(State(state): State<Shared>) -> Response {
    let mut state = lock(&state);
    if let Some(response) = preflight(&mut state, "GET /api/cart") {
        return response;
    }
    let lines: Vec<Value> = state
        .cart
        .iter()
        .filter_map(|(id, quantity)| {
            let product = state.products.get(id)?;
            Some(json!({
                "productId": id,
                "quantity": quantity,
                "product": product.snapshot(id),
            }))
        })
        .collect();
    Json(Value::Array(lines)).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItem {
    product_id: String,
    quantity: u32,
}

async fn add_to_cart(State(shared): State<Shared>, Json(body): Json<AddItem>) -> Response {
    mutation_delay(&shared).await;
    let mut state = lock(&shared);
    if let Some(response) = preflight(&mut state, "POST /api/cart") {
        return response;
    }
    let Some(product) = state.products.get(&body.product_id).cloned() else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };

    let existing = state
        .cart
        .iter()
        .find(|(id, _)| id == &body.product_id)
        .map_or(0, |(_, q)| *q);
    let wanted = existing + body.quantity;
    if wanted > product.stock {
        return error(
            StatusCode::BAD_REQUEST,
            &format!("Insufficient stock. Only {} available", product.stock),
        );
    }
    if let Some(min) = product.min_order_quantity
        && wanted < min
    {
        return error(
            StatusCode::BAD_REQUEST,
            &format!("Minimum order quantity is {min}"),
        );
    }

    match state.cart.iter_mut().find(|(id, _)| id == &body.product_id) {
        Some(line) => line.1 = wanted,
        None => state.cart.push((body.product_id, wanted)),
    }
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

#[derive(Deserialize)]
struct UpdateQuantity {
    quantity: u32,
}

async fn update_cart(
    State(shared): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<UpdateQuantity>,
) -> Response {
    mutation_delay(&shared).await;
    let mut state = lock(&shared);
    if let Some(response) = preflight(&mut state, "PUT /api/cart/{id}") {
        return response;
    }
    let Some(product) = state.products.get(&id).cloned() else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    if body.quantity > product.stock {
        return error(
            StatusCode::BAD_REQUEST,
            &format!("Insufficient stock. Only {} available", product.stock),
        );
    }
    if let Some(min) = product.min_order_quantity
        && body.quantity < min
    {
        return error(
            StatusCode::BAD_REQUEST,
            &format!("Cannot reduce quantity below minimum order quantity of {min}"),
        );
    }
    match state.cart.iter_mut().find(|(line_id, _)| line_id == &id) {
        Some(line) => {
            line.1 = body.quantity;
            Json(json!({ "success": true })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Item not found in cart"),
    }
}

async fn remove_from_cart(State(shared): State<Shared>, Path(id): Path<String>) -> Response {
    mutation_delay(&shared).await;
    let mut state = lock(&shared);
    if let Some(response) = preflight(&mut state, "DELETE /api/cart/{id}") {
        return response;
    }
    state.cart.retain(|(line_id, _)| line_id != &id);
    Json(json!({ "success": true })).into_response()
}

async fn clear_cart(State(shared): State<Shared>) -> Response {
    mutation_delay(&shared).await;
    let mut state = lock(&shared);
    if let Some(response) = preflight(&mut state, "DELETE /api/cart") {
        return response;
    }
    state.cart.clear();
    Json(json!({ "success": true })).into_response()
}

async fn get_wishlist(State(state): State<Shared>) -> Response {
    let mut state = lock(&state);
    if let Some(response) = preflight(&mut state, "GET /api/wishlist") {
        return response;
    }
    let items: Vec<Value> = state
        .wishlist
        .iter()
        .map(|id| {
            json!({
                "productId": id,
                "product": state.products.get(id).map(|p| p.snapshot(id)),
                "createdAt": "2026-10-01T09:30:00Z",
            })
        })
        .collect();
    // The wishlist endpoint wraps its list, unlike the cart.
    Json(json!({ "items": items })).into_response()
}

async fn check_wishlist(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = lock(&state);
    if let Some(response) = preflight(&mut state, "GET /api/wishlist/check/{id}") {
        return response;
    }
    let present = state.wishlist.contains(&id);
    Json(json!({ "isInWishlist": present })).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddEntry {
    product_id: String,
}

async fn add_to_wishlist(State(shared): State<Shared>, Json(body): Json<AddEntry>) -> Response {
    mutation_delay(&shared).await;
    let mut state = lock(&shared);
    if let Some(response) = preflight(&mut state, "POST /api/wishlist") {
        return response;
    }
    if !state.products.contains_key(&body.product_id) {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }
    if state.wishlist.contains(&body.product_id) {
        return error(StatusCode::BAD_REQUEST, "Product already in wishlist");
    }
    state.wishlist.push(body.product_id);
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

async fn remove_from_wishlist(State(shared): State<Shared>, Path(id): Path<String>) -> Response {
    mutation_delay(&shared).await;
    let mut state = lock(&shared);
    if let Some(response) = preflight(&mut state, "DELETE /api/wishlist/{id}") {
        return response;
    }
    let before = state.wishlist.len();
    state.wishlist.retain(|entry| entry != &id);
    if state.wishlist.len() == before {
        return error(StatusCode::NOT_FOUND, "Product not in wishlist");
    }
    Json(json!({ "success": true })).into_response()
}

async fn address_data(State(state): State<Shared>) -> Response {
    let mut state = lock(&state);
    *state.hits.entry("GET /addressData.json".to_string()).or_default() += 1;
    if !state.address_status.is_success() {
        return error(state.address_status, "Address data unavailable");
    }
    (
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        state.address_data.clone(),
    )
        .into_response()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/user", get(current_user))
        .route("/api/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/cart/{id}", delete(remove_from_cart).put(update_cart))
        .route("/api/wishlist", get(get_wishlist).post(add_to_wishlist))
        .route("/api/wishlist/{id}", delete(remove_from_wishlist))
        .route("/api/wishlist/check/{id}", get(check_wishlist))
        .route("/addressData.json", get(address_data))
        .with_state(state)
}

// ============================================================================
// Test handle
// ============================================================================

/// In-process fake of the storefront REST backend.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Shared::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the fake, with a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Client configuration pointing at the fake, with a short redirect delay.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> ClientConfig {
        let mut config =
            ClientConfig::new(&self.base_url()).expect("fake backend URL must be valid");
        config.redirect_delay = TEST_REDIRECT_DELAY;
        config
    }

    /// Add a product to the catalog.
    pub fn add_product(&self, id: &str, name: &str, price: &str, stock: u32) {
        lock(&self.state).products.insert(
            id.to_string(),
            Product {
                name: name.to_string(),
                price: price.to_string(),
                stock,
                min_order_quantity: None,
            },
        );
    }

    /// Set a product's minimum order quantity.
    pub fn set_min_order_quantity(&self, id: &str, min: u32) {
        if let Some(product) = lock(&self.state).products.get_mut(id) {
            product.min_order_quantity = Some(min);
        }
    }

    /// Put a line straight into the server-side cart.
    pub fn seed_cart(&self, id: &str, quantity: u32) {
        lock(&self.state).cart.push((id.to_string(), quantity));
    }

    /// Put a product straight into the server-side wishlist.
    pub fn seed_wishlist(&self, id: &str) {
        lock(&self.state).wishlist.push(id.to_string());
    }

    /// Server-side cart quantity of `id`.
    #[must_use]
    pub fn cart_quantity(&self, id: &str) -> u32 {
        lock(&self.state)
            .cart
            .iter()
            .find(|(line_id, _)| line_id == id)
            .map_or(0, |(_, q)| *q)
    }

    /// Whether `id` is in the server-side wishlist.
    #[must_use]
    pub fn wishlist_contains(&self, id: &str) -> bool {
        lock(&self.state).wishlist.iter().any(|entry| entry == id)
    }

    /// Reject every request with 401 from now on.
    pub fn expire_session(&self) {
        lock(&self.state).authenticated = false;
    }

    /// Fail the next request with `status` and a `{message, code?}` body.
    pub fn fail_next(&self, status: u16, message: &str, code: Option<&str>) {
        let mut body = json!({ "message": message });
        if let Some(code) = code {
            body["code"] = Value::String(code.to_string());
        }
        lock(&self.state).next_failure = Some(Failure {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        });
    }

    /// Delay every mutation by `delay` before it is handled.
    pub fn set_mutation_delay(&self, delay: Duration) {
        lock(&self.state).mutation_delay = delay;
    }

    /// Replace the body served at `/addressData.json`.
    pub fn set_address_data(&self, body: &str) {
        body.clone_into(&mut lock(&self.state).address_data);
    }

    /// Answer `/addressData.json` with `status` instead of the document.
    pub fn set_address_status(&self, status: u16) {
        lock(&self.state).address_status =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Number of requests seen for `route`, e.g. `"GET /api/cart"`.
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        lock(&self.state).hits.get(route).copied().unwrap_or(0)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}
