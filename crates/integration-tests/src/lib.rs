//! Test harness for the EStore storefront.
//!
//! [`MockBackend`] is an in-process axum server that speaks the EStore REST
//! API with in-memory storage. It records every request and can be told to
//! fail individual routes, so tests can assert both what the storefront sent
//! and how it reacts to backend failures.
//!
//! [`ScriptedInteraction`] stands in for the user: it answers prompts and
//! confirmations from a queue and records every notification.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p estore-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use estore_core::{
    CartItem, CartItemId, CartProduct, Category, NewProduct, Price, Product, ProductId, SessionId,
    cart_total,
};
use estore_storefront::backend::BackendClient;
use estore_storefront::config::StorefrontConfig;
use estore_storefront::interaction::Interaction;
use estore_storefront::state::AppState;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

// =============================================================================
// Routes and failures
// =============================================================================

/// Backend routes, for failure injection and request filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Health,
    ListProducts,
    GetCart,
    AddToCart,
    RemoveFromCart,
    CreateOrder,
    ListOrders,
    CreateProduct,
    DeleteProduct,
}

/// How an injected failure responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Respond with this status and a JSON `detail` body.
    Status(u16),
    /// Respond 200 with a body that is not JSON.
    MalformedBody,
}

impl Failure {
    fn response(self) -> Response {
        match self {
            Self::Status(code) => {
                let status =
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(json!({ "detail": "injected failure" }))).into_response()
            }
            Self::MalformedBody => (StatusCode::OK, "<html>oops</html>").into_response(),
        }
    }
}

/// One request as seen by the mock backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub route: Route,
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

// =============================================================================
// Storage
// =============================================================================

#[derive(Debug, Clone)]
struct StoredLine {
    id: CartItemId,
    product_id: ProductId,
    quantity: u32,
    session_id: String,
}

#[derive(Debug, Default)]
struct BackendData {
    products: Vec<Product>,
    cart: Vec<StoredLine>,
    /// Newest first.
    orders: Vec<Value>,
    requests: Vec<RecordedRequest>,
    failures: HashMap<Route, Failure>,
}

impl BackendData {
    fn cart_items(&self, session_id: &str) -> Vec<CartItem> {
        self.cart
            .iter()
            .filter(|line| line.session_id == session_id)
            .filter_map(|line| {
                let product = self.products.iter().find(|p| p.id == line.product_id)?;
                Some(CartItem {
                    id: line.id.clone(),
                    product: CartProduct {
                        id: product.id.clone(),
                        name: product.name.clone(),
                        price: product.price,
                        image_url: product.image_url.clone(),
                    },
                    quantity: line.quantity,
                    subtotal: Price::new(product.price.amount() * Decimal::from(line.quantity)),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct MockState {
    data: Arc<Mutex<BackendData>>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the request and return the injected failure for `route`, if any.
    fn begin(&self, route: Route, method: Method, uri: &Uri, body: Option<&Value>) -> Option<Response> {
        let mut data = self.lock();
        data.requests.push(RecordedRequest {
            route,
            method,
            path: uri.path().to_string(),
            body: body.cloned(),
        });
        data.failures.get(&route).copied().map(Failure::response)
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": format!("{what} not found") }))).into_response()
}

fn unprocessable(e: &serde_json::Error) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": e.to_string() })),
    )
        .into_response()
}

async fn health(State(s): State<MockState>, method: Method, uri: Uri) -> Response {
    if let Some(failure) = s.begin(Route::Health, method, &uri, None) {
        return failure;
    }
    Json(json!({ "message": "Ecommerce API is running" })).into_response()
}

async fn list_products(State(s): State<MockState>, method: Method, uri: Uri) -> Response {
    if let Some(failure) = s.begin(Route::ListProducts, method, &uri, None) {
        return failure;
    }
    let data = s.lock();
    Json(json!({ "products": data.products })).into_response()
}

async fn create_product(
    State(s): State<MockState>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = s.begin(Route::CreateProduct, method, &uri, Some(&body)) {
        return failure;
    }
    let new: NewProduct = match serde_json::from_value(body) {
        Ok(new) => new,
        Err(e) => return unprocessable(&e),
    };
    let product = Product {
        id: ProductId::new(Uuid::new_v4().to_string()),
        name: new.name,
        description: new.description,
        price: new.price,
        category: new.category,
        image_url: new.image_url,
        stock: i64::from(new.stock),
        created_at: Some(chrono::Utc::now().naive_utc()),
    };
    s.lock().products.push(product.clone());
    Json(json!({ "message": "Product created successfully", "product": product })).into_response()
}

async fn delete_product(
    State(s): State<MockState>,
    method: Method,
    uri: Uri,
    Path(product_id): Path<String>,
) -> Response {
    if let Some(failure) = s.begin(Route::DeleteProduct, method, &uri, None) {
        return failure;
    }
    let mut data = s.lock();
    let before = data.products.len();
    data.products.retain(|p| p.id.as_str() != product_id);
    if data.products.len() == before {
        return not_found("Product");
    }
    Json(json!({ "message": "Product deleted successfully" })).into_response()
}

async fn get_cart(
    State(s): State<MockState>,
    method: Method,
    uri: Uri,
    Path(session_id): Path<String>,
) -> Response {
    if let Some(failure) = s.begin(Route::GetCart, method, &uri, None) {
        return failure;
    }
    let data = s.lock();
    let items = data.cart_items(&session_id);
    let total = cart_total(&items);
    Json(json!({ "cart_items": items, "total": total })).into_response()
}

#[derive(Debug, Deserialize)]
struct AddToCartBody {
    product_id: ProductId,
    quantity: u32,
    session_id: String,
}

async fn add_to_cart(
    State(s): State<MockState>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = s.begin(Route::AddToCart, method, &uri, Some(&body)) {
        return failure;
    }
    let add: AddToCartBody = match serde_json::from_value(body) {
        Ok(add) => add,
        Err(e) => return unprocessable(&e),
    };

    let mut data = s.lock();
    let existing = data
        .cart
        .iter_mut()
        .find(|line| line.product_id == add.product_id && line.session_id == add.session_id);
    match existing {
        Some(line) => line.quantity += add.quantity,
        None => data.cart.push(StoredLine {
            id: CartItemId::new(Uuid::new_v4().to_string()),
            product_id: add.product_id,
            quantity: add.quantity,
            session_id: add.session_id,
        }),
    }
    Json(json!({ "message": "Item added to cart" })).into_response()
}

async fn remove_from_cart(
    State(s): State<MockState>,
    method: Method,
    uri: Uri,
    Path(item_id): Path<String>,
) -> Response {
    if let Some(failure) = s.begin(Route::RemoveFromCart, method, &uri, None) {
        return failure;
    }
    let mut data = s.lock();
    let before = data.cart.len();
    data.cart.retain(|line| line.id.as_str() != item_id);
    if data.cart.len() == before {
        return not_found("Cart item");
    }
    Json(json!({ "message": "Item removed from cart" })).into_response()
}

async fn create_order(
    State(s): State<MockState>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = s.begin(Route::CreateOrder, method, &uri, Some(&body)) {
        return failure;
    }
    let Value::Object(mut order) = body else {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "expected object" })))
            .into_response();
    };
    order.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
    order.insert("status".to_string(), json!("pending"));
    order.insert(
        "created_at".to_string(),
        json!(chrono::Utc::now().naive_utc()),
    );

    let mut data = s.lock();
    if let Some(session_id) = order.get("session_id").and_then(Value::as_str) {
        data.cart.retain(|line| line.session_id != session_id);
    }
    let order = Value::Object(order);
    data.orders.insert(0, order.clone());
    Json(json!({ "message": "Order created successfully", "order": order })).into_response()
}

async fn list_orders(State(s): State<MockState>, method: Method, uri: Uri) -> Response {
    if let Some(failure) = s.begin(Route::ListOrders, method, &uri, None) {
        return failure;
    }
    let data = s.lock();
    Json(json!({ "orders": data.orders })).into_response()
}

fn router(state: MockState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/products", get(list_products))
        .route("/api/admin/products", post(create_product))
        .route("/api/admin/products/{product_id}", delete(delete_product))
        .route("/api/cart", post(add_to_cart))
        .route(
            "/api/cart/{id}",
            get(get_cart).delete(remove_from_cart),
        )
        .route("/api/orders", post(create_order))
        .route("/api/admin/orders", get(list_orders))
        .with_state(state)
}

// =============================================================================
// MockBackend
// =============================================================================

/// In-process EStore backend bound to an ephemeral local port.
///
/// The server task is aborted on drop.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let state = MockState::default();
        let app = router(state.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { addr, state, server }
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Storefront configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the local URL is rejected, which would be a harness bug.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::for_backend(&self.url()).expect("mock backend URL is valid")
    }

    /// Backend client pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> BackendClient {
        BackendClient::new(&self.config()).expect("build backend client")
    }

    /// Application state with a fixed session identifier.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn app_state(&self, session_id: &SessionId) -> AppState {
        AppState::with_session_id(self.config(), session_id.clone()).expect("build app state")
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Insert a product directly into storage.
    pub fn seed_product(&self, name: &str, price: Price, category: Category, stock: i64) -> Product {
        let product = Product {
            id: ProductId::new(Uuid::new_v4().to_string()),
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            category: category.as_str().to_string(),
            image_url: format!("https://img.example.com/{}.jpg", name.to_lowercase()),
            stock,
            created_at: Some(chrono::Utc::now().naive_utc()),
        };
        self.state.lock().products.push(product.clone());
        product
    }

    /// Insert a raw order document, as another client might have written it.
    pub fn seed_order(&self, order: Value) {
        self.state.lock().orders.insert(0, order);
    }

    /// Insert a cart line directly into storage.
    pub fn seed_cart_line(
        &self,
        session_id: &SessionId,
        product_id: &ProductId,
        quantity: u32,
    ) -> CartItemId {
        let id = CartItemId::new(Uuid::new_v4().to_string());
        self.state.lock().cart.push(StoredLine {
            id: id.clone(),
            product_id: product_id.clone(),
            quantity,
            session_id: session_id.to_string(),
        });
        id
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.state.lock().products.clone()
    }

    /// The cart exactly as `GET /api/cart/{session_id}` would return it.
    #[must_use]
    pub fn cart(&self, session_id: &SessionId) -> Vec<CartItem> {
        self.state.lock().cart_items(session_id.as_str())
    }

    /// Stored orders, newest first.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.state.lock().orders.clone()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests that hit `route`, oldest first.
    #[must_use]
    pub fn requests_to(&self, route: Route) -> Vec<RecordedRequest> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.route == route)
            .cloned()
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }

    // =========================================================================
    // Failure injection
    // =========================================================================

    /// Make every request to `route` fail until [`Self::recover`] is called.
    pub fn fail(&self, route: Route, failure: Failure) {
        self.state.lock().failures.insert(route, failure);
    }

    pub fn recover(&self, route: Route) {
        self.state.lock().failures.remove(&route);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// ScriptedInteraction
// =============================================================================

/// User stand-in with queued answers.
///
/// Prompts beyond the queue are dismissed; confirmations beyond the queue are
/// declined.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    answers: VecDeque<Option<String>>,
    confirms: VecDeque<bool>,
    pub notifications: Vec<String>,
    pub prompts: Vec<String>,
    pub confirmations: Vec<String>,
}

impl ScriptedInteraction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next prompt.
    #[must_use]
    pub fn answer(mut self, answer: &str) -> Self {
        self.answers.push_back(Some(answer.to_string()));
        self
    }

    /// Queue a dismissal for the next prompt.
    #[must_use]
    pub fn dismiss(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    /// Queue a reply for the next confirmation.
    #[must_use]
    pub fn confirm_with(mut self, yes: bool) -> Self {
        self.confirms.push_back(yes);
        self
    }

    /// The most recent notification.
    #[must_use]
    pub fn last_notification(&self) -> Option<&str> {
        self.notifications.last().map(String::as_str)
    }
}

impl Interaction for ScriptedInteraction {
    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }

    fn prompt(&mut self, question: &str) -> Option<String> {
        self.prompts.push(question.to_string());
        self.answers.pop_front().flatten()
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.confirmations.push(question.to_string());
        self.confirms.pop_front().unwrap_or(false)
    }
}
