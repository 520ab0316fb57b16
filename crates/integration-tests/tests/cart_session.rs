//! Integration tests for the session cart against the mock backend.
//!
//! Every mutation is expected to submit, then reload the whole cart; the
//! mock backend's storage is the source of truth the cache is compared with.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use estore_core::{CartItemId, Category, Price, SessionId};
use estore_integration_tests::{Failure, MockBackend, Route, ScriptedInteraction};
use estore_storefront::backend::{ApiError, BackendClient};
use estore_storefront::cart::{
    CartSession, CheckoutOutcome, MSG_ADD_FAILED, MSG_ADDED, MSG_EMPTY_CART, MSG_ORDER_FAILED,
    MSG_ORDER_PLACED, MSG_REMOVE_FAILED, PROMPT_EMAIL,
};
use estore_storefront::config::StorefrontConfig;
use serde_json::json;

fn session() -> SessionId {
    SessionId::parse("session_abc123xyz").unwrap()
}

async fn loaded_session(backend: &MockBackend) -> CartSession {
    let mut cart = CartSession::with_session_id(backend.client(), session());
    cart.load().await.unwrap();
    cart
}

// ============================================================================
// Load
// ============================================================================

#[tokio::test]
async fn test_load_replaces_cache_with_backend_cart() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    backend.seed_cart_line(&session(), &mug.id, 2);

    let cart = loaded_session(&backend).await;

    assert_eq!(cart.items(), backend.cart(&session()).as_slice());
    assert_eq!(cart.line_count(), 1);
    assert_eq!(cart.total(), Price::from_cents(1998));
}

#[tokio::test]
async fn test_load_is_scoped_to_session() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    let other = SessionId::parse("session_otherone").unwrap();
    backend.seed_cart_line(&other, &mug.id, 1);

    let cart = loaded_session(&backend).await;

    assert!(cart.is_empty());
    let requests = backend.requests_to(Route::GetCart);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/cart/session_abc123xyz");
}

#[tokio::test]
async fn test_failed_load_keeps_previous_cache() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    backend.seed_cart_line(&session(), &mug.id, 1);
    let mut cart = loaded_session(&backend).await;
    let before = cart.items().to_vec();

    backend.fail(Route::GetCart, Failure::Status(500));
    let err = cart.load().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(cart.items(), before.as_slice());

    backend.fail(Route::GetCart, Failure::MalformedBody);
    let err = cart.load().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
    assert_eq!(cart.items(), before.as_slice());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind then drop a listener to get a local port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = StorefrontConfig::for_backend(&format!("http://{addr}")).unwrap();
    let client = BackendClient::new(&config).unwrap();
    let mut cart = CartSession::with_session_id(client, session());

    let err = cart.load().await.unwrap_err();
    assert!(err.is_transport());
    assert!(cart.is_empty());
}

// ============================================================================
// Add / remove
// ============================================================================

#[tokio::test]
async fn test_add_submits_then_reloads() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    let mut cart = CartSession::with_session_id(backend.client(), session());
    let mut ui = ScriptedInteraction::new();

    cart.add(&mug.id, &mut ui).await.unwrap();

    let posts = backend.requests_to(Route::AddToCart);
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].body,
        Some(json!({
            "product_id": mug.id.as_str(),
            "quantity": 1,
            "session_id": "session_abc123xyz",
        }))
    );
    assert_eq!(backend.requests_to(Route::GetCart).len(), 1);
    assert_eq!(cart.items(), backend.cart(&session()).as_slice());
    assert_eq!(ui.notifications, vec![MSG_ADDED]);
}

#[tokio::test]
async fn test_adding_same_product_twice_merges_quantity() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    let mut cart = CartSession::with_session_id(backend.client(), session());
    let mut ui = ScriptedInteraction::new();

    cart.add(&mug.id, &mut ui).await.unwrap();
    cart.add(&mug.id, &mut ui).await.unwrap();

    assert_eq!(cart.line_count(), 1);
    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(cart.items()[0].subtotal, Price::from_cents(1998));
}

#[tokio::test]
async fn test_mutation_sequence_matches_backend() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    let tea = backend.seed_product("Tea", Price::from_cents(450), Category::Home, 10);
    let lamp = backend.seed_product("Lamp", Price::from_cents(2450), Category::Home, 3);
    let mut cart = CartSession::with_session_id(backend.client(), session());
    let mut ui = ScriptedInteraction::new();

    cart.add(&mug.id, &mut ui).await.unwrap();
    assert_eq!(cart.items(), backend.cart(&session()).as_slice());

    cart.add(&tea.id, &mut ui).await.unwrap();
    cart.add(&lamp.id, &mut ui).await.unwrap();
    cart.add(&tea.id, &mut ui).await.unwrap();
    assert_eq!(cart.items(), backend.cart(&session()).as_slice());

    let tea_line = cart
        .items()
        .iter()
        .find(|item| item.product.id == tea.id)
        .unwrap()
        .id
        .clone();
    cart.remove(&tea_line, &mut ui).await.unwrap();

    assert_eq!(cart.items(), backend.cart(&session()).as_slice());
    assert_eq!(cart.line_count(), 2);
    assert_eq!(cart.total(), Price::from_cents(999 + 2450));
}

#[tokio::test]
async fn test_failed_add_leaves_cache_unchanged() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    let tea = backend.seed_product("Tea", Price::from_cents(450), Category::Home, 10);
    backend.seed_cart_line(&session(), &mug.id, 1);
    let mut cart = loaded_session(&backend).await;
    let before = cart.items().to_vec();
    backend.clear_requests();

    backend.fail(Route::AddToCart, Failure::Status(500));
    let mut ui = ScriptedInteraction::new();
    let result = cart.add(&tea.id, &mut ui).await;

    assert!(result.is_err());
    assert_eq!(cart.items(), before.as_slice());
    assert_eq!(ui.notifications, vec![MSG_ADD_FAILED]);
    assert!(backend.requests_to(Route::GetCart).is_empty());
}

#[tokio::test]
async fn test_failed_reload_after_add_keeps_stale_cache() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    let mut cart = CartSession::with_session_id(backend.client(), session());
    let mut ui = ScriptedInteraction::new();

    backend.fail(Route::GetCart, Failure::Status(503));
    cart.add(&mug.id, &mut ui).await.unwrap();

    // Submitted but not reconciled: the cache still shows the old (empty) cart
    assert!(cart.is_empty());
    assert_eq!(backend.cart(&session()).len(), 1);
    assert_eq!(ui.last_notification(), Some(MSG_ADDED));

    backend.recover(Route::GetCart);
    cart.load().await.unwrap();
    assert_eq!(cart.line_count(), 1);
}

#[tokio::test]
async fn test_remove_unknown_item_still_issues_delete() {
    let backend = MockBackend::start().await;
    let mut cart = CartSession::with_session_id(backend.client(), session());
    let mut ui = ScriptedInteraction::new();

    let result = cart.remove(&CartItemId::new("missing"), &mut ui).await;

    let deletes = backend.requests_to(Route::RemoveFromCart);
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].path, "/api/cart/missing");
    assert_eq!(result.unwrap_err().status(), Some(404));
    assert_eq!(ui.notifications, vec![MSG_REMOVE_FAILED]);
    // The cart is only reloaded after a successful DELETE
    assert!(backend.requests_to(Route::GetCart).is_empty());
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_empty_cart_sends_nothing() {
    let backend = MockBackend::start().await;
    let mut cart = CartSession::with_session_id(backend.client(), session());
    let mut ui = ScriptedInteraction::new().answer("buyer@example.com");

    let outcome = cart.checkout(&mut ui).await.unwrap();

    assert_eq!(outcome, CheckoutOutcome::EmptyCart);
    assert_eq!(ui.notifications, vec![MSG_EMPTY_CART]);
    assert!(ui.prompts.is_empty());
    assert!(backend.requests_to(Route::CreateOrder).is_empty());
}

#[tokio::test]
async fn test_checkout_without_email_sends_nothing() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    backend.seed_cart_line(&session(), &mug.id, 1);
    let mut cart = loaded_session(&backend).await;

    let mut ui = ScriptedInteraction::new().dismiss().answer("   ");
    assert_eq!(
        cart.checkout(&mut ui).await.unwrap(),
        CheckoutOutcome::Cancelled
    );
    assert_eq!(
        cart.checkout(&mut ui).await.unwrap(),
        CheckoutOutcome::Cancelled
    );

    assert_eq!(ui.prompts, vec![PROMPT_EMAIL, PROMPT_EMAIL]);
    assert!(ui.notifications.is_empty());
    assert!(backend.requests_to(Route::CreateOrder).is_empty());
    assert_eq!(cart.line_count(), 1);
}

#[tokio::test]
async fn test_checkout_with_invalid_email_sends_nothing() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    backend.seed_cart_line(&session(), &mug.id, 1);
    let mut cart = loaded_session(&backend).await;

    let mut ui = ScriptedInteraction::new().answer("not-an-email");
    let outcome = cart.checkout(&mut ui).await.unwrap();

    assert!(matches!(outcome, CheckoutOutcome::InvalidEmail(_)));
    assert!(ui.last_notification().unwrap().starts_with("Invalid email"));
    assert!(backend.requests_to(Route::CreateOrder).is_empty());
}

#[tokio::test]
async fn test_checkout_submits_exact_order() {
    let backend = MockBackend::start().await;
    let headphones =
        backend.seed_product("Headphones", Price::from_cents(1999), Category::Electronics, 5);
    backend.seed_cart_line(&session(), &headphones.id, 1);
    let mut cart = loaded_session(&backend).await;
    let line = backend.cart(&session());

    let mut ui = ScriptedInteraction::new().answer(" buyer@example.com ");
    cart.checkout(&mut ui).await.unwrap();

    let orders = backend.requests_to(Route::CreateOrder);
    assert_eq!(orders.len(), 1);
    assert_eq!(
        orders[0].body,
        Some(json!({
            "items": serde_json::to_value(&line).unwrap(),
            "total": 19.99,
            "customer_email": "buyer@example.com",
            "session_id": "session_abc123xyz",
        }))
    );

    let item = &orders[0].body.as_ref().unwrap()["items"][0];
    assert_eq!(item["product"]["name"], "Headphones");
    assert_eq!(item["product"]["price"], json!(19.99));
    assert_eq!(item["quantity"], 1);
    assert_eq!(item["subtotal"], json!(19.99));
}

#[tokio::test]
async fn test_successful_checkout_clears_cart() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    let tea = backend.seed_product("Tea", Price::from_cents(450), Category::Home, 10);
    backend.seed_cart_line(&session(), &mug.id, 2);
    backend.seed_cart_line(&session(), &tea.id, 1);
    let mut cart = loaded_session(&backend).await;

    let mut ui = ScriptedInteraction::new().answer("buyer@example.com");
    let outcome = cart.checkout(&mut ui).await.unwrap();

    match outcome {
        CheckoutOutcome::Placed {
            total,
            customer_email,
        } => {
            assert_eq!(total, Price::from_cents(2448));
            assert_eq!(customer_email.as_str(), "buyer@example.com");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(cart.is_empty());
    assert_eq!(ui.notifications, vec![MSG_ORDER_PLACED]);
    assert_eq!(backend.orders().len(), 1);
    assert_eq!(backend.orders()[0]["status"], "pending");

    cart.load().await.unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let backend = MockBackend::start().await;
    let mug = backend.seed_product("Mug", Price::from_cents(999), Category::Home, 10);
    backend.seed_cart_line(&session(), &mug.id, 1);
    let mut cart = loaded_session(&backend).await;
    let before = cart.items().to_vec();

    backend.fail(Route::CreateOrder, Failure::Status(500));
    let mut ui = ScriptedInteraction::new().answer("buyer@example.com");
    let result = cart.checkout(&mut ui).await;

    assert!(result.is_err());
    assert_eq!(cart.items(), before.as_slice());
    assert_eq!(ui.notifications, vec![MSG_ORDER_FAILED]);
    assert!(backend.orders().is_empty());
}
