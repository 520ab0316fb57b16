//! Request and response envelopes for the backend endpoints.
//!
//! List keys missing from a response decode as empty lists.

use estore_core::{CartItem, Order, Price, Product, ProductId, SessionId};
use serde::{Deserialize, Serialize};

/// `GET /` response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub message: String,
}

/// `GET /api/products` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// `GET /api/cart/{session_id}` response.
///
/// The backend also reports its own `total`; the client keeps it only for
/// diagnostics and never uses it for checkout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub total: Option<Price>,
}

/// `GET /api/admin/orders` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// `POST /api/cart` body.
#[derive(Debug, Clone, Serialize)]
pub struct AddToCartRequest<'a> {
    pub product_id: &'a ProductId,
    pub quantity: u32,
    pub session_id: &'a SessionId,
}
