//! Cart line items as served by `GET /api/cart/{session_id}`.

use serde::{Deserialize, Serialize};

use super::id::{CartItemId, ProductId};
use super::price::Price;

/// The product snapshot the backend joins onto each cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
}

/// A persisted association between a product and a quantity, scoped to a
/// session.
///
/// `subtotal` is computed by the backend; the client never recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: CartProduct,
    pub quantity: u32,
    pub subtotal: Price,
}

/// Sum of the server-provided subtotals.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Price {
    items.iter().map(|item| item.subtotal).sum()
}
