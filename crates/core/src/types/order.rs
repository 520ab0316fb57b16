//! Orders created at checkout and listed in the admin panel.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cart::CartItem;
use super::email::Email;
use super::id::OrderId;
use super::price::Price;
use super::session::SessionId;

/// Body of `POST /api/orders`.
///
/// `items` is the cart exactly as last fetched and `total` the sum of their
/// subtotals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<CartItem>,
    pub total: Price,
    pub customer_email: Email,
    pub session_id: SessionId,
}

/// Order lifecycle status.
///
/// The backend creates every order as `pending`; other values are kept as
/// [`OrderStatus::Other`] rather than failing the whole order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    #[serde(other)]
    Other,
}

/// One line of a stored order.
///
/// Orders placed through this client carry full cart lines; orders written by
/// other clients may hold any JSON object and are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderLine {
    Cart(CartItem),
    Raw(Value),
}

impl OrderLine {
    /// Units on this line; zero when a raw line has no usable `quantity`.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        match self {
            Self::Cart(item) => item.quantity,
            Self::Raw(value) => value
                .get("quantity")
                .and_then(Value::as_u64)
                .and_then(|q| u32::try_from(q).ok())
                .unwrap_or(0),
        }
    }
}

/// An order as returned by `GET /api/admin/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    pub total: Price,
    /// Stored verbatim; other clients may not validate it.
    pub customer_email: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_is_preserved_as_other() {
        let json = r#"{
            "id": "o-1",
            "items": [],
            "total": 0,
            "customer_email": "a@b.c",
            "status": "shipped"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Other);
        assert_eq!(order.unit_count(), 0);
        assert!(order.session_id.is_none());
    }

    #[test]
    fn test_partial_item_lines_are_kept_raw() {
        let json = r#"{
            "id": "o-2",
            "items": [
                {"product_id": "p-1", "quantity": 2},
                {
                    "id": "c-1",
                    "product": {"id": "p-2", "name": "Mug", "price": 5},
                    "quantity": 3,
                    "subtotal": 15
                },
                "gift wrap"
            ],
            "total": 25,
            "customer_email": "a@b.c"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.items.len(), 3);
        assert!(matches!(order.items.first(), Some(OrderLine::Raw(_))));
        assert!(matches!(order.items.get(1), Some(OrderLine::Cart(_))));
        assert_eq!(order.unit_count(), 5);
    }

    #[test]
    fn test_order_request_field_names() {
        let request = OrderRequest {
            items: vec![],
            total: Price::from_cents(100),
            customer_email: Email::parse("a@b.c").unwrap(),
            session_id: SessionId::parse("session_abc123xyz").unwrap(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "items": [],
                "total": 1.0,
                "customer_email": "a@b.c",
                "session_id": "session_abc123xyz"
            })
        );
    }
}
