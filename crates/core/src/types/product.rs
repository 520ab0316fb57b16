//! Catalog products as served by `GET /api/products`.

use core::fmt;
use core::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product in the catalog.
///
/// Owned by the backend; the client only ever holds read-only copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    /// Signed: other clients may record oversold products below zero.
    #[serde(default)]
    pub stock: i64,
    /// Creation timestamp (naive UTC, as the backend records it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Product {
    /// Whether the product belongs to `category`.
    ///
    /// Matching is exact, as the backend stores the category name verbatim.
    #[must_use]
    pub fn in_category(&self, category: Category) -> bool {
        self.category == category.as_str()
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Payload for `POST /api/admin/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub image_url: String,
    pub stock: u32,
}

/// The fixed storefront categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Beauty,
    Fashion,
    Home,
    Sports,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Self; 5] = [
        Self::Electronics,
        Self::Beauty,
        Self::Fashion,
        Self::Home,
        Self::Sports,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Beauty => "Beauty",
            Self::Fashion => "Fashion",
            Self::Home => "Home",
            Self::Sports => "Sports",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_product() {
        // Extra keys such as Mongo's `_id` are ignored
        let json = r#"{
            "_id": "65a1",
            "id": "p-1",
            "name": "Headphones",
            "description": "Wireless",
            "price": 59.5,
            "category": "Electronics",
            "image_url": "https://img/1.jpg",
            "stock": 3,
            "created_at": "2024-05-01T10:20:30.123456"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new("p-1"));
        assert_eq!(product.price, Price::from_cents(5950));
        assert!(product.in_category(Category::Electronics));
        assert!(!product.in_category(Category::Home));
        assert!(product.in_stock());
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_negative_stock_is_out_of_stock() {
        let json = r#"{"id": "p-2", "name": "Kettle", "price": 20, "stock": -3}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.stock, -3);
        assert!(!product.in_stock());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("beauty".parse::<Category>().unwrap(), Category::Beauty);
        assert_eq!("Sports".parse::<Category>().unwrap(), Category::Sports);
        assert!("Toys".parse::<Category>().is_err());
    }
}
