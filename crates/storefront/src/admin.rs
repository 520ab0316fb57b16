//! Admin panel: order list and product management.
//!
//! Same fetch-after-write pattern as the cart: product mutations reload the
//! catalog on success and never touch it on failure.

use estore_core::{Category, NewProduct, Order, Price, ProductId};
use thiserror::Error;
use tracing::instrument;

use crate::backend::{ApiError, BackendClient};
use crate::catalog::Catalog;
use crate::error::add_breadcrumb;
use crate::interaction::Interaction;

pub const MSG_PRODUCT_CREATED: &str = "Product created successfully!";
pub const MSG_PRODUCT_CREATE_FAILED: &str = "Error creating product";
pub const MSG_PRODUCT_DELETED: &str = "Product deleted successfully!";
pub const MSG_PRODUCT_DELETE_FAILED: &str = "Error deleting product";
pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this product?";

/// Errors from validating the create-product form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductFormError {
    #[error("product name cannot be empty")]
    MissingName,
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("invalid stock: {0}")]
    InvalidStock(String),
    #[error("{0}")]
    InvalidCategory(String),
}

/// Raw create-product form input, as typed by the admin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_url: String,
    pub stock: String,
}

impl ProductForm {
    /// Validate the form into a backend payload.
    ///
    /// An empty stock field means zero.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<NewProduct, ProductFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductFormError::MissingName);
        }

        let price: Price = self
            .price
            .parse()
            .map_err(|_| ProductFormError::InvalidPrice(self.price.clone()))?;
        if price.is_negative() {
            return Err(ProductFormError::NegativePrice);
        }

        let category: Category = self
            .category
            .trim()
            .parse()
            .map_err(ProductFormError::InvalidCategory)?;

        let stock_raw = self.stock.trim();
        let stock = if stock_raw.is_empty() {
            0
        } else {
            stock_raw
                .parse::<u32>()
                .map_err(|_| ProductFormError::InvalidStock(self.stock.clone()))?
        };

        Ok(NewProduct {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            price,
            category: category.as_str().to_string(),
            image_url: self.image_url.trim().to_string(),
            stock,
        })
    }
}

/// Outcome of a delete-product request that did not fail at the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The admin declined the confirmation; nothing was sent.
    Declined,
    Deleted,
}

/// Admin view state.
#[derive(Debug)]
pub struct AdminPanel {
    client: BackendClient,
    orders: Vec<Order>,
}

impl AdminPanel {
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self {
            client,
            orders: Vec::new(),
        }
    }

    /// Orders as of the last successful load, newest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Replace the cached order list.
    ///
    /// # Errors
    ///
    /// Returns the backend error after logging it; the previous list is kept.
    #[instrument(skip(self))]
    pub async fn load_orders(&mut self) -> Result<(), ApiError> {
        match self.client.list_orders().await {
            Ok(orders) => {
                tracing::debug!(count = orders.len(), "Orders loaded");
                self.orders = orders;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load orders");
                Err(e)
            }
        }
    }

    /// Create a product, then reload the catalog.
    ///
    /// # Errors
    ///
    /// Returns the backend error after logging it and notifying the admin.
    #[instrument(skip(self, product, catalog, ui), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        product: &NewProduct,
        catalog: &mut Catalog,
        ui: &mut dyn Interaction,
    ) -> Result<(), ApiError> {
        add_breadcrumb("admin", "Create product", Some(&[("name", product.name.as_str())]));

        if let Err(e) = self.client.create_product(product).await {
            tracing::error!(error = %e, "Failed to create product");
            ui.notify(MSG_PRODUCT_CREATE_FAILED);
            return Err(e);
        }

        let _ = catalog.load().await;
        ui.notify(MSG_PRODUCT_CREATED);
        Ok(())
    }

    /// Delete a product after confirmation, then reload the catalog.
    ///
    /// # Errors
    ///
    /// Returns the backend error after logging it and notifying the admin.
    #[instrument(skip(self, catalog, ui), fields(product_id = %product_id))]
    pub async fn delete_product(
        &self,
        product_id: &ProductId,
        catalog: &mut Catalog,
        ui: &mut dyn Interaction,
    ) -> Result<DeleteOutcome, ApiError> {
        if !ui.confirm(CONFIRM_DELETE) {
            return Ok(DeleteOutcome::Declined);
        }

        add_breadcrumb(
            "admin",
            "Delete product",
            Some(&[("product_id", product_id.as_str())]),
        );

        if let Err(e) = self.client.delete_product(product_id).await {
            tracing::error!(error = %e, "Failed to delete product");
            ui.notify(MSG_PRODUCT_DELETE_FAILED);
            return Err(e);
        }

        let _ = catalog.load().await;
        ui.notify(MSG_PRODUCT_DELETED);
        Ok(DeleteOutcome::Deleted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: " Desk Lamp ".to_string(),
            description: "LED".to_string(),
            price: "24.50".to_string(),
            category: "home".to_string(),
            image_url: "https://img/lamp.jpg".to_string(),
            stock: "7".to_string(),
        }
    }

    #[test]
    fn test_validate_valid_form() {
        let product = form().validate().unwrap();
        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.price, Price::from_cents(2450));
        assert_eq!(product.category, "Home");
        assert_eq!(product.stock, 7);
    }

    #[test]
    fn test_validate_empty_stock_is_zero() {
        let product = ProductForm {
            stock: String::new(),
            ..form()
        }
        .validate()
        .unwrap();
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_validate_rejections() {
        let missing_name = ProductForm {
            name: "  ".to_string(),
            ..form()
        };
        assert_eq!(missing_name.validate(), Err(ProductFormError::MissingName));

        let bad_price = ProductForm {
            price: "cheap".to_string(),
            ..form()
        };
        assert_eq!(
            bad_price.validate(),
            Err(ProductFormError::InvalidPrice("cheap".to_string()))
        );

        let negative = ProductForm {
            price: "-3".to_string(),
            ..form()
        };
        assert_eq!(negative.validate(), Err(ProductFormError::NegativePrice));

        let bad_stock = ProductForm {
            stock: "-1".to_string(),
            ..form()
        };
        assert_eq!(
            bad_stock.validate(),
            Err(ProductFormError::InvalidStock("-1".to_string()))
        );

        let bad_category = ProductForm {
            category: "Toys".to_string(),
            ..form()
        };
        assert!(matches!(
            bad_category.validate(),
            Err(ProductFormError::InvalidCategory(_))
        ));
    }
}
