//! Cached product catalog.

use estore_core::{Category, Product, ProductId};
use tracing::instrument;

use crate::backend::{ApiError, BackendClient};

/// Number of products shown as featured on the home view.
pub const FEATURED_COUNT: usize = 4;

/// Read-only copy of the backend's product list.
#[derive(Debug)]
pub struct Catalog {
    client: BackendClient,
    products: Vec<Product>,
}

impl Catalog {
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self {
            client,
            products: Vec::new(),
        }
    }

    /// Products as of the last successful load.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The first few products, for the home view.
    #[must_use]
    pub fn featured(&self) -> &[Product] {
        self.products
            .get(..FEATURED_COUNT)
            .unwrap_or(&self.products)
    }

    /// Products in `category`, or every product when `category` is `None`.
    #[must_use]
    pub fn filter(&self, category: Option<Category>) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| category.is_none_or(|c| p.in_category(c)))
            .collect()
    }

    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Replace the cache with the backend's product list.
    ///
    /// On failure the previous list is kept and the error is only logged.
    ///
    /// # Errors
    ///
    /// Returns the backend error so callers can observe it.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<(), ApiError> {
        match self.client.list_products().await {
            Ok(products) => {
                tracing::debug!(count = products.len(), "Products loaded");
                self.products = products;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load products");
                Err(e)
            }
        }
    }
}
