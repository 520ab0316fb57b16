//! REST client for the EStore backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local persistence, direct calls
//! - Every endpoint is a single request: no retries, no backoff, no timeouts
//! - Any transport failure or non-2xx status is an [`ApiError`]
//!
//! # Endpoints
//!
//! | Method | Path | Used by |
//! |--------|------|---------|
//! | `GET` | `/api/products` | catalog |
//! | `GET` | `/api/cart/{session_id}` | cart |
//! | `POST` | `/api/cart` | cart |
//! | `DELETE` | `/api/cart/{item_id}` | cart |
//! | `POST` | `/api/orders` | checkout |
//! | `GET` | `/api/admin/orders` | admin |
//! | `POST` | `/api/admin/products` | admin |
//! | `DELETE` | `/api/admin/products/{id}` | admin |

mod types;

pub use types::{
    AddToCartRequest, CartResponse, HealthResponse, OrdersResponse, ProductsResponse,
};

use std::sync::Arc;

use estore_core::{
    CartItem, CartItemId, NewProduct, Order, OrderRequest, Product, ProductId, SessionId,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;

/// Maximum number of response body characters kept in errors and logs.
const ERROR_BODY_LIMIT: usize = 200;

/// Errors that can occur when talking to the backend.
///
/// Callers treat every variant as the same "operation failed" outcome; the
/// variants exist for diagnostics.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, DNS, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot have endpoint paths appended.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether the request never produced an HTTP response.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// HTTP status code, when the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the EStore REST backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("estore/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.backend_url.clone(),
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL by appending percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self.inner.client.get(url).send().await?;
        Self::decode(response).await
    }

    /// Execute a POST request with a JSON body, ignoring the response body.
    async fn post<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        Self::ensure_success(response).await.map(drop)
    }

    /// Execute a DELETE request, ignoring the response body.
    async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        let response = self.inner.client.delete(url).send().await?;
        Self::ensure_success(response).await.map(drop)
    }

    /// Turn a non-success status into [`ApiError::Status`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(ERROR_BODY_LIMIT)
            .collect::<String>();
        debug!(status = %status, body = %body, "Backend returned non-success status");

        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Check the status and parse the JSON body.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;

        // Read as text first for better error diagnostics
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Probe the backend root endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<String, ApiError> {
        let response: HealthResponse = self.get(&[]).await?;
        Ok(response.message)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let response: ProductsResponse = self.get(&["api", "products"]).await?;
        Ok(response.products)
    }

    // =========================================================================
    // Cart (keyed by session)
    // =========================================================================

    /// Fetch the cart lines for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn get_cart(&self, session_id: &SessionId) -> Result<Vec<CartItem>, ApiError> {
        let response: CartResponse = self.get(&["api", "cart", session_id.as_str()]).await?;
        Ok(response.cart_items)
    }

    /// Add `quantity` units of a product to the session's cart.
    ///
    /// The backend merges the quantity into an existing line for the same
    /// product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns a non-2xx status.
    #[instrument(skip(self), fields(product_id = %product_id, session_id = %session_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
        session_id: &SessionId,
    ) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            product_id,
            quantity,
            session_id,
        };
        self.post(&["api", "cart"], &body).await
    }

    /// Delete a cart line by its item ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns a non-2xx status.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_from_cart(&self, item_id: &CartItemId) -> Result<(), ApiError> {
        self.delete(&["api", "cart", item_id.as_str()]).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns a non-2xx status.
    #[instrument(skip(self, order), fields(session_id = %order.session_id, total = %order.total))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<(), ApiError> {
        self.post(&["api", "orders"], order).await
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// List all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let response: OrdersResponse = self.get(&["api", "admin", "orders"]).await?;
        Ok(response.orders)
    }

    /// Create a catalog product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns a non-2xx status.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<(), ApiError> {
        self.post(&["api", "admin", "products"], product).await
    }

    /// Delete a catalog product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns a non-2xx status.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: &ProductId) -> Result<(), ApiError> {
        self.delete(&["api", "admin", "products", product_id.as_str()])
            .await
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
