//! Session-scoped cart client.
//!
//! Every mutation is a two-step transaction: submit to the backend, then
//! reload the whole cart. There are no optimistic updates, so the cached
//! lines are always exactly what the backend returned on the last successful
//! load.
//!
//! # Failure handling
//!
//! - Loads log and keep the previous cache; the user is never notified.
//! - Mutations log, notify the user, and leave the cache untouched.
//! - Nothing is retried.

use estore_core::{
    CartItem, CartItemId, Email, EmailError, OrderRequest, Price, ProductId, SessionId, cart_total,
};
use tracing::instrument;

use crate::backend::{ApiError, BackendClient};
use crate::error::add_breadcrumb;
use crate::interaction::Interaction;
use crate::session::generate_session_id;

/// Quantity submitted by a single add-to-cart action.
pub const ADD_QUANTITY: u32 = 1;

pub const MSG_ADDED: &str = "Item added to cart!";
pub const MSG_ADD_FAILED: &str = "Error adding to cart";
pub const MSG_REMOVE_FAILED: &str = "Error removing from cart";
pub const MSG_EMPTY_CART: &str = "Cart is empty!";
pub const MSG_ORDER_PLACED: &str = "Order placed successfully!";
pub const MSG_ORDER_FAILED: &str = "Error placing order";
pub const PROMPT_EMAIL: &str = "Enter your email for order confirmation:";

/// How a checkout attempt ended without a backend failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The cart was empty; nothing was submitted.
    EmptyCart,
    /// The user dismissed the email prompt; nothing was submitted.
    Cancelled,
    /// The email was rejected locally; nothing was submitted.
    InvalidEmail(EmailError),
    /// The backend accepted the order.
    Placed { total: Price, customer_email: Email },
}

/// Client-side cart bound to one session identifier.
#[derive(Debug)]
pub struct CartSession {
    client: BackendClient,
    session_id: SessionId,
    items: Vec<CartItem>,
}

impl CartSession {
    /// Start a session with a freshly generated identifier and an empty cache.
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self::with_session_id(client, generate_session_id())
    }

    /// Start a session with a known identifier.
    #[must_use]
    pub const fn with_session_id(client: BackendClient, session_id: SessionId) -> Self {
        Self {
            client,
            session_id,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Cart lines as of the last successful load.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of cart lines (not units).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of the cached server-provided subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        cart_total(&self.items)
    }

    /// Replace the cache with the backend's cart for this session.
    ///
    /// On failure the previous cache is kept and the error is only logged.
    ///
    /// # Errors
    ///
    /// Returns the backend error so callers can observe it; the user is not
    /// notified.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn load(&mut self) -> Result<(), ApiError> {
        match self.client.get_cart(&self.session_id).await {
            Ok(items) => {
                tracing::debug!(lines = items.len(), "Cart loaded");
                self.items = items;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load cart");
                Err(e)
            }
        }
    }

    /// Reload after a successful mutation. Failures are already logged by
    /// [`Self::load`] and leave the cache as it was.
    async fn reconcile(&mut self) {
        let _ = self.load().await;
    }

    /// Add one unit of a product, then reload.
    ///
    /// # Errors
    ///
    /// Returns the backend error after logging it and notifying the user. The
    /// cache is unchanged in that case.
    #[instrument(skip(self, ui), fields(session_id = %self.session_id, product_id = %product_id))]
    pub async fn add(
        &mut self,
        product_id: &ProductId,
        ui: &mut dyn Interaction,
    ) -> Result<(), ApiError> {
        add_breadcrumb(
            "cart",
            "Add item",
            Some(&[("product_id", product_id.as_str())]),
        );

        if let Err(e) = self
            .client
            .add_to_cart(product_id, ADD_QUANTITY, &self.session_id)
            .await
        {
            tracing::error!(error = %e, "Failed to add item to cart");
            ui.notify(MSG_ADD_FAILED);
            return Err(e);
        }

        self.reconcile().await;
        ui.notify(MSG_ADDED);
        Ok(())
    }

    /// Delete a cart line, then reload.
    ///
    /// The ID is sent as-is; it need not be present in the cache.
    ///
    /// # Errors
    ///
    /// Returns the backend error after logging it and notifying the user. The
    /// cache is unchanged in that case.
    #[instrument(skip(self, ui), fields(session_id = %self.session_id, item_id = %item_id))]
    pub async fn remove(
        &mut self,
        item_id: &CartItemId,
        ui: &mut dyn Interaction,
    ) -> Result<(), ApiError> {
        add_breadcrumb("cart", "Remove item", Some(&[("item_id", item_id.as_str())]));

        if let Err(e) = self.client.remove_from_cart(item_id).await {
            tracing::error!(error = %e, "Failed to remove item from cart");
            ui.notify(MSG_REMOVE_FAILED);
            return Err(e);
        }

        self.reconcile().await;
        Ok(())
    }

    /// Place an order for the cached cart.
    ///
    /// Refuses an empty cart, then asks for the customer's email. A dismissed
    /// or whitespace-only answer cancels without a notice. An answer that is
    /// not a well-formed address is reported and rejected locally, so no
    /// request is sent. The order carries the cached lines verbatim and their
    /// summed subtotals. On success the cache is cleared and reloaded.
    ///
    /// # Errors
    ///
    /// Returns the backend error after logging it and notifying the user. The
    /// cache is left as it was.
    #[instrument(skip(self, ui), fields(session_id = %self.session_id))]
    pub async fn checkout(
        &mut self,
        ui: &mut dyn Interaction,
    ) -> Result<CheckoutOutcome, ApiError> {
        if self.items.is_empty() {
            ui.notify(MSG_EMPTY_CART);
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let answer = ui.prompt(PROMPT_EMAIL).unwrap_or_default();
        let answer = answer.trim();
        if answer.is_empty() {
            tracing::debug!("Checkout cancelled at email prompt");
            return Ok(CheckoutOutcome::Cancelled);
        }

        let customer_email = match Email::parse(answer) {
            Ok(email) => email,
            Err(e) => {
                ui.notify(&format!("Invalid email: {e}"));
                return Ok(CheckoutOutcome::InvalidEmail(e));
            }
        };

        let order = OrderRequest {
            items: self.items.clone(),
            total: self.total(),
            customer_email,
            session_id: self.session_id.clone(),
        };

        let total = order.total.to_string();
        add_breadcrumb("checkout", "Submit order", Some(&[("total", total.as_str())]));

        if let Err(e) = self.client.create_order(&order).await {
            tracing::error!(error = %e, "Failed to place order");
            ui.notify(MSG_ORDER_FAILED);
            return Err(e);
        }

        tracing::info!(total = %order.total, lines = order.items.len(), "Order placed");
        ui.notify(MSG_ORDER_PLACED);

        self.items.clear();
        self.reconcile().await;

        Ok(CheckoutOutcome::Placed {
            total: order.total,
            customer_email: order.customer_email,
        })
    }
}
