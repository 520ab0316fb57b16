//! Application state owned by the shell.

use core::fmt;
use core::str::FromStr;

use estore_core::{CartItemId, Category, NewProduct, ProductId, SessionId};

use crate::admin::{AdminPanel, DeleteOutcome};
use crate::backend::{ApiError, BackendClient};
use crate::cart::{CartSession, CheckoutOutcome};
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::interaction::Interaction;

/// Top-level page the user is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    Products,
    Cart,
    Admin,
}

impl View {
    pub const ALL: [Self; 4] = [Self::Home, Self::Products, Self::Cart, Self::Admin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Products => "products",
            Self::Cart => "cart",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid view: {s}"))
    }
}

/// Everything the storefront holds between commands.
///
/// Owned by a single task; every mutation goes through `&mut self`.
#[derive(Debug)]
pub struct AppState {
    config: StorefrontConfig,
    client: BackendClient,
    cart: CartSession,
    catalog: Catalog,
    admin: AdminPanel,
    view: View,
    category: Option<Category>,
}

impl AppState {
    /// Create state with a fresh session identifier. Nothing is loaded yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let client = BackendClient::new(&config)?;
        let cart = CartSession::new(client.clone());
        Ok(Self::assemble(config, client, cart))
    }

    /// Create state bound to a known session identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_session_id(
        config: StorefrontConfig,
        session_id: SessionId,
    ) -> Result<Self, ApiError> {
        let client = BackendClient::new(&config)?;
        let cart = CartSession::with_session_id(client.clone(), session_id);
        Ok(Self::assemble(config, client, cart))
    }

    fn assemble(config: StorefrontConfig, client: BackendClient, cart: CartSession) -> Self {
        Self {
            catalog: Catalog::new(client.clone()),
            admin: AdminPanel::new(client.clone()),
            config,
            client,
            cart,
            view: View::Home,
            category: None,
        }
    }

    /// Probe the backend, then load products and the cart.
    ///
    /// Failures are logged and leave the caches empty.
    pub async fn startup(&mut self) {
        match self.client.health().await {
            Ok(message) => tracing::info!(backend = %self.client.base_url(), %message, "Backend reachable"),
            Err(e) => tracing::warn!(backend = %self.client.base_url(), error = %e, "Backend unreachable"),
        }
        self.refresh().await;
        tracing::info!(
            session_id = %self.cart.session_id(),
            products = self.catalog.products().len(),
            cart_lines = self.cart.line_count(),
            "Storefront ready"
        );
    }

    /// Reload products and the cart.
    pub async fn refresh(&mut self) {
        let _ = self.catalog.load().await;
        let _ = self.cart.load().await;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn cart(&self) -> &CartSession {
        &self.cart
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn admin(&self) -> &AdminPanel {
        &self.admin
    }

    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    /// Category filter for the product view; `None` means all.
    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        self.category
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch views. Entering the admin view reloads orders.
    pub async fn set_view(&mut self, view: View) {
        self.view = view;
        if view == View::Admin {
            let _ = self.admin.load_orders().await;
        }
    }

    /// Show the product view filtered to `category`.
    pub fn select_category(&mut self, category: Option<Category>) {
        self.category = category;
        self.view = View::Products;
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// See [`CartSession::add`].
    ///
    /// # Errors
    ///
    /// Returns the backend error; the user has already been notified.
    pub async fn add_to_cart(
        &mut self,
        product_id: &ProductId,
        ui: &mut dyn Interaction,
    ) -> Result<(), ApiError> {
        self.cart.add(product_id, ui).await
    }

    /// See [`CartSession::remove`].
    ///
    /// # Errors
    ///
    /// Returns the backend error; the user has already been notified.
    pub async fn remove_from_cart(
        &mut self,
        item_id: &CartItemId,
        ui: &mut dyn Interaction,
    ) -> Result<(), ApiError> {
        self.cart.remove(item_id, ui).await
    }

    /// See [`CartSession::checkout`].
    ///
    /// # Errors
    ///
    /// Returns the backend error; the user has already been notified.
    pub async fn checkout(
        &mut self,
        ui: &mut dyn Interaction,
    ) -> Result<CheckoutOutcome, ApiError> {
        self.cart.checkout(ui).await
    }

    /// Reload the admin order list.
    ///
    /// # Errors
    ///
    /// Returns the backend error after logging it.
    pub async fn load_orders(&mut self) -> Result<(), ApiError> {
        self.admin.load_orders().await
    }

    /// See [`AdminPanel::create_product`].
    ///
    /// # Errors
    ///
    /// Returns the backend error; the admin has already been notified.
    pub async fn create_product(
        &mut self,
        product: &NewProduct,
        ui: &mut dyn Interaction,
    ) -> Result<(), ApiError> {
        self.admin
            .create_product(product, &mut self.catalog, ui)
            .await
    }

    /// See [`AdminPanel::delete_product`].
    ///
    /// # Errors
    ///
    /// Returns the backend error; the admin has already been notified.
    pub async fn delete_product(
        &mut self,
        product_id: &ProductId,
        ui: &mut dyn Interaction,
    ) -> Result<DeleteOutcome, ApiError> {
        self.admin
            .delete_product(product_id, &mut self.catalog, ui)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_view_from_str() {
        assert_eq!("home".parse::<View>().unwrap(), View::Home);
        assert_eq!("Admin".parse::<View>().unwrap(), View::Admin);
        assert_eq!(" cart ".parse::<View>().unwrap(), View::Cart);
        assert!("checkout".parse::<View>().is_err());
    }

    #[test]
    fn test_view_display_round_trips() {
        for view in View::ALL {
            assert_eq!(view.to_string().parse::<View>().unwrap(), view);
        }
    }

    #[test]
    fn test_new_state_starts_on_home() {
        let config = StorefrontConfig::for_backend("http://localhost:8001").unwrap();
        let state = AppState::new(config).unwrap();
        assert_eq!(state.view(), View::Home);
        assert_eq!(state.category(), None);
        assert!(state.cart().is_empty());
        assert!(state.catalog().products().is_empty());
    }

    #[test]
    fn test_select_category_switches_to_products() {
        let config = StorefrontConfig::for_backend("http://localhost:8001").unwrap();
        let mut state = AppState::new(config).unwrap();
        state.select_category(Some(Category::Beauty));
        assert_eq!(state.view(), View::Products);
        assert_eq!(state.category(), Some(Category::Beauty));
    }
}
