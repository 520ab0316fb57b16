//! Plain-text views.
//!
//! View structs are built from the cached state and then written to any
//! `Write`. They hold display strings only, so rendering never touches
//! the backend.

use std::io::{self, Write};

use estore_core::{CartItem, Category, Order, Product, cart_total};

// =============================================================================
// Cart
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub line_count: usize,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            line_count: 0,
        }
    }

    /// Write the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Shopping Cart ({})", self.line_count)?;
        if self.items.is_empty() {
            writeln!(out, "  Your cart is empty. Try `products` to start shopping.")?;
            return Ok(());
        }
        for item in &self.items {
            writeln!(
                out,
                "  [{}] {} x{} @ {} = {}",
                item.id, item.name, item.quantity, item.price, item.line_price
            )?;
        }
        writeln!(out, "  Total: {}", self.subtotal)
    }
}

impl From<&[CartItem]> for CartView {
    fn from(items: &[CartItem]) -> Self {
        Self {
            items: items.iter().map(CartItemView::from).collect(),
            subtotal: cart_total(items).display(),
            line_count: items.len(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.product.name.clone(),
            quantity: item.quantity,
            price: item.product.price.display(),
            line_price: item.subtotal.display(),
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub stock: i64,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.display(),
            stock: product.stock,
        }
    }
}

impl ProductView {
    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        let stock = if self.stock > 0 {
            format!("{} in stock", self.stock)
        } else {
            "out of stock".to_string()
        };
        writeln!(
            out,
            "  [{}] {} ({}) {} - {}",
            self.id, self.name, self.category, self.price, stock
        )?;
        if !self.description.is_empty() {
            writeln!(out, "      {}", self.description)?;
        }
        Ok(())
    }
}

/// Write a product listing under `title`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_products<'a>(
    out: &mut impl Write,
    title: &str,
    products: impl IntoIterator<Item = &'a Product>,
) -> io::Result<()> {
    let views: Vec<ProductView> = products.into_iter().map(ProductView::from).collect();
    writeln!(out, "{title} ({})", views.len())?;
    if views.is_empty() {
        writeln!(out, "  No products found.")?;
    }
    for view in &views {
        view.render(out)?;
    }
    Ok(())
}

/// Write the home view: categories and featured products.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_home(out: &mut impl Write, featured: &[Product]) -> io::Result<()> {
    let categories: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
    writeln!(out, "Shop by Category: {}", categories.join(", "))?;
    if featured.is_empty() {
        writeln!(out, "No products yet. Use `view admin` to add your first product!")?;
        return Ok(());
    }
    render_products(out, "Featured Products", featured)
}

// =============================================================================
// Orders
// =============================================================================

/// Write the admin order list.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_orders(out: &mut impl Write, orders: &[Order]) -> io::Result<()> {
    writeln!(out, "Recent Orders ({})", orders.len())?;
    if orders.is_empty() {
        writeln!(out, "  No orders yet.")?;
    }
    for order in orders {
        let created = order
            .created_at
            .map_or_else(String::new, |ts| ts.format(" %Y-%m-%d %H:%M").to_string());
        writeln!(
            out,
            "  [{}] {} {} units {} {:?}{}",
            order.id,
            order.customer_email,
            order.unit_count(),
            order.total,
            order.status,
            created
        )?;
    }
    Ok(())
}
