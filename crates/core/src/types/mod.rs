//! Core types for EStore.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! resource shapes returned by the backend.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod session;

pub use cart::{CartItem, CartProduct, cart_total};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderLine, OrderRequest, OrderStatus};
pub use price::Price;
pub use product::{Category, NewProduct, Product};
pub use session::{SessionId, SessionIdError};
