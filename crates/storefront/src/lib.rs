//! EStore storefront library.
//!
//! Client-side session state for a storefront backed by the EStore REST API:
//! a session-scoped cart that reconciles with the backend after every write,
//! a cached product catalog, and an admin panel for orders and products.
//! The `estore` binary drives it from an interactive shell.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod interaction;
pub mod session;
pub mod shell;
pub mod state;
pub mod views;
