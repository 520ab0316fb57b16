//! EStore Core - Shared domain types.
//!
//! This crate provides the types exchanged with the EStore REST backend:
//! - Products and the fixed storefront categories
//! - Cart items with their nested product snapshots
//! - Orders and the checkout request payload
//! - Session identifiers, emails, and prices
//!
//! # Architecture
//!
//! The core crate contains only types and parsing - no I/O, no HTTP clients,
//! no randomness. The `storefront` crate owns every network call.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and backend resource types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
