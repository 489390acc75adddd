//! Tienda Core - Shared checkout domain types.
//!
//! This crate provides the types used across all Tienda components:
//! - `storefront` - Public-facing store with the checkout flow
//! - `cli` - Command-line tools for order summaries and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session access. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money formatting, line items, shipping form
//! - [`order`] - Order summary calculator (subtotal, shipping, total)
//! - [`checkout`] - Wire payload posted to the backend checkout endpoint

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod order;
pub mod types;

pub use checkout::{CheckoutItem, CheckoutRequest};
pub use order::{OrderSummary, OrderTotals, SHIPPING_FEE, SummaryLine, item_count, summarize, totals};
pub use types::*;
