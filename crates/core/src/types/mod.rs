//! Core types for Tienda.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod shipping;

pub use cart::{CartProduct, LineItem, PriceField, PriceResolution, RawPrice};
pub use id::*;
pub use price::{CURRENCY_CODE, Clp, format_clp};
pub use shipping::{FormError, PaymentMethod, ShippingField, ShippingForm};
