//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Cart operations over the request session

pub mod cart;

pub use cart::SessionCart;
