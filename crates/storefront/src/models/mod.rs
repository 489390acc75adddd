//! Domain models for storefront.
//!
//! Types stored in the session between requests.

pub mod session;

pub use session::{Flash, FlashLevel, LastOrder, keys as session_keys};
