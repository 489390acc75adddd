//! Session-related types.
//!
//! Types stored in the session between requests.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tienda_core::{OrderId, OrderTotals};

use crate::backend::OrderReceipt;

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashLevel {
    Info,
    Error,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// Whether this is an error message (used by templates).
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == FlashLevel::Error
    }
}

/// The most recently placed order, for the confirmation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastOrder {
    pub order_id: Option<OrderId>,
    pub status: Option<String>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl LastOrder {
    #[must_use]
    pub fn new(receipt: &OrderReceipt, totals: &OrderTotals) -> Self {
        Self {
            order_id: receipt.id,
            status: receipt.status.clone(),
            subtotal: totals.subtotal,
            shipping: totals.shipping_fee,
            total: totals.total,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the cart's line items.
    pub const CART: &str = "cart";

    /// Key for the backend bearer token.
    pub const BEARER_TOKEN: &str = "bearer_token";

    /// Key for the logged-in shopper's email.
    pub const SHOPPER_EMAIL: &str = "shopper_email";

    /// Key for the pending flash message.
    pub const FLASH: &str = "flash";

    /// Key for the last placed order.
    pub const LAST_ORDER: &str = "last_order";
}
