//! Seams between the checkout submitter and the rest of the storefront.
//!
//! The submitter never reaches for ambient state: the credential, the cart,
//! navigation and the backend are handed to it. The web layer implements
//! these over the request session, the CLI over files, tests over fakes.

use std::future::Future;

use thiserror::Error;
use tienda_core::{CheckoutRequest, LineItem};

use crate::backend::{BearerToken, OrderReceipt};

/// Named views the checkout flow can send the shopper to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Checkout,
    Confirmation,
}

impl View {
    /// Route path of the view.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Checkout => "/checkout",
            Self::Confirmation => "/checkout/confirmation",
        }
    }
}

/// Read access to the shopper's bearer credential.
pub trait CredentialStore {
    /// The stored token, or `None` when the shopper is not logged in.
    fn bearer_token(&self) -> impl Future<Output = Option<BearerToken>> + Send;
}

/// Error reading or writing the cart.
#[derive(Debug, Error)]
#[error("cart store error: {0}")]
pub struct CartStoreError(pub String);

/// The shopper's cart.
pub trait CartStore {
    /// Current line items.
    fn line_items(&self) -> impl Future<Output = Result<Vec<LineItem>, CartStoreError>> + Send;

    /// Remove every item.
    fn clear(&self) -> impl Future<Output = Result<(), CartStoreError>> + Send;
}

/// Capability to move the shopper to another view.
pub trait Navigator {
    fn navigate(&mut self, view: View);
}

/// Failure reported by an [`OrderGateway`].
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The backend answered and refused the order.
    #[error("order rejected ({status}): {}", message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The request never completed.
    #[error("backend unreachable: {0}")]
    Unreachable(String),
}

/// Sends a checkout payload to wherever orders are created.
pub trait OrderGateway {
    fn place_order(
        &self,
        token: &BearerToken,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<OrderReceipt, GatewayError>> + Send;
}

/// [`Navigator`] that remembers where the flow wants to go.
///
/// Route handlers turn the recorded view into a redirect response.
#[derive(Debug, Default)]
pub struct RecordedNavigation {
    target: Option<View>,
}

impl RecordedNavigation {
    /// The last requested view, if any.
    #[must_use]
    pub const fn target(&self) -> Option<View> {
        self.target
    }
}

impl Navigator for RecordedNavigation {
    fn navigate(&mut self, view: View) {
        self.target = Some(view);
    }
}
