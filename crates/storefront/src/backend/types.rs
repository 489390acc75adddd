//! Backend API request and response types.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tienda_core::OrderId;

/// Bearer credential issued by the backend at login.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `Authorization` header or the session.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// What the backend tells us about a created order.
///
/// Every field is optional: the storefront only needs a 2xx status to treat
/// the order as placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(default, alias = "order_id")]
    pub id: Option<OrderId>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl OrderReceipt {
    /// Parse a success body, accepting both a bare order and `{"order": {...}}`.
    ///
    /// Bodies that are not JSON yield an empty receipt.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct Wrapped {
            order: OrderReceipt,
        }

        if let Ok(Wrapped { order }) = serde_json::from_slice::<Wrapped>(body) {
            return order;
        }
        serde_json::from_slice(body).unwrap_or_default()
    }
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorBody {
    /// Extract the `msg` field, if the body is JSON and carries one.
    #[must_use]
    pub fn message(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .and_then(|body| body.msg)
            .filter(|msg| !msg.trim().is_empty())
    }
}

/// Body of `POST /api/login`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login response.
#[derive(Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
}
