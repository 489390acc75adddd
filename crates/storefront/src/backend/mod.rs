//! Backend API client.
//!
//! The backend owns orders and user accounts; the storefront talks to it
//! over JSON/HTTP with a bearer credential.
//!
//! # Endpoints
//!
//! ```text
//! POST {base}/api/checkout   Create an order (bearer auth)
//! POST {base}/api/login      Exchange email/password for a bearer token
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tienda_storefront::backend::{BackendClient, BearerToken};
//!
//! let client = BackendClient::new(&config.backend)?;
//! let token = client.login("camila@example.cl", &password).await?;
//! let receipt = client.submit_order(&token, &request).await?;
//! ```

pub mod types;

pub use types::{BearerToken, ErrorBody, LoginRequest, LoginResponse, OrderReceipt};

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tienda_core::CheckoutRequest;
use url::Url;

use crate::checkout::{GatewayError, OrderGateway};
use crate::config::BackendConfig;

/// Checkout endpoint path.
const CHECKOUT_PATH: &str = "api/checkout";

/// Login endpoint path.
const LOGIN_PATH: &str = "api/login";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never completed (connection refused, reset, DNS, ...).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API error: {status} - {}", message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        status: u16,
        /// The body's `msg` field, when present.
        message: Option<String>,
    },

    /// An endpoint URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A login response did not contain a token.
    #[error("Login response did not contain a token")]
    MissingToken,
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected { status, message } => Self::Rejected { status, message },
            other => Self::Unreachable(other.to_string()),
        }
    }
}

/// Backend API client.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("tienda-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Base URL this client talks to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{path}`, keeping any path prefix on the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Post an order.
    ///
    /// Any 2xx status means the order was created; the body is parsed
    /// leniently into an [`OrderReceipt`].
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] with the body's `msg` on non-2xx
    /// responses, and [`BackendError::Transport`] if the request fails.
    #[tracing::instrument(skip_all, fields(items = request.items.len()))]
    pub async fn submit_order(
        &self,
        token: &BearerToken,
        request: &CheckoutRequest,
    ) -> Result<OrderReceipt, BackendError> {
        let url = self.endpoint(CHECKOUT_PATH)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token.expose())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = ErrorBody::message(&body);
            tracing::warn!(
                status = status.as_u16(),
                message = message.as_deref().unwrap_or(""),
                "Backend rejected order"
            );
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let receipt = OrderReceipt::from_body(&body);
        tracing::info!(order_id = ?receipt.id, status = status.as_u16(), "Order created");
        Ok(receipt)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] for bad credentials,
    /// [`BackendError::MissingToken`] if the response has no token, and
    /// [`BackendError::Transport`] if the request fails.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<BearerToken, BackendError> {
        let url = self.endpoint(LOGIN_PATH)?;

        let response = self
            .client
            .post(url)
            .json(&LoginRequest {
                email,
                password: password.expose_secret(),
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message: ErrorBody::message(&body),
            });
        }

        let login: LoginResponse =
            serde_json::from_slice(&body).map_err(|_| BackendError::MissingToken)?;
        if login.token.trim().is_empty() {
            return Err(BackendError::MissingToken);
        }
        Ok(BearerToken::new(login.token))
    }
}

impl OrderGateway for BackendClient {
    async fn place_order(
        &self,
        token: &BearerToken,
        request: &CheckoutRequest,
    ) -> Result<OrderReceipt, GatewayError> {
        Ok(self.submit_order(token, request).await?)
    }
}
