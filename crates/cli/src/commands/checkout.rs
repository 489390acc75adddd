//! Checkout command.
//!
//! Runs the storefront's checkout submitter with file-backed collaborators:
//! the cart file is read for line items and rewritten as `[]` once the
//! backend accepts the order.
//!
//! # Usage
//!
//! ```bash
//! tienda-cli checkout --cart cart.json --form form.json --token "$TOKEN"
//! ```
//!
//! # Environment Variables
//!
//! - `TIENDA_BACKEND_URL` - Backend API base URL
//! - `TIENDA_TOKEN` - Bearer token (alternative to `--token`)

use std::path::{Path, PathBuf};

use thiserror::Error;
use tienda_core::{LineItem, ShippingForm, format_clp};
use tienda_storefront::backend::{BackendClient, BackendError, BearerToken};
use tienda_storefront::checkout::{
    CartStore, CartStoreError, CheckoutError, CheckoutSubmitter, CredentialStore, Navigator, View,
};
use tienda_storefront::config::{BackendConfig, ConfigError};

use super::{InputError, read_cart, read_json};

/// Errors that can occur during the checkout command.
#[derive(Debug, Error)]
pub enum CheckoutCommandError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend client error: {0}")]
    Backend(#[from] BackendError),

    /// The submitter refused or failed; carries the shopper-facing notice.
    #[error("{notice}")]
    Checkout {
        notice: String,
        source: CheckoutError,
    },
}

/// Cart stored as a JSON file.
pub struct FileCart {
    path: PathBuf,
}

impl FileCart {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl CartStore for FileCart {
    async fn line_items(&self) -> Result<Vec<LineItem>, CartStoreError> {
        read_cart(&self.path)
            .await
            .map_err(|e| CartStoreError(e.to_string()))
    }

    async fn clear(&self) -> Result<(), CartStoreError> {
        tokio::fs::write(&self.path, b"[]\n")
            .await
            .map_err(|e| CartStoreError(format!("{}: {e}", self.path.display())))
    }
}

/// Credential given on the command line.
pub struct ArgCredentials(Option<BearerToken>);

impl ArgCredentials {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self(
            token
                .filter(|t| !t.trim().is_empty())
                .map(BearerToken::new),
        )
    }
}

impl CredentialStore for ArgCredentials {
    async fn bearer_token(&self) -> Option<BearerToken> {
        self.0.clone()
    }
}

/// Navigator that reports where the storefront would have gone.
#[derive(Default)]
pub struct ConsoleNavigator {
    visited: Vec<View>,
}

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, view: View) {
        tracing::debug!(path = view.path(), "Navigate");
        self.visited.push(view);
    }
}

/// Place an order from the given cart and form files.
#[allow(clippy::print_stdout)]
pub async fn run(
    cart_path: &Path,
    form_path: &Path,
    token: Option<String>,
) -> Result<(), CheckoutCommandError> {
    let form: ShippingForm = read_json(form_path).await?;
    let backend = BackendClient::new(&BackendConfig::from_env()?)?;
    tracing::info!(backend = %backend.base_url(), "Submitting checkout");

    let credentials = ArgCredentials::new(token);
    let cart = FileCart::new(cart_path);
    let mut navigator = ConsoleNavigator::default();
    let mut submitter = CheckoutSubmitter::new(&backend);

    match submitter
        .submit(&form, &credentials, &cart, &mut navigator)
        .await
    {
        Ok(confirmation) => {
            let order = confirmation
                .receipt
                .id
                .map_or_else(|| "(sin número)".to_string(), |id| id.to_string());
            println!("Orden creada: {order}");
            println!("Subtotal: {}", format_clp(confirmation.totals.subtotal));
            println!("Envío:    {}", format_clp(confirmation.totals.shipping_fee));
            println!("Total:    {}", format_clp(confirmation.totals.total));
            Ok(())
        }
        Err(source) => {
            if navigator.visited.contains(&View::Login) {
                tracing::info!("Pass --token or set TIENDA_TOKEN");
            }
            Err(CheckoutCommandError::Checkout {
                notice: source.notice(),
                source,
            })
        }
    }
}
