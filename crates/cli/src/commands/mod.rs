//! CLI subcommands.

pub mod checkout;
pub mod summary;

use std::path::Path;

use thiserror::Error;
use tienda_core::LineItem;

/// Error reading a JSON input file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Read and parse a JSON file.
pub async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| InputError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Read a cart file. A missing file is an empty cart.
pub async fn read_cart(path: &Path) -> Result<Vec<LineItem>, InputError> {
    match tokio::fs::try_exists(path).await {
        Ok(false) => Ok(Vec::new()),
        _ => read_json(path).await,
    }
}
