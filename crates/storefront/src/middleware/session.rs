//! Session middleware configuration and flash messages.
//!
//! Sessions live in memory: they hold only the cart, the backend token and
//! one-shot messages, all of which are cheap to lose on restart.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::StorefrontConfig;
use crate::models::{Flash, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tienda_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
///
/// # Arguments
///
/// * `config` - Storefront configuration (for secure-cookie detection)
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Queue a flash message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Take the pending flash message, if any.
///
/// Read failures are logged and treated as no message.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    match session.remove::<Flash>(session_keys::FLASH).await {
        Ok(flash) => flash,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash message");
            None
        }
    }
}
