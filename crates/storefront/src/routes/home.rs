//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tienda_core::item_count;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{OptionalAuth, take_flash};
use crate::models::Flash;
use crate::services::SessionCart;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub flash: Option<Flash>,
    pub cart_count: u32,
    /// Email of the logged-in shopper.
    pub shopper: Option<String>,
}

/// Display the home page.
#[instrument(skip(session, shopper))]
pub async fn home(OptionalAuth(shopper): OptionalAuth, session: Session) -> Result<impl IntoResponse> {
    let items = SessionCart(&session).items().await?;

    Ok(HomeTemplate {
        flash: take_flash(&session).await,
        cart_count: item_count(&items),
        shopper,
    })
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
pub async fn health() -> &'static str {
    "ok"
}
