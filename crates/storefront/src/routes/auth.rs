//! Authentication route handlers.
//!
//! Login is delegated to the backend (`POST /api/login`); the returned bearer
//! token is kept in the session for the checkout flow.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::BackendError;
use crate::checkout::{UNREACHABLE_NOTICE, View};
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_bearer_token, set_bearer_token, set_flash, take_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Shown when the backend refuses the credentials without a message.
const BAD_CREDENTIALS_NOTICE: &str = "Correo o contraseña incorrectos";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub flash: Option<Flash>,
}

/// Display the login page.
#[instrument(skip(session))]
pub async fn login_page(session: Session) -> impl IntoResponse {
    LoginTemplate {
        flash: take_flash(&session).await,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim();
    let password = SecretString::from(form.password);

    match state.backend().login(email, &password).await {
        Ok(token) => {
            set_bearer_token(&session, &token, email).await?;
            set_sentry_user(email);
            add_breadcrumb("auth", "Logged in", None);
            tracing::info!("Shopper logged in");

            Ok(Redirect::to(View::Checkout.path()).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let notice = match e {
                BackendError::Rejected { message, .. } => {
                    message.unwrap_or_else(|| BAD_CREDENTIALS_NOTICE.to_string())
                }
                BackendError::Transport(_) => UNREACHABLE_NOTICE.to_string(),
                BackendError::InvalidUrl(_) | BackendError::MissingToken => {
                    BAD_CREDENTIALS_NOTICE.to_string()
                }
            };
            set_flash(&session, Flash::error(notice)).await?;

            Ok(Redirect::to(View::Login.path()).into_response())
        }
    }
}

/// Handle logout.
///
/// Forgets the bearer token; the cart is kept.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    clear_bearer_token(&session).await?;
    clear_sentry_user();
    set_flash(&session, Flash::info("Sesión cerrada")).await?;

    Ok(Redirect::to(View::Home.path()).into_response())
}
