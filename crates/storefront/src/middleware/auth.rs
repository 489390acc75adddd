//! Authentication helpers and extractors.
//!
//! The storefront never sees passwords after login: the backend hands back a
//! bearer token and that token is the shopper's whole identity here.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::backend::BearerToken;
use crate::checkout::CredentialStore;
use crate::models::session_keys;

/// [`CredentialStore`] over the request session.
pub struct SessionCredentials<'a>(pub &'a Session);

impl CredentialStore for SessionCredentials<'_> {
    async fn bearer_token(&self) -> Option<BearerToken> {
        match self.0.get::<String>(session_keys::BEARER_TOKEN).await {
            Ok(token) => token
                .filter(|t| !t.trim().is_empty())
                .map(BearerToken::new),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read bearer token from session");
                None
            }
        }
    }
}

/// Extractor that optionally gets the logged-in shopper's email.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(email): OptionalAuth) -> impl IntoResponse {
///     email.unwrap_or_else(|| "invitado".to_string())
/// }
/// ```
pub struct OptionalAuth(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<String>(session_keys::SHOPPER_EMAIL)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(email))
    }
}

/// Store the shopper's token and email after a successful login.
///
/// The session id is cycled so a pre-login cookie cannot ride along.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_bearer_token(
    session: &Session,
    token: &BearerToken,
    email: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::BEARER_TOKEN, token.expose())
        .await?;
    session.insert(session_keys::SHOPPER_EMAIL, email).await
}

/// Forget the shopper's token and email (logout).
///
/// The cart stays in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_bearer_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(session_keys::BEARER_TOKEN).await?;
    session.remove::<String>(session_keys::SHOPPER_EMAIL).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_no_token_in_fresh_session() {
        let session = session();
        assert!(SessionCredentials(&session).bearer_token().await.is_none());
    }

    #[tokio::test]
    async fn test_token_round_trips_through_session() {
        let session = session();
        set_bearer_token(&session, &BearerToken::new("tok-123"), "camila@example.cl")
            .await
            .unwrap();

        let token = SessionCredentials(&session).bearer_token().await.unwrap();
        assert_eq!(token.expose(), "tok-123");

        clear_bearer_token(&session).await.unwrap();
        assert!(SessionCredentials(&session).bearer_token().await.is_none());
    }

    #[tokio::test]
    async fn test_blank_token_counts_as_missing() {
        let session = session();
        session
            .insert(session_keys::BEARER_TOKEN, "  ")
            .await
            .unwrap();
        assert!(SessionCredentials(&session).bearer_token().await.is_none());
    }
}
