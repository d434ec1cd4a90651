use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::auth::error::AuthError;
use crate::auth::session::SessionToken;
use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Extracts the session cookie and resolves it to the authenticated username.
/// Rejects with `Unauthenticated` when the cookie is missing, unknown or
/// expired; the client decides whether that means a redirect.
pub struct CurrentUser {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token_from_headers(&parts.headers);
        let username = state.auth.require_authenticated(token.as_ref()).await?;
        Ok(CurrentUser { username })
    }
}

/// Pulls the session token out of the Cookie header, if any.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .filter(|value| !value.is_empty())
        .map(|value| SessionToken::from(value.to_string()))
}
