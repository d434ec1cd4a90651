use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{instrument, warn};

use crate::auth::{
    dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
    error::AuthError,
    extractors::{session_token_from_headers, SESSION_COOKIE},
    repo::User,
    service::UserRegistration,
};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{2,31}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

fn validate_signup(req: &SignupRequest) -> Result<(), AuthError> {
    if !is_valid_username(&req.username) {
        warn!(username = %req.username, "invalid username");
        return Err(AuthError::Validation(
            "username must be 3-32 characters: letters, digits, '_', '.' or '-'",
        ));
    }
    if req.password.len() < 8 {
        warn!("password too short");
        return Err(AuthError::Validation("password too short"));
    }
    if req.first_name.trim().is_empty()
        || req.second_name.trim().is_empty()
        || req.location.trim().is_empty()
        || req.best_books_category.trim().is_empty()
    {
        return Err(AuthError::Validation("required field is empty"));
    }
    if !(1..=130).contains(&req.age) {
        return Err(AuthError::Validation("age out of range"));
    }
    Ok(())
}

fn session_cookie(value: &str, max_age_minutes: i64) -> String {
    format!(
        "{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age_minutes * 60
    )
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    validate_signup(&payload)?;

    let candidate: UserRegistration = payload.into();
    let username = candidate.username.clone();
    let id = state.auth.register(&candidate).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: PublicUser { id, username },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), AuthError> {
    let token = state.auth.login(&payload.username, &payload.password).await?;

    // The profile exists; login just verified it.
    let user = User::find_by_username(&state.db, &payload.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(token.as_str(), state.config.session.ttl_minutes)
            .parse()
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("set-cookie header: {e}")))?,
    );

    Ok((
        headers,
        Json(AuthResponse {
            user: PublicUser {
                id: user.id,
                username: user.username,
            },
        }),
    ))
}

#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap), AuthError> {
    if let Some(token) = session_token_from_headers(&headers) {
        state.auth.logout(&token).await;
    }

    // Expire the cookie client-side regardless of whether a session existed.
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        session_cookie("", 0)
            .parse()
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("set-cookie header: {e}")))?,
    );

    Ok((StatusCode::NO_CONTENT, response_headers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_request(username: &str, password: &str) -> SignupRequest {
        SignupRequest {
            first_name: "Alice".into(),
            second_name: "Smith".into(),
            third_name: None,
            username: username.into(),
            password: password.into(),
            location: "Oslo".into(),
            age: 31,
            best_books_category: "Fiction".into(),
        }
    }

    #[test]
    fn accepts_a_well_formed_signup() {
        assert!(validate_signup(&signup_request("alice", "s3cret-pass")).is_ok());
    }

    #[test]
    fn rejects_bad_usernames() {
        for username in ["", "ab", "-leading", "has space", "way@off"] {
            let err = validate_signup(&signup_request(username, "s3cret-pass")).unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{username:?}");
        }
    }

    #[test]
    fn rejects_short_passwords_and_bad_ages() {
        assert!(matches!(
            validate_signup(&signup_request("alice", "short")).unwrap_err(),
            AuthError::Validation(_)
        ));

        let mut req = signup_request("alice", "s3cret-pass");
        req.age = 0;
        assert!(matches!(
            validate_signup(&req).unwrap_err(),
            AuthError::Validation(_)
        ));
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("abc", 60);
        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
    }
}
