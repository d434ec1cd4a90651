use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, error, instrument};

use crate::auth::{error::AuthError, extractors::CurrentUser, repo::User};
use crate::state::AppState;

pub fn library_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/borrow", get(borrow_book).post(borrow_book))
        .route("/return", get(return_book).post(return_book))
        .route("/membership", get(membership).post(membership))
}

/// Full profile of the logged-in user; the hash is skipped by serialization.
#[instrument(skip(state, user))]
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<User>, AuthError> {
    let record = User::find_by_username(&state.db, &user.username)
        .await?
        .ok_or_else(|| {
            // Session outlived the row; treat as a dead session.
            error!(username = %user.username, "session user missing from storage");
            AuthError::Unauthenticated
        })?;
    Ok(Json(record))
}

// The schema declares books and borrow_records, but the workflows were never
// implemented upstream, so these stay honest 501s instead of guessed logic.

#[instrument(skip(user))]
pub async fn borrow_book(user: CurrentUser) -> (StatusCode, Json<serde_json::Value>) {
    debug!(username = %user.username, "borrow requested");
    not_implemented("book borrowing is not available yet")
}

#[instrument(skip(user))]
pub async fn return_book(user: CurrentUser) -> (StatusCode, Json<serde_json::Value>) {
    debug!(username = %user.username, "return requested");
    not_implemented("book returns are not available yet")
}

#[instrument(skip(user))]
pub async fn membership(user: CurrentUser) -> (StatusCode, Json<serde_json::Value>) {
    debug!(username = %user.username, "membership requested");
    not_implemented("memberships are not available yet")
}

fn not_implemented(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({ "error": message })),
    )
}
