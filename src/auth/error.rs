use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// Failure modes of the credential and session core. The first three are
/// expected, user-recoverable conditions; `Storage` and `Internal` are
/// infrastructure failures and must never be presented as a credential problem.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username already taken")]
    DuplicateUsername,

    // One message for unknown user and wrong password, so callers cannot
    // enumerate usernames.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Validation(&'static str),

    #[error("storage error")]
    Storage(#[from] sqlx::Error),

    #[error("password handling failed")]
    Password(#[from] crate::auth::password::PasswordError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::DuplicateUsername => (StatusCode::CONFLICT, self.to_string()),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::Storage(e) => {
                error!(error = %e, "storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
            AuthError::Password(e) => {
                error!(error = %e, "password handling failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
            AuthError::Internal(e) => {
                error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_share_one_message() {
        // Unknown-user and wrong-password paths both produce this variant, so
        // Display equality is what the client actually observes.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid username or password"
        );
    }

    #[test]
    fn storage_error_message_is_generic() {
        let err = AuthError::Storage(sqlx::Error::PoolClosed);
        assert_eq!(err.to_string(), "storage error");
    }
}
