use std::sync::Arc;

use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::auth::error::AuthError;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::auth::session::{SessionStore, SessionToken};

/// Everything signup collects. The password is plaintext here and nowhere
/// else; only its Argon2 hash reaches storage.
#[derive(Debug, Clone)]
pub struct UserRegistration {
    pub first_name: String,
    pub second_name: String,
    pub third_name: Option<String>,
    pub username: String,
    pub password: String,
    pub location: String,
    pub age: i64,
    pub best_books_category: String,
}

/// Verifies credentials against the user table and owns the session
/// transitions: Anonymous -> Authenticated(username) on login, back again on
/// logout or expiry.
#[derive(Clone)]
pub struct Authenticator {
    db: SqlitePool,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl Authenticator {
    pub fn new(db: SqlitePool, sessions: Arc<dyn SessionStore>, session_ttl: Duration) -> Self {
        Self {
            db,
            sessions,
            session_ttl,
        }
    }

    /// Hashes the password and inserts the user. A username collision is
    /// reported by the storage layer's uniqueness constraint and surfaces as
    /// `DuplicateUsername`; any other storage failure stays a storage error.
    pub async fn register(&self, candidate: &UserRegistration) -> Result<i64, AuthError> {
        let hash = hash_password(&candidate.password)?;

        let user = match User::create(&self.db, candidate, &hash).await {
            Ok(user) => user,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                warn!(username = %candidate.username, "username already taken");
                return Err(AuthError::DuplicateUsername);
            }
            Err(e) => return Err(AuthError::Storage(e)),
        };

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user.id)
    }

    /// Unknown username and wrong password produce the same error value, so a
    /// caller cannot probe which usernames exist.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionToken, AuthError> {
        let user = match User::find_by_username(&self.db, username).await? {
            Some(user) => user,
            None => {
                warn!(%username, "login with unknown username");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(%username, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = SessionToken::generate();
        let expires_at = OffsetDateTime::now_utc() + self.session_ttl;
        self.sessions
            .insert(token.clone(), user.username.clone(), expires_at)
            .await;

        info!(user_id = user.id, username = %user.username, "user logged in");
        Ok(token)
    }

    /// Drops the session unconditionally; logging out twice, or with a token
    /// that was never issued, is fine.
    pub async fn logout(&self, token: &SessionToken) {
        self.sessions.remove(token).await;
        debug!("session cleared");
    }

    /// Read-only gate for protected operations. Does not touch session expiry
    /// or any other state.
    pub async fn require_authenticated(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<String, AuthError> {
        let token = token.ok_or(AuthError::Unauthenticated)?;
        self.sessions
            .lookup(token)
            .await
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::InMemorySessionStore;
    use crate::db::test_pool;

    async fn authenticator() -> Authenticator {
        Authenticator::new(
            test_pool().await,
            Arc::new(InMemorySessionStore::new()),
            Duration::minutes(30),
        )
    }

    fn registration(username: &str, password: &str) -> UserRegistration {
        UserRegistration {
            first_name: "Alice".into(),
            second_name: "Smith".into(),
            third_name: Some("Jane".into()),
            username: username.into(),
            password: password.into(),
            location: "Oslo".into(),
            age: 31,
            best_books_category: "Fiction".into(),
        }
    }

    #[tokio::test]
    async fn distinct_usernames_get_distinct_ids() {
        let auth = authenticator().await;
        let a = auth.register(&registration("alice", "s3cret-a")).await.unwrap();
        let b = auth.register(&registration("bob", "s3cret-b")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn duplicate_registration_fails_and_keeps_first_record() {
        let auth = authenticator().await;
        auth.register(&registration("alice", "first-pass")).await.unwrap();
        let err = auth
            .register(&registration("alice", "second-pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));

        // First credentials still work; the failed insert changed nothing.
        auth.login("alice", "first-pass").await.unwrap();
        assert!(matches!(
            auth.login("alice", "second-pass").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn login_binds_the_session_to_the_username() {
        let auth = authenticator().await;
        auth.register(&registration("alice", "s3cret")).await.unwrap();
        let token = auth.login("alice", "s3cret").await.unwrap();
        let username = auth.require_authenticated(Some(&token)).await.unwrap();
        assert_eq!(username, "alice");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let auth = authenticator().await;
        auth.register(&registration("alice", "s3cret")).await.unwrap();

        let wrong_password = auth.login("alice", "wrong").await.unwrap_err();
        let unknown_user = auth.login("mallory", "anything").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn stored_hash_is_not_the_plaintext() {
        let auth = authenticator().await;
        auth.register(&registration("alice", "s3cret")).await.unwrap();
        let user = User::find_by_username(&auth.db, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(user.password_hash, "s3cret");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn gate_tracks_the_session_lifecycle() {
        let auth = authenticator().await;
        auth.register(&registration("alice", "s3cret")).await.unwrap();

        assert!(matches!(
            auth.require_authenticated(None).await.unwrap_err(),
            AuthError::Unauthenticated
        ));

        let stale = SessionToken::generate();
        assert!(matches!(
            auth.require_authenticated(Some(&stale)).await.unwrap_err(),
            AuthError::Unauthenticated
        ));

        let token = auth.login("alice", "s3cret").await.unwrap();
        assert_eq!(
            auth.require_authenticated(Some(&token)).await.unwrap(),
            "alice"
        );

        auth.logout(&token).await;
        assert!(matches!(
            auth.require_authenticated(Some(&token)).await.unwrap_err(),
            AuthError::Unauthenticated
        ));

        // Logout stays idempotent after the session is gone.
        auth.logout(&token).await;
    }

    #[tokio::test]
    async fn expired_session_fails_the_gate() {
        let auth = Authenticator::new(
            test_pool().await,
            Arc::new(InMemorySessionStore::new()),
            Duration::seconds(-1),
        );
        auth.register(&registration("alice", "s3cret")).await.unwrap();
        let token = auth.login("alice", "s3cret").await.unwrap();
        assert!(matches!(
            auth.require_authenticated(Some(&token)).await.unwrap_err(),
            AuthError::Unauthenticated
        ));
    }

    #[tokio::test]
    async fn storage_failure_is_not_reported_as_bad_credentials() {
        let auth = authenticator().await;
        auth.register(&registration("alice", "s3cret")).await.unwrap();

        // Kill the pool so the lookup fails at the storage layer.
        auth.db.close().await;

        let err = auth.login("alice", "s3cret").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
        // Clients see an infrastructure failure, not a credential rejection.
        assert_eq!(err.to_string(), "storage error");
    }

    #[tokio::test]
    async fn signup_login_logout_scenario() {
        let auth = authenticator().await;

        let id = auth.register(&registration("alice", "s3cret")).await.unwrap();
        assert_eq!(id, 1);

        let session = auth.login("alice", "s3cret").await.unwrap();
        assert_eq!(
            auth.require_authenticated(Some(&session)).await.unwrap(),
            "alice"
        );

        assert!(matches!(
            auth.login("alice", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));

        auth.logout(&session).await;
        assert!(matches!(
            auth.require_authenticated(Some(&session)).await.unwrap_err(),
            AuthError::Unauthenticated
        ));
    }
}
