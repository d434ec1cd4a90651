use std::collections::HashMap;
use std::sync::Mutex;

use axum::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Opaque session identifier handed to the client as a cookie value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Tokens are credentials; keep them out of logs.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Server-side session state, keyed by token. The source kept this in an
/// ambient framework session dict; here it is an explicit store injected into
/// the authenticator so expiry and invalidation are testable.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, token: SessionToken, username: String, expires_at: OffsetDateTime);

    /// Returns the username bound to a live session, or `None` if the token is
    /// unknown or expired.
    async fn lookup(&self, token: &SessionToken) -> Option<String>;

    /// Idempotent; removing an absent token is not an error.
    async fn remove(&self, token: &SessionToken);
}

struct SessionEntry {
    username: String,
    expires_at: OffsetDateTime,
}

#[derive(Default)]
pub struct InMemorySessionStore {
    inner: Mutex<HashMap<String, SessionEntry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, token: SessionToken, username: String, expires_at: OffsetDateTime) {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        sessions.insert(
            token.0,
            SessionEntry {
                username,
                expires_at,
            },
        );
    }

    async fn lookup(&self, token: &SessionToken) -> Option<String> {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        match sessions.get(&token.0) {
            Some(entry) if entry.expires_at > OffsetDateTime::now_utc() => {
                Some(entry.username.clone())
            }
            Some(_) => {
                // Expired entries are purged on first touch.
                sessions.remove(&token.0);
                None
            }
            None => None,
        }
    }

    async fn remove(&self, token: &SessionToken) {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        sessions.remove(&token.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[tokio::test]
    async fn insert_then_lookup_returns_username() {
        let store = InMemorySessionStore::new();
        let token = SessionToken::generate();
        let expires = OffsetDateTime::now_utc() + Duration::minutes(5);
        store.insert(token.clone(), "alice".into(), expires).await;
        assert_eq!(store.lookup(&token).await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn expired_session_behaves_as_absent() {
        let store = InMemorySessionStore::new();
        let token = SessionToken::generate();
        let expires = OffsetDateTime::now_utc() - Duration::seconds(1);
        store.insert(token.clone(), "alice".into(), expires).await;
        assert_eq!(store.lookup(&token).await, None);
        // Purged, not merely hidden.
        assert_eq!(store.lookup(&token).await, None);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemorySessionStore::new();
        let token = SessionToken::generate();
        store.remove(&token).await;
        let expires = OffsetDateTime::now_utc() + Duration::minutes(5);
        store.insert(token.clone(), "bob".into(), expires).await;
        store.remove(&token).await;
        store.remove(&token).await;
        assert_eq!(store.lookup(&token).await, None);
    }

    #[tokio::test]
    async fn generated_tokens_are_distinct() {
        assert_ne!(
            SessionToken::generate().as_str(),
            SessionToken::generate().as_str()
        );
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let token = SessionToken::generate();
        assert_eq!(format!("{:?}", token), "SessionToken(..)");
    }
}
