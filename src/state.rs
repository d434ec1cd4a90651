use std::sync::Arc;

use sqlx::SqlitePool;
use time::Duration;

use crate::auth::service::Authenticator;
use crate::auth::session::{InMemorySessionStore, SessionStore};
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub auth: Authenticator,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config.database_url).await?;
        let sessions = Arc::new(InMemorySessionStore::new());
        Ok(Self::from_parts(pool, config, sessions))
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let auth = Authenticator::new(
            db.clone(),
            sessions,
            Duration::minutes(config.session.ttl_minutes),
        );
        Self { db, config, auth }
    }
}
