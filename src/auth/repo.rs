use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::auth::service::UserRegistration;

/// User record in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub third_name: Option<String>,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    pub location: String,
    pub age: i64,
    pub best_books_category: String,
}

impl User {
    /// Find a user by exact, case-sensitive username.
    pub async fn find_by_username(
        db: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, second_name, third_name, username,
                   password_hash, location, age, best_books_category
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user in one statement. Username uniqueness is left to the
    /// table's UNIQUE constraint, so concurrent registrations cannot race a
    /// separate existence check.
    pub async fn create(
        db: &SqlitePool,
        candidate: &UserRegistration,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, second_name, third_name, username,
                               password_hash, location, age, best_books_category)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, first_name, second_name, third_name, username,
                      password_hash, location, age, best_books_category
            "#,
        )
        .bind(&candidate.first_name)
        .bind(&candidate.second_name)
        .bind(&candidate.third_name)
        .bind(&candidate.username)
        .bind(password_hash)
        .bind(&candidate.location)
        .bind(candidate.age)
        .bind(&candidate.best_books_category)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}
