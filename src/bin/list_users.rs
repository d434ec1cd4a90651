//! Prints every registered user for local inspection. Password hashes are not
//! selected.

use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://library.db".into());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .context("connect to database")?;

    let rows = sqlx::query(
        r#"
        SELECT id, first_name, second_name, third_name, username,
               location, age, best_books_category
        FROM users
        ORDER BY id
        "#,
    )
    .fetch_all(&pool)
    .await
    .context("query users")?;

    if rows.is_empty() {
        println!("No users found in the table.");
        return Ok(());
    }

    println!("Users in the table:");
    for row in rows {
        let id: i64 = row.get("id");
        let first_name: String = row.get("first_name");
        let second_name: String = row.get("second_name");
        let third_name: Option<String> = row.get("third_name");
        let username: String = row.get("username");
        let location: String = row.get("location");
        let age: i64 = row.get("age");
        let category: String = row.get("best_books_category");
        println!(
            "{id}: {username} ({first_name} {second_name}{}) {location}, age {age}, likes {category}",
            third_name
                .map(|t| format!(" {t}"))
                .unwrap_or_default()
        );
    }

    Ok(())
}
