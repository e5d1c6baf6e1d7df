//! User persistence: lookup, insert, password and cash updates.

use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::types::user::User;

/// Row returned from DB (username is stored lowercase).
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub cash: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            cash: row.cash,
        }
    }
}

/// Get a user by username (lowercase).
pub async fn get_user_by_username<'e, E: PgExecutor<'e>>(
    executor: E,
    username_lowercase: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, cash FROM users WHERE username = $1",
    )
    .bind(username_lowercase)
    .fetch_optional(executor)
    .await
}

pub async fn get_user_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, cash FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Insert a user. Username must already be lowercase.
pub async fn insert_user<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    username: &str,
    password_hash: &str,
    cash: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (id, username, password_hash, cash) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(cash)
        .execute(executor)
        .await?;
    Ok(())
}

/// Replace the password hash. Returns the number of rows touched.
pub async fn update_password_hash<'e, E: PgExecutor<'e>>(
    executor: E,
    username_lowercase: &str,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE username = $2")
        .bind(password_hash)
        .bind(username_lowercase)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Read the cash balance and lock the user row until the surrounding transaction ends.
pub async fn lock_cash<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT cash FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn set_cash<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    cash: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET cash = $1 WHERE id = $2")
        .bind(cash)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}
