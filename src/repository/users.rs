use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{PublicUser, User};

pub async fn insert_user(
    executor: impl PgExecutor<'_>,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> AppResult<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email, password_hash, role)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(executor)
    .await?;
    Ok(user)
}

pub async fn find_by_email(
    executor: impl PgExecutor<'_>,
    email: &str,
) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

pub async fn find_by_id(executor: impl PgExecutor<'_>, user_id: Uuid) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

pub async fn list_users(executor: impl PgExecutor<'_>) -> AppResult<Vec<PublicUser>> {
    let users = sqlx::query_as::<_, PublicUser>(
        "SELECT id, name, email, role, created_at FROM users ORDER BY created_at DESC",
    )
    .fetch_all(executor)
    .await?;
    Ok(users)
}

pub async fn update_user(
    executor: impl PgExecutor<'_>,
    user_id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
    password_hash: Option<&str>,
    role: Option<&str>,
) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET
             name = COALESCE($2, name),
             email = COALESCE($3, email),
             password_hash = COALESCE($4, password_hash),
             role = COALESCE($5, role)
         WHERE id = $1
         RETURNING *",
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(executor)
    .await?;
    Ok(user)
}

pub async fn set_password_hash(
    executor: impl PgExecutor<'_>,
    user_id: Uuid,
    password_hash: &str,
) -> AppResult<bool> {
    let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_user(executor: impl PgExecutor<'_>, user_id: Uuid) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
