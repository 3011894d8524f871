use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::{
    auth::{hash_password, require_role, require_user},
    error::{AppError, AppResult},
    models::{role, PublicUser},
    repository::users,
    schemas::{validate_input, CreateUserInput, UpdateUserInput, UserPath},
    state::AppState,
};

const USER_ADMIN_ROLES: &[&str] = &[role::ADMIN];

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/users", axum::routing::get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            axum::routing::put(update_user).delete(delete_user),
        )
}

async fn list_users(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, USER_ADMIN_ROLES)?;

    let users = users::list_users(&state.db_pool).await?;
    Ok(Json(json!({ "users": users })))
}

async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUserInput>,
) -> AppResult<impl IntoResponse> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, USER_ADMIN_ROLES)?;
    validate_input(&payload)?;
    ensure_known_role(&payload.role)?;

    let password_hash = hash_password(&payload.password)?;
    let user = users::insert_user(
        &state.db_pool,
        payload.name.trim(),
        payload.email.trim(),
        &password_hash,
        &payload.role,
    )
    .await
    .map_err(|error| match error {
        AppError::Conflict(_) => AppError::Conflict("Email is already in use.".to_string()),
        other => other,
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, "User created");

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "user": PublicUser::from(user) })),
    ))
}

async fn update_user(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUserInput>,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, USER_ADMIN_ROLES)?;
    validate_input(&payload)?;
    if let Some(role) = &payload.role {
        ensure_known_role(role)?;
    }

    let password_hash = match &payload.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let user = users::update_user(
        &state.db_pool,
        path.user_id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        password_hash.as_deref(),
        payload.role.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "user": PublicUser::from(user) })))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, USER_ADMIN_ROLES)?;

    let deleted = users::delete_user(&state.db_pool, path.user_id)
        .await
        .map_err(|error| match error {
            // A user backing a tenant is removed via the tenant lifecycle,
            // which owns the cascade.
            AppError::Conflict(_) => AppError::Conflict(
                "User is linked to a tenant; remove the tenant instead.".to_string(),
            ),
            other => other,
        })?;
    if !deleted {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}

fn ensure_known_role(candidate: &str) -> AppResult<()> {
    if role::ALL.contains(&candidate) {
        return Ok(());
    }
    Err(AppError::BadRequest(format!("Unknown role '{candidate}'.")))
}

#[cfg(test)]
mod tests {
    use super::ensure_known_role;

    #[test]
    fn accepts_known_roles_only() {
        assert!(ensure_known_role("admin").is_ok());
        assert!(ensure_known_role("landlord").is_ok());
        assert!(ensure_known_role("tenant").is_ok());
        assert!(ensure_known_role("superuser").is_err());
    }
}
