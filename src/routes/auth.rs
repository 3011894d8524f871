use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::{
    auth::{hash_password, require_user, sign_token, verify_password},
    error::{AppError, AppResult},
    models::PublicUser,
    repository::users,
    schemas::{validate_input, ChangePasswordInput, LoginInput},
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/auth/login", axum::routing::post(login))
        .route("/auth/me", axum::routing::get(me))
        .route(
            "/auth/change-password",
            axum::routing::post(change_password),
        )
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginInput>,
) -> AppResult<Json<Value>> {
    validate_input(&payload)?;

    let user = users::find_by_email(&state.db_pool, payload.email.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = sign_token(
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
        user.id,
        &user.role,
    )?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(json!({
        "token": token,
        "user": PublicUser::from(user)
    })))
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;

    let user = users::find_by_id(&state.db_pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "user": PublicUser::from(user) })))
}

async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ChangePasswordInput>,
) -> AppResult<impl IntoResponse> {
    let claims = require_user(&state, &headers)?;
    validate_input(&payload)?;

    let user = users::find_by_id(&state.db_pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.new_password)?;
    users::set_password_hash(&state.db_pool, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(axum::http::StatusCode::NO_CONTENT)
}
