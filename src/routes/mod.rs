use axum::{routing::get, Router};

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod maintenance;
pub mod payments;
pub mod properties;
pub mod tenants;
pub mod users;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .merge(auth::router())
        .merge(users::router())
        .merge(properties::router())
        .merge(tenants::router())
        .merge(payments::router())
        .merge(maintenance::router())
}
