use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    auth::{require_role, require_user},
    error::{AppError, AppResult},
    models::{role, tenant_status, Tenant, TenantWithUnit, UnitWithContext},
    repository::{catalog, tenants},
    schemas::{
        clamp_limit_in_range, validate_input, CreateTenantInput, TenantPath, TenantsQuery,
        UpdateTenantInput,
    },
    services::occupancy,
    state::AppState,
};

const TENANT_EDIT_ROLES: &[&str] = &[role::LANDLORD, role::ADMIN];

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/tenants",
            axum::routing::get(list_tenants).post(create_tenant),
        )
        .route("/tenants/me", axum::routing::get(tenant_me))
        .route("/tenants/vacant-units", axum::routing::get(vacant_units))
        .route(
            "/tenants/{tenant_id}",
            axum::routing::patch(update_tenant).delete(delete_tenant),
        )
}

async fn list_tenants(
    State(state): State<AppState>,
    Query(query): Query<TenantsQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers)?;
    let pool = &state.db_pool;

    let rows = tenants::list_tenants(pool, clamp_limit_in_range(query.limit, 1, 500)).await?;
    let views = attach_unit_context(&state, rows).await?;

    Ok(Json(json!({ "tenants": views })))
}

async fn tenant_me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;

    let tenant = tenants::find_by_user(&state.db_pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
    let mut views = attach_unit_context(&state, vec![tenant]).await?;
    let view = views.remove(0);

    Ok(Json(json!({ "tenant": view })))
}

async fn vacant_units(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    require_user(&state, &headers)?;

    let units = catalog::list_vacant_units(&state.db_pool).await?;
    let units = catalog::units_with_context(&state.db_pool, units).await?;

    Ok(Json(json!({ "units": units })))
}

async fn create_tenant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateTenantInput>,
) -> AppResult<impl IntoResponse> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, TENANT_EDIT_ROLES)?;
    validate_input(&payload)?;

    let created = occupancy::create_tenant(&state.db_pool, &payload).await?;
    let email = created.tenant.email.clone();
    let mut views = attach_unit_context(&state, vec![created.tenant]).await?;
    let view = views.remove(0);

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({
            "tenant": view,
            "credentials": { "email": email, "password": created.password }
        })),
    ))
}

async fn update_tenant(
    State(state): State<AppState>,
    Path(path): Path<TenantPath>,
    headers: HeaderMap,
    Json(payload): Json<UpdateTenantInput>,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, TENANT_EDIT_ROLES)?;
    validate_input(&payload)?;
    if let Some(status) = &payload.status {
        ensure_known_tenant_status(status)?;
    }

    let tenant = tenants::get_tenant(&state.db_pool, path.tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    // A differing unit id is a move, and the move is atomic: unit statuses
    // and the tenant's unit reference change in one transaction before the
    // plain field updates are applied.
    if let Some(target_unit) = reassignment_target(tenant.unit_id, payload.unit_id) {
        occupancy::reassign_tenant(&state.db_pool, path.tenant_id, target_unit).await?;
    }

    let updated = tenants::update_fields(&state.db_pool, path.tenant_id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    let mut views = attach_unit_context(&state, vec![updated]).await?;
    let view = views.remove(0);

    Ok(Json(json!({ "tenant": view })))
}

async fn delete_tenant(
    State(state): State<AppState>,
    Path(path): Path<TenantPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, TENANT_EDIT_ROLES)?;

    occupancy::remove_tenant(&state.db_pool, path.tenant_id).await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// A reassignment happens only when the payload names a unit different from
/// the tenant's current one.
fn reassignment_target(current: Option<Uuid>, requested: Option<Uuid>) -> Option<Uuid> {
    match requested {
        Some(unit_id) if current != Some(unit_id) => Some(unit_id),
        _ => None,
    }
}

async fn attach_unit_context(
    state: &AppState,
    rows: Vec<Tenant>,
) -> AppResult<Vec<TenantWithUnit>> {
    let mut unit_ids: Vec<Uuid> = rows.iter().filter_map(|tenant| tenant.unit_id).collect();
    unit_ids.sort_unstable();
    unit_ids.dedup();

    let units = catalog::get_units(&state.db_pool, &unit_ids).await?;
    let units = catalog::units_with_context(&state.db_pool, units).await?;
    let mut units_by_id: HashMap<Uuid, UnitWithContext> = units
        .into_iter()
        .map(|unit| (unit.unit.id, unit))
        .collect();

    Ok(rows
        .into_iter()
        .map(|tenant| {
            let unit = tenant
                .unit_id
                .and_then(|unit_id| units_by_id.remove(&unit_id));
            TenantWithUnit { tenant, unit }
        })
        .collect())
}

fn ensure_known_tenant_status(candidate: &str) -> AppResult<()> {
    if tenant_status::ALL.contains(&candidate) {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "Unknown tenant status '{candidate}'."
    )))
}

#[cfg(test)]
mod tests {
    use super::{ensure_known_tenant_status, reassignment_target};
    use uuid::Uuid;

    #[test]
    fn same_unit_is_not_a_reassignment() {
        let unit = Uuid::new_v4();
        assert_eq!(reassignment_target(Some(unit), Some(unit)), None);
    }

    #[test]
    fn differing_unit_triggers_reassignment() {
        let current = Uuid::new_v4();
        let target = Uuid::new_v4();
        assert_eq!(
            reassignment_target(Some(current), Some(target)),
            Some(target)
        );
        assert_eq!(reassignment_target(None, Some(target)), Some(target));
    }

    #[test]
    fn absent_unit_id_means_no_move() {
        assert_eq!(reassignment_target(Some(Uuid::new_v4()), None), None);
        assert_eq!(reassignment_target(None, None), None);
    }

    #[test]
    fn accepts_known_tenant_statuses_only() {
        assert!(ensure_known_tenant_status("active").is_ok());
        assert!(ensure_known_tenant_status("late").is_ok());
        assert!(ensure_known_tenant_status("ending").is_ok());
        assert!(ensure_known_tenant_status("evicted").is_err());
    }
}
