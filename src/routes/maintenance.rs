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
    auth::{require_role, require_user, Claims},
    error::{AppError, AppResult},
    models::{
        request_priority, request_status, role, MaintenanceRequest, RequestWithContext, Tenant,
        UnitWithContext,
    },
    repository::{catalog, maintenance, tenants},
    schemas::{
        clamp_limit_in_range, validate_input, CreateMaintenanceInput, MaintenanceQuery,
        RequestPath, UpdateMaintenanceInput,
    },
    state::AppState,
};

const MAINTENANCE_ADMIN_ROLES: &[&str] = &[role::LANDLORD, role::ADMIN];

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/maintenance",
            axum::routing::get(list_requests).post(create_request),
        )
        .route("/maintenance/my", axum::routing::get(my_requests))
        .route("/maintenance/units", axum::routing::get(unit_options))
        .route(
            "/maintenance/{request_id}",
            axum::routing::patch(update_request).delete(delete_request),
        )
}

async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, MAINTENANCE_ADMIN_ROLES)?;
    if let Some(status) = &query.status {
        ensure_known_request_status(status)?;
    }
    if let Some(priority) = &query.priority {
        ensure_known_priority(priority)?;
    }

    let rows = maintenance::list_requests(
        &state.db_pool,
        query.status.as_deref(),
        query.priority.as_deref(),
        clamp_limit_in_range(query.limit, 1, 500),
    )
    .await?;
    let views = attach_context(&state, rows).await?;

    Ok(Json(json!({ "requests": views })))
}

async fn my_requests(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;

    let Some(tenant) = tenants::find_by_user(&state.db_pool, claims.sub).await? else {
        return Ok(Json(json!({ "requests": [] })));
    };
    let rows = maintenance::requests_for_tenant(&state.db_pool, tenant.id).await?;
    let views = attach_context(&state, rows).await?;

    Ok(Json(json!({ "requests": views })))
}

/// Unit selector for staff filing a request on a tenant's behalf.
async fn unit_options(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, MAINTENANCE_ADMIN_ROLES)?;

    let units = catalog::list_units(&state.db_pool).await?;
    let units = catalog::units_with_context(&state.db_pool, units).await?;

    Ok(Json(json!({ "units": units })))
}

/// Tenants report against their own unit; staff must name the unit.
async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateMaintenanceInput>,
) -> AppResult<impl IntoResponse> {
    let claims = require_user(&state, &headers)?;
    validate_input(&payload)?;
    ensure_known_priority(&payload.priority)?;

    let (unit_id, tenant_id) = resolve_request_target(&state, &claims, payload.unit_id).await?;

    let request = maintenance::insert_request(
        &state.db_pool,
        unit_id,
        tenant_id,
        payload.title.trim(),
        payload.description.trim(),
        &payload.priority,
    )
    .await?;

    tracing::info!(
        request_id = %request.id,
        unit_id = %unit_id,
        priority = %request.priority,
        "Maintenance request created"
    );

    let mut views = attach_context(&state, vec![request]).await?;
    let view = views.remove(0);

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "request": view })),
    ))
}

async fn update_request(
    State(state): State<AppState>,
    Path(path): Path<RequestPath>,
    headers: HeaderMap,
    Json(payload): Json<UpdateMaintenanceInput>,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;
    validate_input(&payload)?;
    if let Some(status) = &payload.status {
        ensure_known_request_status(status)?;
    }
    if let Some(priority) = &payload.priority {
        ensure_known_priority(priority)?;
    }

    let existing = maintenance::get_request(&state.db_pool, path.request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

    let patch = if claims.is_staff() {
        // Staff manage status and priority.
        UpdateMaintenanceInput {
            description: payload.description,
            status: payload.status,
            priority: payload.priority,
        }
    } else {
        // A tenant may only reword the description of their own pending
        // request.
        let tenant = tenants::find_by_user(&state.db_pool, claims.sub)
            .await?
            .ok_or_else(|| AppError::Forbidden("Not allowed".to_string()))?;
        if existing.tenant_id != Some(tenant.id) {
            return Err(AppError::NotFound("Request not found".to_string()));
        }
        if existing.status != request_status::PENDING {
            return Err(AppError::BadRequest(
                "Only pending requests can be edited".to_string(),
            ));
        }
        let description = payload
            .description
            .ok_or_else(|| AppError::BadRequest("Description is required".to_string()))?;
        UpdateMaintenanceInput {
            description: Some(description),
            status: None,
            priority: None,
        }
    };

    if patch.description.is_none() && patch.status.is_none() && patch.priority.is_none() {
        let mut views = attach_context(&state, vec![existing]).await?;
        return Ok(Json(json!({ "request": views.remove(0) })));
    }

    let updated = maintenance::update_request(&state.db_pool, path.request_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

    let mut views = attach_context(&state, vec![updated]).await?;
    Ok(Json(json!({ "request": views.remove(0) })))
}

async fn delete_request(
    State(state): State<AppState>,
    Path(path): Path<RequestPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, MAINTENANCE_ADMIN_ROLES)?;

    let deleted = maintenance::delete_request(&state.db_pool, path.request_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Request not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn resolve_request_target(
    state: &AppState,
    claims: &Claims,
    requested_unit: Option<Uuid>,
) -> AppResult<(Uuid, Option<Uuid>)> {
    if claims.role == role::TENANT {
        let tenant = tenants::find_by_user(&state.db_pool, claims.sub)
            .await?
            .ok_or_else(|| AppError::BadRequest("Tenant unit not found".to_string()))?;
        let unit_id = tenant
            .unit_id
            .ok_or_else(|| AppError::BadRequest("Tenant unit not found".to_string()))?;
        return Ok((unit_id, Some(tenant.id)));
    }

    let unit_id =
        requested_unit.ok_or_else(|| AppError::BadRequest("unitId is required".to_string()))?;
    let unit = catalog::get_unit(&state.db_pool, unit_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit not found".to_string()))?;
    Ok((unit.id, None))
}

async fn attach_context(
    state: &AppState,
    rows: Vec<MaintenanceRequest>,
) -> AppResult<Vec<RequestWithContext>> {
    let mut unit_ids: Vec<Uuid> = rows.iter().map(|request| request.unit_id).collect();
    unit_ids.sort_unstable();
    unit_ids.dedup();
    let mut tenant_ids: Vec<Uuid> = rows.iter().filter_map(|request| request.tenant_id).collect();
    tenant_ids.sort_unstable();
    tenant_ids.dedup();

    let units = catalog::get_units(&state.db_pool, &unit_ids).await?;
    let units_by_id: HashMap<Uuid, UnitWithContext> =
        catalog::units_with_context(&state.db_pool, units)
            .await?
            .into_iter()
            .map(|unit| (unit.unit.id, unit))
            .collect();
    let tenants_by_id: HashMap<Uuid, Tenant> = tenants::get_tenants(&state.db_pool, &tenant_ids)
        .await?
        .into_iter()
        .map(|tenant| (tenant.id, tenant))
        .collect();

    Ok(rows
        .into_iter()
        .map(|request| {
            let unit = units_by_id.get(&request.unit_id).cloned();
            let tenant = request
                .tenant_id
                .and_then(|tenant_id| tenants_by_id.get(&tenant_id).cloned());
            RequestWithContext {
                request,
                unit,
                tenant,
            }
        })
        .collect())
}

fn ensure_known_request_status(candidate: &str) -> AppResult<()> {
    if request_status::ALL.contains(&candidate) {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "Unknown request status '{candidate}'."
    )))
}

fn ensure_known_priority(candidate: &str) -> AppResult<()> {
    if request_priority::ALL.contains(&candidate) {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "Unknown priority '{candidate}'."
    )))
}

#[cfg(test)]
mod tests {
    use super::{ensure_known_priority, ensure_known_request_status};

    #[test]
    fn accepts_known_request_statuses_only() {
        assert!(ensure_known_request_status("pending").is_ok());
        assert!(ensure_known_request_status("in_progress").is_ok());
        assert!(ensure_known_request_status("completed").is_ok());
        assert!(ensure_known_request_status("cancelled").is_err());
    }

    #[test]
    fn accepts_known_priorities_only() {
        assert!(ensure_known_priority("high").is_ok());
        assert!(ensure_known_priority("medium").is_ok());
        assert!(ensure_known_priority("low").is_ok());
        assert!(ensure_known_priority("urgent").is_err());
    }
}
