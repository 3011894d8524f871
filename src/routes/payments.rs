use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    auth::{require_role, require_user},
    error::{AppError, AppResult},
    models::{payment_status, role, Payment, PaymentWithParties, Tenant, Unit},
    repository::{catalog, payments, tenants},
    schemas::{
        clamp_limit_in_range, validate_input, PaymentPath, PaymentsQuery, RecordPaymentInput,
        UpdatePaymentInput,
    },
    services::ledger,
    state::AppState,
};

const PAYMENT_ADMIN_ROLES: &[&str] = &[role::LANDLORD, role::ADMIN];

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/payments",
            axum::routing::get(list_payments).post(record_payment),
        )
        .route("/payments/my", axum::routing::get(my_payments))
        .route(
            "/payments/{payment_id}",
            axum::routing::patch(update_payment),
        )
}

async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentsQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, PAYMENT_ADMIN_ROLES)?;
    if let Some(status) = &query.status {
        ensure_known_payment_status(status)?;
    }

    let rows = payments::list_payments(
        &state.db_pool,
        query.status.as_deref(),
        query.tenant_id,
        clamp_limit_in_range(query.limit, 1, 1000),
    )
    .await?;
    let views = attach_parties(&state, rows).await?;

    Ok(Json(json!({ "payments": views })))
}

async fn my_payments(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;

    let Some(tenant) = tenants::find_by_user(&state.db_pool, claims.sub).await? else {
        return Ok(Json(json!({ "payments": [] })));
    };
    let rows = payments::payments_for_tenant(&state.db_pool, tenant.id).await?;

    Ok(Json(json!({ "payments": rows })))
}

/// Record the month's rent as paid. Tenants always pay as themselves; staff
/// name the tenant. Safe to retry — the ledger holds one row per
/// (tenant, unit, month, year) whatever happens.
async fn record_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RecordPaymentInput>,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;
    validate_input(&payload)?;

    let tenant_id = if claims.is_staff() {
        payload.tenant_id.ok_or_else(|| {
            AppError::BadRequest("tenantId is required when recording for a tenant.".to_string())
        })?
    } else {
        let tenant = tenants::find_by_user(&state.db_pool, claims.sub)
            .await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
        tenant.id
    };

    let payment = ledger::record_or_complete(
        &state.db_pool,
        tenant_id,
        payload.month,
        payload.year,
        payload.method.as_deref(),
    )
    .await?;

    Ok(Json(json!({ "payment": payment })))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(path): Path<PaymentPath>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePaymentInput>,
) -> AppResult<Json<Value>> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, PAYMENT_ADMIN_ROLES)?;
    validate_input(&payload)?;
    if let Some(status) = &payload.status {
        ensure_known_payment_status(status)?;
    }

    let existing = payments::get_payment(&state.db_pool, path.payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    if payload.is_empty() {
        return Ok(Json(json!({ "payment": existing })));
    }

    let updated = payments::update_payment(&state.db_pool, path.payment_id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    Ok(Json(json!({ "payment": updated })))
}

async fn attach_parties(
    state: &AppState,
    rows: Vec<Payment>,
) -> AppResult<Vec<PaymentWithParties>> {
    let mut tenant_ids: Vec<Uuid> = rows.iter().map(|payment| payment.tenant_id).collect();
    tenant_ids.sort_unstable();
    tenant_ids.dedup();
    let mut unit_ids: Vec<Uuid> = rows.iter().map(|payment| payment.unit_id).collect();
    unit_ids.sort_unstable();
    unit_ids.dedup();

    let tenants_by_id: HashMap<Uuid, Tenant> = tenants::get_tenants(&state.db_pool, &tenant_ids)
        .await?
        .into_iter()
        .map(|tenant| (tenant.id, tenant))
        .collect();
    let units_by_id: HashMap<Uuid, Unit> = catalog::get_units(&state.db_pool, &unit_ids)
        .await?
        .into_iter()
        .map(|unit| (unit.id, unit))
        .collect();

    Ok(rows
        .into_iter()
        .map(|payment| {
            let tenant = tenants_by_id.get(&payment.tenant_id).cloned();
            let unit = units_by_id.get(&payment.unit_id).cloned();
            PaymentWithParties {
                payment,
                tenant,
                unit,
            }
        })
        .collect())
}

fn ensure_known_payment_status(candidate: &str) -> AppResult<()> {
    if payment_status::ALL.contains(&candidate) {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "Unknown payment status '{candidate}'."
    )))
}

#[cfg(test)]
mod tests {
    use super::ensure_known_payment_status;

    #[test]
    fn accepts_known_payment_statuses_only() {
        assert!(ensure_known_payment_status("pending").is_ok());
        assert!(ensure_known_payment_status("completed").is_ok());
        assert!(ensure_known_payment_status("overdue").is_ok());
        assert!(ensure_known_payment_status("refunded").is_err());
    }
}
