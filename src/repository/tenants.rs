use chrono::NaiveDate;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{tenant_status, Tenant};
use crate::schemas::UpdateTenantInput;

pub async fn insert_tenant(
    executor: impl PgExecutor<'_>,
    user_id: Uuid,
    unit_id: Uuid,
    name: &str,
    email: &str,
    phone: &str,
    move_in_date: NaiveDate,
    lease_end: NaiveDate,
) -> AppResult<Tenant> {
    let tenant = sqlx::query_as::<_, Tenant>(
        "INSERT INTO tenants (user_id, unit_id, name, email, phone, move_in_date, lease_end, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(user_id)
    .bind(unit_id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(move_in_date)
    .bind(lease_end)
    .bind(tenant_status::ACTIVE)
    .fetch_one(executor)
    .await?;
    Ok(tenant)
}

pub async fn get_tenant(
    executor: impl PgExecutor<'_>,
    tenant_id: Uuid,
) -> AppResult<Option<Tenant>> {
    let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;
    Ok(tenant)
}

pub async fn find_by_user(
    executor: impl PgExecutor<'_>,
    user_id: Uuid,
) -> AppResult<Option<Tenant>> {
    let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(tenant)
}

pub async fn list_tenants(executor: impl PgExecutor<'_>, limit: i64) -> AppResult<Vec<Tenant>> {
    let tenants =
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(executor)
            .await?;
    Ok(tenants)
}

pub async fn get_tenants(
    executor: impl PgExecutor<'_>,
    tenant_ids: &[Uuid],
) -> AppResult<Vec<Tenant>> {
    if tenant_ids.is_empty() {
        return Ok(Vec::new());
    }
    let tenants = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = ANY($1)")
        .bind(tenant_ids)
        .fetch_all(executor)
        .await?;
    Ok(tenants)
}

/// Patch the plain profile fields. Unit moves never go through here — they
/// belong to the occupancy service, which owns the unit-status transaction.
pub async fn update_fields(
    executor: impl PgExecutor<'_>,
    tenant_id: Uuid,
    input: &UpdateTenantInput,
) -> AppResult<Option<Tenant>> {
    let mut any_field = false;
    let mut query = QueryBuilder::<Postgres>::new("UPDATE tenants SET ");
    let mut fields = query.separated(", ");
    if let Some(name) = &input.name {
        fields.push("name = ");
        fields.push_bind_unseparated(name.clone());
        any_field = true;
    }
    if let Some(email) = &input.email {
        fields.push("email = ");
        fields.push_bind_unseparated(email.clone());
        any_field = true;
    }
    if let Some(phone) = &input.phone {
        fields.push("phone = ");
        fields.push_bind_unseparated(phone.clone());
        any_field = true;
    }
    if let Some(move_in_date) = input.move_in_date {
        fields.push("move_in_date = ");
        fields.push_bind_unseparated(move_in_date);
        any_field = true;
    }
    if let Some(lease_end) = input.lease_end {
        fields.push("lease_end = ");
        fields.push_bind_unseparated(lease_end);
        any_field = true;
    }
    if let Some(status) = &input.status {
        fields.push("status = ");
        fields.push_bind_unseparated(status.clone());
        any_field = true;
    }
    if !any_field {
        return get_tenant(executor, tenant_id).await;
    }

    query.push(" WHERE id = ");
    query.push_bind(tenant_id);
    query.push(" RETURNING *");

    let tenant = query
        .build_query_as::<Tenant>()
        .fetch_optional(executor)
        .await?;
    Ok(tenant)
}

pub async fn set_unit(
    executor: impl PgExecutor<'_>,
    tenant_id: Uuid,
    unit_id: Option<Uuid>,
) -> AppResult<Option<Tenant>> {
    let tenant = sqlx::query_as::<_, Tenant>(
        "UPDATE tenants SET unit_id = $2 WHERE id = $1 RETURNING *",
    )
    .bind(tenant_id)
    .bind(unit_id)
    .fetch_optional(executor)
    .await?;
    Ok(tenant)
}

pub async fn delete_tenant(executor: impl PgExecutor<'_>, tenant_id: Uuid) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
        .bind(tenant_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
