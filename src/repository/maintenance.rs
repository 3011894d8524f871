use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{request_status, MaintenanceRequest};
use crate::schemas::UpdateMaintenanceInput;

pub async fn insert_request(
    executor: impl PgExecutor<'_>,
    unit_id: Uuid,
    tenant_id: Option<Uuid>,
    title: &str,
    description: &str,
    priority: &str,
) -> AppResult<MaintenanceRequest> {
    let request = sqlx::query_as::<_, MaintenanceRequest>(
        "INSERT INTO maintenance_requests (unit_id, tenant_id, title, description, priority, status)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(unit_id)
    .bind(tenant_id)
    .bind(title)
    .bind(description)
    .bind(priority)
    .bind(request_status::PENDING)
    .fetch_one(executor)
    .await?;
    Ok(request)
}

pub async fn get_request(
    executor: impl PgExecutor<'_>,
    request_id: Uuid,
) -> AppResult<Option<MaintenanceRequest>> {
    let request =
        sqlx::query_as::<_, MaintenanceRequest>("SELECT * FROM maintenance_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(executor)
            .await?;
    Ok(request)
}

pub async fn list_requests(
    executor: impl PgExecutor<'_>,
    status: Option<&str>,
    priority: Option<&str>,
    limit: i64,
) -> AppResult<Vec<MaintenanceRequest>> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM maintenance_requests WHERE 1=1");
    if let Some(status) = status {
        query.push(" AND status = ");
        query.push_bind(status.to_string());
    }
    if let Some(priority) = priority {
        query.push(" AND priority = ");
        query.push_bind(priority.to_string());
    }
    query.push(" ORDER BY date_reported DESC LIMIT ");
    query.push_bind(limit);

    let requests = query
        .build_query_as::<MaintenanceRequest>()
        .fetch_all(executor)
        .await?;
    Ok(requests)
}

pub async fn requests_for_tenant(
    executor: impl PgExecutor<'_>,
    tenant_id: Uuid,
) -> AppResult<Vec<MaintenanceRequest>> {
    let requests = sqlx::query_as::<_, MaintenanceRequest>(
        "SELECT * FROM maintenance_requests WHERE tenant_id = $1 ORDER BY date_reported DESC",
    )
    .bind(tenant_id)
    .fetch_all(executor)
    .await?;
    Ok(requests)
}

pub async fn update_request(
    executor: impl PgExecutor<'_>,
    request_id: Uuid,
    input: &UpdateMaintenanceInput,
) -> AppResult<Option<MaintenanceRequest>> {
    let mut query = QueryBuilder::<Postgres>::new("UPDATE maintenance_requests SET ");
    let mut fields = query.separated(", ");
    if let Some(description) = &input.description {
        fields.push("description = ");
        fields.push_bind_unseparated(description.clone());
    }
    if let Some(status) = &input.status {
        fields.push("status = ");
        fields.push_bind_unseparated(status.clone());
    }
    if let Some(priority) = &input.priority {
        fields.push("priority = ");
        fields.push_bind_unseparated(priority.clone());
    }
    query.push(" WHERE id = ");
    query.push_bind(request_id);
    query.push(" RETURNING *");

    let request = query
        .build_query_as::<MaintenanceRequest>()
        .fetch_optional(executor)
        .await?;
    Ok(request)
}

pub async fn delete_request(executor: impl PgExecutor<'_>, request_id: Uuid) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
        .bind(request_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Keep the unit's repair history when a tenant leaves: requests survive
/// with the tenant reference cleared.
pub async fn detach_tenant(executor: impl PgExecutor<'_>, tenant_id: Uuid) -> AppResult<u64> {
    let result =
        sqlx::query("UPDATE maintenance_requests SET tenant_id = NULL WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected())
}
