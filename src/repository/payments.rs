use chrono::NaiveDate;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{payment_status, Payment};
use crate::schemas::UpdatePaymentInput;

/// Transactional upsert on the ledger idempotency key. A fresh row is
/// written as completed with the given amount and due date; an existing row
/// (placeholder or a prior completion) keeps its amount and due date and is
/// marked completed with the new method, reference, and completion time.
/// Concurrent calls for the same (tenant, unit, month, year) converge on
/// one row either way.
pub async fn upsert_completed(
    executor: impl PgExecutor<'_>,
    tenant_id: Uuid,
    unit_id: Uuid,
    month: i32,
    year: i32,
    amount: f64,
    method: Option<&str>,
    reference: &str,
    due_date: NaiveDate,
) -> AppResult<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments
             (tenant_id, unit_id, month, year, amount, status, method, reference, due_date, paid_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
         ON CONFLICT (tenant_id, unit_id, month, year)
         DO UPDATE SET
             status = EXCLUDED.status,
             method = EXCLUDED.method,
             reference = EXCLUDED.reference,
             paid_at = EXCLUDED.paid_at
         RETURNING *",
    )
    .bind(tenant_id)
    .bind(unit_id)
    .bind(month)
    .bind(year)
    .bind(amount)
    .bind(payment_status::COMPLETED)
    .bind(method)
    .bind(reference)
    .bind(due_date)
    .fetch_one(executor)
    .await?;
    Ok(payment)
}

pub async fn get_payment(
    executor: impl PgExecutor<'_>,
    payment_id: Uuid,
) -> AppResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
        .bind(payment_id)
        .fetch_optional(executor)
        .await?;
    Ok(payment)
}

pub async fn list_payments(
    executor: impl PgExecutor<'_>,
    status: Option<&str>,
    tenant_id: Option<Uuid>,
    limit: i64,
) -> AppResult<Vec<Payment>> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM payments WHERE 1=1");
    if let Some(status) = status {
        query.push(" AND status = ");
        query.push_bind(status.to_string());
    }
    if let Some(tenant_id) = tenant_id {
        query.push(" AND tenant_id = ");
        query.push_bind(tenant_id);
    }
    query.push(" ORDER BY year DESC, month DESC LIMIT ");
    query.push_bind(limit);

    let payments = query
        .build_query_as::<Payment>()
        .fetch_all(executor)
        .await?;
    Ok(payments)
}

pub async fn payments_for_tenant(
    executor: impl PgExecutor<'_>,
    tenant_id: Uuid,
) -> AppResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE tenant_id = $1 ORDER BY year DESC, month DESC",
    )
    .bind(tenant_id)
    .fetch_all(executor)
    .await?;
    Ok(payments)
}

/// Administrative override patch. Returns `None` when the payment is
/// missing; an all-`None` input is the caller's responsibility to shortcut.
pub async fn update_payment(
    executor: impl PgExecutor<'_>,
    payment_id: Uuid,
    input: &UpdatePaymentInput,
) -> AppResult<Option<Payment>> {
    let mut query = QueryBuilder::<Postgres>::new("UPDATE payments SET ");
    let mut fields = query.separated(", ");
    if let Some(status) = &input.status {
        fields.push("status = ");
        fields.push_bind_unseparated(status.clone());
    }
    if let Some(method) = &input.method {
        fields.push("method = ");
        fields.push_bind_unseparated(method.clone());
    }
    if let Some(reference) = &input.reference {
        fields.push("reference = ");
        fields.push_bind_unseparated(reference.clone());
    }
    if let Some(date) = input.date {
        fields.push("paid_at = ");
        fields.push_bind_unseparated(date);
    }
    query.push(" WHERE id = ");
    query.push_bind(payment_id);
    query.push(" RETURNING *");

    let payment = query
        .build_query_as::<Payment>()
        .fetch_optional(executor)
        .await?;
    Ok(payment)
}

pub async fn delete_for_tenant(executor: impl PgExecutor<'_>, tenant_id: Uuid) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM payments WHERE tenant_id = $1")
        .bind(tenant_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Flip pending payments whose due date has passed to overdue. Returns the
/// number of rows touched.
pub async fn mark_overdue_before(
    executor: impl PgExecutor<'_>,
    today: NaiveDate,
) -> AppResult<u64> {
    let result = sqlx::query(
        "UPDATE payments SET status = $1 WHERE status = $2 AND due_date < $3",
    )
    .bind(payment_status::OVERDUE)
    .bind(payment_status::PENDING)
    .bind(today)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
