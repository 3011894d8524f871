//! Monthly rent ledger. One payment row per (tenant, unit, month, year) —
//! the unique key in db/schema.sql makes the upsert idempotent under
//! concurrency, so "pay now" can be retried freely.

use chrono::{NaiveDate, Utc};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Payment;
use crate::repository::{catalog, payments, tenants};

/// Rent for a month falls due on its fifth day.
const RENT_DUE_DAY: u32 = 5;

const REFERENCE_PREFIX: &str = "PAY-";

pub async fn record_or_complete(
    pool: &PgPool,
    tenant_id: Uuid,
    month: i32,
    year: i32,
    method: Option<&str>,
) -> AppResult<Payment> {
    validate_period(month, year)?;

    let tenant = tenants::get_tenant(pool, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
    let unit_id = tenant
        .unit_id
        .ok_or_else(|| AppError::NotFound("Tenant unit not found".to_string()))?;
    let unit = catalog::get_unit(pool, unit_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit not found".to_string()))?;

    let reference = generate_reference();
    let due_date = due_date_for(year, month)?;

    let payment = payments::upsert_completed(
        pool,
        tenant.id,
        unit.id,
        month,
        year,
        unit.rent,
        method,
        &reference,
        due_date,
    )
    .await?;

    tracing::info!(
        payment_id = %payment.id,
        tenant_id = %tenant.id,
        month,
        year,
        amount = payment.amount,
        "Payment completed"
    );

    Ok(payment)
}

/// Move pending payments past their due date to overdue.
pub async fn sweep_overdue(pool: &PgPool) -> AppResult<u64> {
    payments::mark_overdue_before(pool, Utc::now().date_naive()).await
}

pub fn validate_period(month: i32, year: i32) -> AppResult<()> {
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest(
            "month must be between 1 and 12".to_string(),
        ));
    }
    if !(2000..=2100).contains(&year) {
        return Err(AppError::BadRequest("year is out of range".to_string()));
    }
    Ok(())
}

pub fn due_date_for(year: i32, month: i32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month as u32, RENT_DUE_DAY)
        .ok_or_else(|| AppError::BadRequest("month must be between 1 and 12".to_string()))
}

/// Synthetic receipt number: a fixed prefix plus eight random digits.
/// Cosmetic — collisions are improbable, not impossible, and nothing keys
/// on it.
pub fn generate_reference() -> String {
    let digits: u32 = rand::thread_rng().gen_range(0..100_000_000);
    format!("{REFERENCE_PREFIX}{digits:08}")
}

#[cfg(test)]
mod tests {
    use super::{due_date_for, generate_reference, validate_period};
    use chrono::{Datelike, NaiveDate};

    #[test]
    fn due_date_is_the_fifth() {
        let due = due_date_for(2024, 3).expect("valid period");
        assert_eq!(due, NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date"));
        assert_eq!(due_date_for(2024, 12).expect("valid period").day(), 5);
    }

    #[test]
    fn rejects_out_of_range_periods() {
        assert!(validate_period(0, 2024).is_err());
        assert!(validate_period(13, 2024).is_err());
        assert!(validate_period(6, 1897).is_err());
        assert!(validate_period(6, 2024).is_ok());
    }

    #[test]
    fn reference_has_prefix_and_eight_digits() {
        let reference = generate_reference();
        let digits = reference.strip_prefix("PAY-").expect("prefix present");
        assert_eq!(digits.len(), 8);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}
