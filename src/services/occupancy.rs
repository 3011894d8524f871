//! Tenant–unit lifecycle. Every operation here is one transaction: the
//! unit-status flip, the tenant row, and the login credential commit
//! together or not at all. Vacancy is claimed with a conditional update so
//! two racing requests for the same unit cannot both win — the loser sees a
//! conflict, never a half-applied move.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::error::{AppError, AppResult};
use crate::models::{role, Tenant};
use crate::repository::{catalog, maintenance, payments, tenants, users};
use crate::schemas::CreateTenantInput;

pub struct CreatedTenant {
    pub tenant: Tenant,
    /// Plaintext password, disclosed exactly once in the creation response.
    pub password: String,
}

pub async fn create_tenant(pool: &PgPool, input: &CreateTenantInput) -> AppResult<CreatedTenant> {
    let mut tx = pool.begin().await?;

    let claimed = catalog::claim_unit(&mut *tx, input.unit_id).await?;
    if claimed.is_none() {
        let error = unit_claim_error(&mut tx, input.unit_id).await?;
        let _ = tx.rollback().await;
        return Err(error);
    }

    let password = input
        .password
        .clone()
        .unwrap_or_else(auth::generate_tenant_password);
    let password_hash = auth::hash_password(&password)?;

    let user = users::insert_user(
        &mut *tx,
        &input.name,
        &input.email,
        &password_hash,
        role::TENANT,
    )
    .await
    .map_err(|error| match error {
        AppError::Conflict(_) => AppError::Conflict("Email is already in use.".to_string()),
        other => other,
    })?;

    let tenant = tenants::insert_tenant(
        &mut *tx,
        user.id,
        input.unit_id,
        &input.name,
        &input.email,
        &input.phone,
        input.move_in_date,
        input.lease_end,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        tenant_id = %tenant.id,
        unit_id = %input.unit_id,
        "Tenant created, unit occupied"
    );

    Ok(CreatedTenant { tenant, password })
}

/// Move a tenant to another unit. Reassigning to the current unit is a
/// no-op. Otherwise the target is claimed first (conditional update — a
/// concurrent winner leaves us with a conflict), then the prior unit is
/// released and the tenant repointed, all in one transaction.
pub async fn reassign_tenant(
    pool: &PgPool,
    tenant_id: Uuid,
    new_unit_id: Uuid,
) -> AppResult<Tenant> {
    let mut tx = pool.begin().await?;

    let tenant = tenants::get_tenant(&mut *tx, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    if tenant.unit_id == Some(new_unit_id) {
        let _ = tx.rollback().await;
        return Ok(tenant);
    }

    let claimed = catalog::claim_unit(&mut *tx, new_unit_id).await?;
    if claimed.is_none() {
        let error = unit_claim_error(&mut tx, new_unit_id).await?;
        let _ = tx.rollback().await;
        return Err(error);
    }

    if let Some(prior_unit_id) = tenant.unit_id {
        catalog::release_unit(&mut *tx, prior_unit_id).await?;
    }

    let updated = tenants::set_unit(&mut *tx, tenant_id, Some(new_unit_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    tx.commit().await?;

    tracing::info!(
        tenant_id = %tenant_id,
        from_unit = ?tenant.unit_id,
        to_unit = %new_unit_id,
        "Tenant reassigned"
    );

    Ok(updated)
}

/// Delete a tenant and its login credential. The cascade is explicit and
/// transactional: payments go, maintenance requests are detached, the unit
/// is released.
pub async fn remove_tenant(pool: &PgPool, tenant_id: Uuid) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let tenant = tenants::get_tenant(&mut *tx, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    let payments_deleted = payments::delete_for_tenant(&mut *tx, tenant_id).await?;
    let requests_detached = maintenance::detach_tenant(&mut *tx, tenant_id).await?;

    if let Some(unit_id) = tenant.unit_id {
        catalog::release_unit(&mut *tx, unit_id).await?;
    }

    tenants::delete_tenant(&mut *tx, tenant_id).await?;
    users::delete_user(&mut *tx, tenant.user_id).await?;

    tx.commit().await?;

    tracing::info!(
        tenant_id = %tenant_id,
        payments_deleted,
        requests_detached,
        "Tenant removed, unit released"
    );

    Ok(())
}

/// A failed claim is either a missing unit or a lost race; re-read inside
/// the transaction to tell them apart.
async fn unit_claim_error(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    unit_id: Uuid,
) -> AppResult<AppError> {
    let existing = catalog::get_unit(&mut **tx, unit_id).await?;
    Ok(match existing {
        None => AppError::NotFound("Unit not found".to_string()),
        Some(_) => AppError::Conflict("Unit is not vacant".to_string()),
    })
}
