use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{unit_status, Floor, FloorWithProperty, Property, Unit, UnitWithContext};

pub async fn insert_property(
    executor: impl PgExecutor<'_>,
    name: &str,
    location: &str,
    property_type: &str,
    image: Option<&str>,
) -> AppResult<Property> {
    let property = sqlx::query_as::<_, Property>(
        "INSERT INTO properties (name, location, property_type, image)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(name)
    .bind(location)
    .bind(property_type)
    .bind(image)
    .fetch_one(executor)
    .await?;
    Ok(property)
}

pub async fn insert_floor(
    executor: impl PgExecutor<'_>,
    property_id: Uuid,
    name: &str,
) -> AppResult<Floor> {
    let floor = sqlx::query_as::<_, Floor>(
        "INSERT INTO floors (property_id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(property_id)
    .bind(name)
    .fetch_one(executor)
    .await?;
    Ok(floor)
}

pub async fn insert_unit(
    executor: impl PgExecutor<'_>,
    floor_id: Uuid,
    number: &str,
    unit_type: &str,
    status: &str,
    rent: f64,
) -> AppResult<Unit> {
    let unit = sqlx::query_as::<_, Unit>(
        "INSERT INTO units (floor_id, number, unit_type, status, rent)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(floor_id)
    .bind(number)
    .bind(unit_type)
    .bind(status)
    .bind(rent)
    .fetch_one(executor)
    .await?;
    Ok(unit)
}

pub async fn list_properties(executor: impl PgExecutor<'_>) -> AppResult<Vec<Property>> {
    let properties =
        sqlx::query_as::<_, Property>("SELECT * FROM properties ORDER BY created_at DESC")
            .fetch_all(executor)
            .await?;
    Ok(properties)
}

pub async fn floors_for_properties(
    executor: impl PgExecutor<'_>,
    property_ids: &[Uuid],
) -> AppResult<Vec<Floor>> {
    if property_ids.is_empty() {
        return Ok(Vec::new());
    }
    let floors = sqlx::query_as::<_, Floor>(
        "SELECT * FROM floors WHERE property_id = ANY($1) ORDER BY created_at ASC",
    )
    .bind(property_ids)
    .fetch_all(executor)
    .await?;
    Ok(floors)
}

pub async fn units_for_floors(
    executor: impl PgExecutor<'_>,
    floor_ids: &[Uuid],
) -> AppResult<Vec<Unit>> {
    if floor_ids.is_empty() {
        return Ok(Vec::new());
    }
    let units = sqlx::query_as::<_, Unit>(
        "SELECT * FROM units WHERE floor_id = ANY($1) ORDER BY number ASC",
    )
    .bind(floor_ids)
    .fetch_all(executor)
    .await?;
    Ok(units)
}

pub async fn get_unit(executor: impl PgExecutor<'_>, unit_id: Uuid) -> AppResult<Option<Unit>> {
    let unit = sqlx::query_as::<_, Unit>("SELECT * FROM units WHERE id = $1")
        .bind(unit_id)
        .fetch_optional(executor)
        .await?;
    Ok(unit)
}

pub async fn get_units(executor: impl PgExecutor<'_>, unit_ids: &[Uuid]) -> AppResult<Vec<Unit>> {
    if unit_ids.is_empty() {
        return Ok(Vec::new());
    }
    let units = sqlx::query_as::<_, Unit>("SELECT * FROM units WHERE id = ANY($1)")
        .bind(unit_ids)
        .fetch_all(executor)
        .await?;
    Ok(units)
}

pub async fn list_units(executor: impl PgExecutor<'_>) -> AppResult<Vec<Unit>> {
    let units = sqlx::query_as::<_, Unit>("SELECT * FROM units ORDER BY number ASC")
        .fetch_all(executor)
        .await?;
    Ok(units)
}

pub async fn list_vacant_units(executor: impl PgExecutor<'_>) -> AppResult<Vec<Unit>> {
    let units = sqlx::query_as::<_, Unit>(
        "SELECT * FROM units WHERE status = $1 ORDER BY number ASC",
    )
    .bind(unit_status::VACANT)
    .fetch_all(executor)
    .await?;
    Ok(units)
}

pub async fn get_floors(executor: impl PgExecutor<'_>, floor_ids: &[Uuid]) -> AppResult<Vec<Floor>> {
    if floor_ids.is_empty() {
        return Ok(Vec::new());
    }
    let floors = sqlx::query_as::<_, Floor>("SELECT * FROM floors WHERE id = ANY($1)")
        .bind(floor_ids)
        .fetch_all(executor)
        .await?;
    Ok(floors)
}

pub async fn get_properties(
    executor: impl PgExecutor<'_>,
    property_ids: &[Uuid],
) -> AppResult<Vec<Property>> {
    if property_ids.is_empty() {
        return Ok(Vec::new());
    }
    let properties = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ANY($1)")
        .bind(property_ids)
        .fetch_all(executor)
        .await?;
    Ok(properties)
}

/// Attach floor and property context to a batch of units: three queries
/// total, however many units.
pub async fn units_with_context(
    pool: &PgPool,
    units: Vec<Unit>,
) -> AppResult<Vec<UnitWithContext>> {
    let mut floor_ids: Vec<Uuid> = units.iter().map(|unit| unit.floor_id).collect();
    floor_ids.sort_unstable();
    floor_ids.dedup();

    let floors = get_floors(pool, &floor_ids).await?;
    let mut property_ids: Vec<Uuid> = floors.iter().map(|floor| floor.property_id).collect();
    property_ids.sort_unstable();
    property_ids.dedup();

    let properties = get_properties(pool, &property_ids).await?;
    let properties_by_id: HashMap<Uuid, Property> = properties
        .into_iter()
        .map(|property| (property.id, property))
        .collect();
    let floors_by_id: HashMap<Uuid, Floor> =
        floors.into_iter().map(|floor| (floor.id, floor)).collect();

    Ok(units
        .into_iter()
        .map(|unit| {
            let floor = floors_by_id.get(&unit.floor_id).cloned().map(|floor| {
                let property = properties_by_id.get(&floor.property_id).cloned();
                FloorWithProperty { floor, property }
            });
            UnitWithContext { unit, floor }
        })
        .collect())
}

/// Compare-and-swap claim: flips the unit to occupied only if it is vacant
/// right now. `None` means the unit is missing or the claim lost — callers
/// separate the two by re-reading the unit.
pub async fn claim_unit(executor: impl PgExecutor<'_>, unit_id: Uuid) -> AppResult<Option<Unit>> {
    let unit = sqlx::query_as::<_, Unit>(
        "UPDATE units SET status = $2 WHERE id = $1 AND status = $3 RETURNING *",
    )
    .bind(unit_id)
    .bind(unit_status::OCCUPIED)
    .bind(unit_status::VACANT)
    .fetch_optional(executor)
    .await?;
    Ok(unit)
}

/// Reverse of `claim_unit`. A unit moved to maintenance in the meantime is
/// left alone.
pub async fn release_unit(executor: impl PgExecutor<'_>, unit_id: Uuid) -> AppResult<bool> {
    let result = sqlx::query("UPDATE units SET status = $2 WHERE id = $1 AND status = $3")
        .bind(unit_id)
        .bind(unit_status::VACANT)
        .bind(unit_status::OCCUPIED)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
