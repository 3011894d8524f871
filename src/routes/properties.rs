use axum::{
    extract::State,
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
    models::{role, unit_status, Floor, Property, Unit},
    repository::catalog,
    schemas::{validate_input, CreatePropertyInput},
    state::AppState,
};

const PROPERTY_EDIT_ROLES: &[&str] = &[role::LANDLORD, role::ADMIN];

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route(
        "/properties",
        axum::routing::get(list_properties).post(create_property),
    )
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FloorBlock {
    #[serde(flatten)]
    floor: Floor,
    units: Vec<Unit>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PropertyBlock {
    #[serde(flatten)]
    property: Property,
    floors: Vec<FloorBlock>,
}

async fn list_properties(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers)?;
    let pool = &state.db_pool;

    let properties = catalog::list_properties(pool).await?;
    let property_ids: Vec<Uuid> = properties.iter().map(|property| property.id).collect();
    let floors = catalog::floors_for_properties(pool, &property_ids).await?;
    let floor_ids: Vec<Uuid> = floors.iter().map(|floor| floor.id).collect();
    let units = catalog::units_for_floors(pool, &floor_ids).await?;

    let mut units_by_floor: HashMap<Uuid, Vec<Unit>> = HashMap::new();
    for unit in units {
        units_by_floor.entry(unit.floor_id).or_default().push(unit);
    }
    let mut floors_by_property: HashMap<Uuid, Vec<FloorBlock>> = HashMap::new();
    for floor in floors {
        let units = units_by_floor.remove(&floor.id).unwrap_or_default();
        floors_by_property
            .entry(floor.property_id)
            .or_default()
            .push(FloorBlock { floor, units });
    }

    let blocks: Vec<PropertyBlock> = properties
        .into_iter()
        .map(|property| {
            let floors = floors_by_property.remove(&property.id).unwrap_or_default();
            PropertyBlock { property, floors }
        })
        .collect();

    Ok(Json(json!({ "properties": blocks })))
}

/// Create a property together with its floors and units. One transaction:
/// a partially-built property never becomes visible.
async fn create_property(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePropertyInput>,
) -> AppResult<impl IntoResponse> {
    let claims = require_user(&state, &headers)?;
    require_role(&claims, PROPERTY_EDIT_ROLES)?;
    validate_input(&payload)?;
    for floor in &payload.floors {
        for unit in &floor.units {
            ensure_known_unit_status(&unit.status)?;
        }
    }

    let mut tx = state.db_pool.begin().await?;

    let property = catalog::insert_property(
        &mut *tx,
        payload.name.trim(),
        payload.location.trim(),
        payload.property_type.trim(),
        payload.image.as_deref(),
    )
    .await?;

    let mut floor_blocks = Vec::with_capacity(payload.floors.len());
    for floor_input in &payload.floors {
        let floor = catalog::insert_floor(&mut *tx, property.id, floor_input.name.trim()).await?;
        let mut units = Vec::with_capacity(floor_input.units.len());
        for unit_input in &floor_input.units {
            let unit = catalog::insert_unit(
                &mut *tx,
                floor.id,
                unit_input.number.trim(),
                unit_input.unit_type.trim(),
                &unit_input.status,
                unit_input.rent,
            )
            .await?;
            units.push(unit);
        }
        floor_blocks.push(FloorBlock { floor, units });
    }

    tx.commit().await?;

    tracing::info!(
        property_id = %property.id,
        floors = floor_blocks.len(),
        "Property created"
    );

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "property": PropertyBlock { property, floors: floor_blocks } })),
    ))
}

fn ensure_known_unit_status(candidate: &str) -> AppResult<()> {
    if [
        unit_status::VACANT,
        unit_status::OCCUPIED,
        unit_status::MAINTENANCE,
    ]
    .contains(&candidate)
    {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "Unknown unit status '{candidate}'."
    )))
}

#[cfg(test)]
mod tests {
    use super::ensure_known_unit_status;

    #[test]
    fn accepts_known_unit_statuses_only() {
        assert!(ensure_known_unit_status("vacant").is_ok());
        assert!(ensure_known_unit_status("occupied").is_ok());
        assert!(ensure_known_unit_status("maintenance").is_ok());
        assert!(ensure_known_unit_status("condemned").is_err());
    }
}
