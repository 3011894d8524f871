use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

pub fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|errors| AppError::UnprocessableEntity(format!("Validation failed: {errors}")))
}

pub fn clamp_limit_in_range(limit: i64, minimum: i64, maximum: i64) -> i64 {
    limit.clamp(minimum, maximum)
}

fn default_limit_200() -> i64 {
    200
}
fn default_vacant() -> String {
    "vacant".to_string()
}
fn default_rent() -> f64 {
    0.0
}

// --- Auth ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[validate(length(min = 1, max = 255))]
    pub current_password: String,
    #[validate(length(min = 8, max = 255))]
    pub new_password: String,
}

// --- Users ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 255))]
    pub password: String,
    #[validate(length(min = 1, max = 32))]
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 255))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub role: Option<String>,
}

// --- Properties ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64))]
    pub property_type: String,
    pub image: Option<String>,
    #[validate(length(min = 1), nested)]
    pub floors: Vec<CreateFloorInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFloorInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub units: Vec<CreateUnitInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitInput {
    #[validate(length(min = 1, max = 32))]
    pub number: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64))]
    pub unit_type: String,
    #[serde(default = "default_vacant")]
    pub status: String,
    #[serde(default = "default_rent")]
    #[validate(range(min = 0.0))]
    pub rent: f64,
}

// --- Tenants ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    pub move_in_date: NaiveDate,
    pub lease_end: NaiveDate,
    pub unit_id: Uuid,
    #[validate(length(min = 8, max = 255))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub phone: Option<String>,
    pub move_in_date: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub status: Option<String>,
    pub unit_id: Option<Uuid>,
}

// --- Payments ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentInput {
    pub month: i32,
    pub year: i32,
    #[validate(length(min = 1, max = 64))]
    pub method: Option<String>,
    /// Staff may record on behalf of a tenant; tenants always pay as
    /// themselves.
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentInput {
    #[validate(length(min = 1, max = 32))]
    pub status: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub method: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub reference: Option<String>,
    pub date: Option<chrono::DateTime<chrono::Utc>>,
}

impl UpdatePaymentInput {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.method.is_none()
            && self.reference.is_none()
            && self.date.is_none()
    }
}

// --- Maintenance ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 4000))]
    pub description: String,
    #[validate(length(min = 1, max = 32))]
    pub priority: String,
    pub unit_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaintenanceInput {
    #[validate(length(min = 1, max = 4000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub status: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub priority: Option<String>,
}

// --- Queries ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantsQuery {
    #[serde(default = "default_limit_200")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsQuery {
    pub status: Option<String>,
    pub tenant_id: Option<Uuid>,
    #[serde(default = "default_limit_200")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default = "default_limit_200")]
    pub limit: i64,
}

// --- Paths ---

#[derive(Debug, Clone, Deserialize)]
pub struct UserPath {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantPath {
    pub tenant_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentPath {
    pub payment_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestPath {
    pub request_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::clamp_limit_in_range;

    #[test]
    fn clamps_limits() {
        assert_eq!(clamp_limit_in_range(0, 1, 500), 1);
        assert_eq!(clamp_limit_in_range(200, 1, 500), 200);
        assert_eq!(clamp_limit_in_range(9999, 1, 500), 500);
    }
}
