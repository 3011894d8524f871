use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub mod role {
    pub const ADMIN: &str = "admin";
    pub const LANDLORD: &str = "landlord";
    pub const TENANT: &str = "tenant";

    pub const ALL: &[&str] = &[ADMIN, LANDLORD, TENANT];
}

pub mod unit_status {
    pub const VACANT: &str = "vacant";
    pub const OCCUPIED: &str = "occupied";
    pub const MAINTENANCE: &str = "maintenance";
}

pub mod tenant_status {
    pub const ACTIVE: &str = "active";
    pub const LATE: &str = "late";
    pub const ENDING: &str = "ending";

    pub const ALL: &[&str] = &[ACTIVE, LATE, ENDING];
}

pub mod payment_status {
    pub const PENDING: &str = "pending";
    pub const COMPLETED: &str = "completed";
    pub const OVERDUE: &str = "overdue";

    pub const ALL: &[&str] = &[PENDING, COMPLETED, OVERDUE];
}

pub mod request_status {
    pub const PENDING: &str = "pending";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const COMPLETED: &str = "completed";

    pub const ALL: &[&str] = &[PENDING, IN_PROGRESS, COMPLETED];
}

pub mod request_priority {
    pub const HIGH: &str = "high";
    pub const MEDIUM: &str = "medium";
    pub const LOW: &str = "low";

    pub const ALL: &[&str] = &[HIGH, MEDIUM, LOW];
}

/// Full user row, hash included. Never serialized — responses go through
/// [`PublicUser`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    pub floor_id: Uuid,
    pub number: String,
    #[serde(rename = "type")]
    pub unit_type: String,
    pub status: String,
    pub rent: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub move_in_date: NaiveDate,
    pub lease_end: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: f64,
    pub status: String,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub due_date: NaiveDate,
    #[serde(rename = "date")]
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub date_reported: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// Response shapes: rows enriched with their surroundings, the way the SPA
// consumes them (tenant → unit → floor → property).

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorWithProperty {
    #[serde(flatten)]
    pub floor: Floor,
    pub property: Option<Property>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitWithContext {
    #[serde(flatten)]
    pub unit: Unit,
    pub floor: Option<FloorWithProperty>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantWithUnit {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub unit: Option<UnitWithContext>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithParties {
    #[serde(flatten)]
    pub payment: Payment,
    pub tenant: Option<Tenant>,
    pub unit: Option<Unit>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithContext {
    #[serde(flatten)]
    pub request: MaintenanceRequest,
    pub unit: Option<UnitWithContext>,
    pub tenant: Option<Tenant>,
}
