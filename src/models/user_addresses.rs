use chrono::{DateTime, Utc};
use diesel::prelude::{AsChangeset, Identifiable, Insertable, Queryable};
use diesel::Selectable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::user_addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserAddressEntity {
    pub id: Uuid,
    pub user_id: i32,
    pub label: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub instructions: Option<String>,
    pub is_default: bool,
    pub delivery_zone_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::user_addresses)]
pub struct CreateUserAddressEntity {
    pub user_id: i32,
    pub label: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub instructions: Option<String>,
    pub is_default: Option<bool>,
    pub delivery_zone_id: Option<Uuid>,
}

#[derive(AsChangeset, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::user_addresses)]
pub struct UpdateUserAddressChangeset {
    pub label: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub instructions: Option<String>,
    pub is_default: Option<bool>,
}
