use chrono::{DateTime, Utc};
use diesel::prelude::{AsChangeset, Identifiable, Insertable, Queryable};
use diesel::Selectable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::delivery_zones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryZoneEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub delivery_fee: Decimal,
    pub minimum_order: Option<Decimal>,
    pub estimated_delivery_minutes: Option<i32>,
    /// Comma-separated postal codes covered by this zone.
    pub postal_codes: Option<String>,
    /// Comma-separated area names covered by this zone.
    pub area_names: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::delivery_zones)]
pub struct CreateDeliveryZoneEntity {
    pub name: String,
    pub description: Option<String>,
    pub delivery_fee: Decimal,
    pub minimum_order: Option<Decimal>,
    pub estimated_delivery_minutes: Option<i32>,
    pub postal_codes: Option<String>,
    pub area_names: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(AsChangeset, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::delivery_zones)]
pub struct UpdateDeliveryZoneChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub delivery_fee: Option<Decimal>,
    pub minimum_order: Option<Decimal>,
    pub estimated_delivery_minutes: Option<i32>,
    pub postal_codes: Option<String>,
    pub area_names: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}
