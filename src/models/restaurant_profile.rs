use chrono::{DateTime, Utc};
use diesel::prelude::{AsChangeset, Identifiable, Queryable};
use diesel::Selectable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// The application keeps exactly one profile row; it is seeded at startup.
/// Schedule columns stay as raw JSONB at the persistence boundary and are
/// parsed into the typed schedule structs by `opening_hours`.
#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::restaurant_profile)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RestaurantProfileEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub opening_hours: Value,
    pub social_links: Value,
    pub holiday_closures: Value,
    pub special_hours: Value,
    pub logo_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(AsChangeset, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::restaurant_profile)]
pub struct UpdateRestaurantProfileChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub opening_hours: Option<Value>,
    pub social_links: Option<Value>,
    pub logo_id: Option<Uuid>,
}
