use chrono::{DateTime, Utc};
use diesel::prelude::{AsChangeset, Identifiable, Queryable};
use diesel::Selectable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Singleton application settings row, seeded at startup. `tax_rate` is a
/// plain percentage applied to the order subtotal.
#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SettingEntity {
    pub id: Uuid,
    pub site_name: String,
    pub currency: String,
    pub currency_symbol: String,
    pub delivery_fee: Decimal,
    pub tax_rate: Decimal,
    pub minimum_order: Decimal,
    pub maintenance_mode: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(AsChangeset, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::settings)]
pub struct UpdateSettingChangeset {
    pub site_name: Option<String>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub delivery_fee: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub minimum_order: Option<Decimal>,
    pub maintenance_mode: Option<bool>,
}
