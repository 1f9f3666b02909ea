use chrono::{DateTime, Utc};
use diesel::prelude::{Identifiable, Insertable, Queryable};
use diesel::Selectable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::user_addresses::UserAddressEntity;
use crate::order_status::OrderStatus;

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: Uuid,
    pub user_id: Option<i32>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
    pub special_instructions: Option<String>,
    pub delivery_address_id: Option<Uuid>,
    pub delivery_zone_id: Option<Uuid>,
    pub delivery_address_snapshot: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
pub struct CreateOrderEntity {
    pub user_id: Option<i32>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
    pub special_instructions: Option<String>,
    pub delivery_address_id: Option<Uuid>,
    pub delivery_zone_id: Option<Uuid>,
    pub delivery_address_snapshot: Option<Value>,
}

/// Line-item snapshot. Rows are written once at order creation and never
/// updated; later catalog edits must not change what the customer was charged.
#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemEntity {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    /// Resolved unit price (variant price when one was selected, base
    /// price otherwise) at the time of order.
    pub price: Decimal,
    pub variant_id: Option<Uuid>,
    pub variant_name: Option<String>,
    pub variant_price: Option<Decimal>,
    pub selected_addons: Option<Value>,
    pub addons_total: Decimal,
    pub item_total: Decimal,
    pub item_notes: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::order_items)]
pub struct CreateOrderItemEntity {
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub variant_id: Option<Uuid>,
    pub variant_name: Option<String>,
    pub variant_price: Option<Decimal>,
    pub selected_addons: Option<Value>,
    pub addons_total: Decimal,
    pub item_total: Decimal,
    pub item_notes: Option<String>,
}

/// Denormalized copy of the delivery address stored on the order, so the
/// order keeps its destination even if the live address is edited or deleted.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct AddressSnapshot {
    pub label: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: Option<String>,
    pub instructions: Option<String>,
}

impl From<&UserAddressEntity> for AddressSnapshot {
    fn from(address: &UserAddressEntity) -> Self {
        Self {
            label: address.label.clone(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            instructions: address.instructions.clone(),
        }
    }
}
