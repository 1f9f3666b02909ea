use chrono::{DateTime, Utc};
use diesel::prelude::{AsChangeset, Identifiable, Insertable, Queryable};
use diesel::Selectable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Categories

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::categories)]
pub struct CreateCategoryEntity {
    pub name: String,
    pub description: Option<String>,
    pub slug: Option<String>,
}

#[derive(AsChangeset, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::categories)]
pub struct UpdateCategoryChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
}

// Menus

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::menus)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub photo_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub is_available: bool,
    pub stock_quantity: Option<i32>,
    pub low_stock_threshold: i32,
    pub auto_disable_on_stockout: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MenuEntity {
    /// Whether writing `new_stock` must force the item unavailable in the
    /// same update: tracked stock at or below zero with the
    /// auto-disable-on-stockout policy set.
    pub fn stockout_forces_disable(&self, new_stock: Option<i32>) -> bool {
        matches!(new_stock, Some(quantity) if quantity <= 0) && self.auto_disable_on_stockout
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::menus)]
pub struct CreateMenuEntity {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub photo_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub is_available: Option<bool>,
    pub stock_quantity: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub auto_disable_on_stockout: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Fields-to-change struct for `PATCH /menus/{id}`. Absent fields are left
/// untouched; stock and availability have dedicated endpoints with their own
/// side-effect rules.
#[derive(AsChangeset, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::menus)]
pub struct UpdateMenuChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub photo_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub low_stock_threshold: Option<i32>,
    pub auto_disable_on_stockout: Option<bool>,
    pub sort_order: Option<i32>,
}

// Variants

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::menu_variants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuVariantEntity {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: Option<i32>,
    pub is_available: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::menu_variants)]
pub struct CreateVariantEntity {
    pub menu_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: Option<i32>,
    pub is_available: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(AsChangeset, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::menu_variants)]
pub struct UpdateVariantChangeset {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub is_available: Option<bool>,
    pub sort_order: Option<i32>,
}

// Addons

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::menu_addons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuAddonEntity {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: Option<i32>,
    pub is_available: bool,
    pub sort_order: i32,
    pub is_required: bool,
    pub group_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::menu_addons)]
pub struct CreateAddonEntity {
    pub menu_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: Option<i32>,
    pub is_available: Option<bool>,
    pub sort_order: Option<i32>,
    pub is_required: Option<bool>,
    pub group_name: Option<String>,
}

#[derive(AsChangeset, Deserialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::menu_addons)]
pub struct UpdateAddonChangeset {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub is_available: Option<bool>,
    pub sort_order: Option<i32>,
    pub is_required: Option<bool>,
    pub group_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn menu(auto_disable: bool) -> MenuEntity {
        MenuEntity {
            id: Uuid::from_u128(1),
            name: "Pizza".to_string(),
            description: None,
            price: Decimal::new(1000, 2),
            photo_id: None,
            category_id: None,
            is_available: true,
            stock_quantity: Some(10),
            low_stock_threshold: 5,
            auto_disable_on_stockout: auto_disable,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn stock_hitting_zero_forces_disable_when_policy_is_set() {
        let item = menu(true);
        assert!(item.stockout_forces_disable(Some(0)));
        assert!(item.stockout_forces_disable(Some(-2)));
        assert!(!item.stockout_forces_disable(Some(1)));
        // Switching to untracked stock never disables.
        assert!(!item.stockout_forces_disable(None));
    }

    #[test]
    fn stockout_without_the_policy_leaves_availability_alone() {
        let item = menu(false);
        assert!(!item.stockout_forces_disable(Some(0)));
    }
}
