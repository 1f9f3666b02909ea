use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::app_error::AppError;
use crate::models::catalog::{MenuAddonEntity, MenuEntity, MenuVariantEntity};

/// One line of a checkout request.
#[derive(Deserialize, Debug, ToSchema)]
pub struct RequestedItem {
    pub menu_item_id: Uuid,
    #[serde(default)]
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
    #[serde(default)]
    pub addons: Vec<RequestedAddon>,
    #[serde(default)]
    pub item_notes: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RequestedAddon {
    pub addon_id: Uuid,
    #[serde(default = "default_addon_quantity")]
    pub quantity: i32,
}

fn default_addon_quantity() -> i32 {
    1
}

/// A menu item with its owned variants and addons, as loaded for pricing.
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub menu: MenuEntity,
    pub variants: Vec<MenuVariantEntity>,
    pub addons: Vec<MenuAddonEntity>,
}

/// Groups flat variant/addon result sets under their parent menu item.
pub fn build_catalog(
    menus: Vec<MenuEntity>,
    variants: Vec<MenuVariantEntity>,
    addons: Vec<MenuAddonEntity>,
) -> HashMap<Uuid, CatalogItem> {
    let mut catalog: HashMap<Uuid, CatalogItem> = menus
        .into_iter()
        .map(|menu| {
            (
                menu.id,
                CatalogItem {
                    menu,
                    variants: Vec::new(),
                    addons: Vec::new(),
                },
            )
        })
        .collect();
    for variant in variants {
        if let Some(item) = catalog.get_mut(&variant.menu_id) {
            item.variants.push(variant);
        }
    }
    for addon in addons {
        if let Some(item) = catalog.get_mut(&addon.menu_id) {
            item.addons.push(addon);
        }
    }
    catalog
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct VariantSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct AddonSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

/// One fully priced line, carrying everything the order item snapshot needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub variant: Option<VariantSnapshot>,
    pub selected_addons: Vec<AddonSnapshot>,
    pub addons_total: Decimal,
    pub item_total: Decimal,
    pub item_notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub items: Vec<PricedItem>,
    pub subtotal: Decimal,
}

/// Resolves authoritative prices for a requested item list against the loaded
/// catalog and assembles the immutable line-item snapshots. Fails as a whole:
/// no partial result ever reaches persistence.
///
/// Stock is only checked here, never decremented; inventory adjustments are
/// an explicit staff operation on the catalog.
pub fn price_items(
    requested: &[RequestedItem],
    catalog: &HashMap<Uuid, CatalogItem>,
) -> Result<PricedOrder, AppError> {
    if requested.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one item".to_string(),
        ));
    }

    let mut items = Vec::with_capacity(requested.len());
    let mut subtotal = Decimal::ZERO;

    for line in requested {
        if line.quantity < 1 {
            return Err(AppError::BadRequest(
                "Item quantity must be at least 1".to_string(),
            ));
        }

        let item = catalog.get(&line.menu_item_id).ok_or(AppError::NotFound)?;
        if !item.menu.is_available {
            return Err(AppError::Unavailable(format!(
                "'{}' is currently unavailable",
                item.menu.name
            )));
        }
        if let Some(stock) = item.menu.stock_quantity {
            if line.quantity > stock {
                return Err(AppError::OutOfStock(format!(
                    "Only {} of '{}' left in stock",
                    stock.max(0),
                    item.menu.name
                )));
            }
        }

        let variant = match line.variant_id {
            Some(variant_id) => {
                let variant = item
                    .variants
                    .iter()
                    .find(|variant| variant.id == variant_id)
                    .ok_or_else(|| {
                        AppError::InvalidSelection(format!(
                            "Variant does not belong to '{}'",
                            item.menu.name
                        ))
                    })?;
                if !variant.is_available {
                    return Err(AppError::Unavailable(format!(
                        "Variant '{}' of '{}' is currently unavailable",
                        variant.name, item.menu.name
                    )));
                }
                if let Some(stock) = variant.stock_quantity {
                    if line.quantity > stock {
                        return Err(AppError::OutOfStock(format!(
                            "Only {} of '{} {}' left in stock",
                            stock.max(0),
                            item.menu.name,
                            variant.name
                        )));
                    }
                }
                Some(VariantSnapshot {
                    id: variant.id,
                    name: variant.name.clone(),
                    price: variant.price,
                })
            }
            None => None,
        };

        // Variant price replaces the base price, it does not add to it.
        let unit_price = variant
            .as_ref()
            .map(|variant| variant.price)
            .unwrap_or(item.menu.price);

        let mut selected_addons = Vec::with_capacity(line.addons.len());
        let mut addons_total = Decimal::ZERO;
        for selection in &line.addons {
            if selection.quantity < 1 {
                return Err(AppError::BadRequest(
                    "Addon quantity must be at least 1".to_string(),
                ));
            }
            let addon = item
                .addons
                .iter()
                .find(|addon| addon.id == selection.addon_id)
                .ok_or_else(|| {
                    AppError::InvalidSelection(format!(
                        "Addon does not belong to '{}'",
                        item.menu.name
                    ))
                })?;
            if !addon.is_available {
                return Err(AppError::Unavailable(format!(
                    "Addon '{}' of '{}' is currently unavailable",
                    addon.name, item.menu.name
                )));
            }
            addons_total += addon.price * Decimal::from(selection.quantity);
            selected_addons.push(AddonSnapshot {
                id: addon.id,
                name: addon.name.clone(),
                price: addon.price,
                quantity: selection.quantity,
            });
        }

        let item_total = (unit_price + addons_total) * Decimal::from(line.quantity);
        subtotal += item_total;

        items.push(PricedItem {
            menu_item_id: item.menu.id,
            quantity: line.quantity,
            unit_price,
            variant,
            selected_addons,
            addons_total,
            item_total,
            item_notes: line.item_notes.clone(),
        });
    }

    Ok(PricedOrder { items, subtotal })
}

/// Tax from the settings-configured percentage, rounded to cents.
pub fn compute_tax(subtotal: Decimal, tax_rate_percent: Decimal) -> Decimal {
    (subtotal * tax_rate_percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn menu(name: &str, price: &str) -> MenuEntity {
        MenuEntity {
            id: Uuid::from_u128(name.len() as u128 + 1),
            name: name.to_string(),
            description: None,
            price: d(price),
            photo_id: None,
            category_id: None,
            is_available: true,
            stock_quantity: None,
            low_stock_threshold: 5,
            auto_disable_on_stockout: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn variant(menu: &MenuEntity, name: &str, price: &str) -> MenuVariantEntity {
        MenuVariantEntity {
            id: Uuid::from_u128(0x1000 + name.len() as u128),
            menu_id: menu.id,
            name: name.to_string(),
            price: d(price),
            stock_quantity: None,
            is_available: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn addon(menu: &MenuEntity, name: &str, price: &str) -> MenuAddonEntity {
        MenuAddonEntity {
            id: Uuid::from_u128(0x2000 + name.len() as u128),
            menu_id: menu.id,
            name: name.to_string(),
            price: d(price),
            stock_quantity: None,
            is_available: true,
            sort_order: 0,
            is_required: false,
            group_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(menu_id: Uuid, quantity: i32) -> RequestedItem {
        RequestedItem {
            menu_item_id: menu_id,
            variant_id: None,
            quantity,
            addons: Vec::new(),
            item_notes: None,
        }
    }

    #[test]
    fn plain_item_subtotal_is_price_times_quantity() {
        let pizza = menu("Pizza", "10.00");
        let catalog = build_catalog(vec![pizza.clone()], vec![], vec![]);
        let priced = price_items(&[request(pizza.id, 2)], &catalog).unwrap();
        assert_eq!(priced.subtotal, d("20.00"));
        assert_eq!(priced.items[0].unit_price, d("10.00"));
        assert!(priced.items[0].variant.is_none());
    }

    #[test]
    fn addons_are_priced_per_unit_before_the_quantity_multiplier() {
        let pizza = menu("Pizza", "10.00");
        let olives = addon(&pizza, "Olives", "1.50");
        let catalog = build_catalog(vec![pizza.clone()], vec![], vec![olives.clone()]);
        let mut line = request(pizza.id, 2);
        line.addons.push(RequestedAddon {
            addon_id: olives.id,
            quantity: 1,
        });
        let priced = price_items(&[line], &catalog).unwrap();
        // (10.00 + 1.50) * 2
        assert_eq!(priced.items[0].addons_total, d("1.50"));
        assert_eq!(priced.items[0].item_total, d("23.00"));
        assert_eq!(priced.subtotal, d("23.00"));
    }

    #[test]
    fn variant_price_replaces_the_base_price() {
        let burger = menu("Burger", "8.00");
        let large = variant(&burger, "Large", "10.00");
        let cheese = addon(&burger, "Cheese", "1.00");
        let catalog = build_catalog(
            vec![burger.clone()],
            vec![large.clone()],
            vec![cheese.clone()],
        );
        let line = RequestedItem {
            menu_item_id: burger.id,
            variant_id: Some(large.id),
            quantity: 1,
            addons: vec![RequestedAddon {
                addon_id: cheese.id,
                quantity: 1,
            }],
            item_notes: None,
        };
        let priced = price_items(&[line], &catalog).unwrap();
        let item = &priced.items[0];
        assert_eq!(item.unit_price, d("10.00"));
        assert_eq!(item.addons_total, d("1.00"));
        assert_eq!(item.item_total, d("11.00"));
        assert_eq!(item.variant.as_ref().unwrap().name, "Large");
        // With a 5% tax rate and no delivery the grand total lands on 11.55.
        let tax = compute_tax(priced.subtotal, d("5"));
        assert_eq!(tax, d("0.55"));
        assert_eq!(priced.subtotal + tax, d("11.55"));
    }

    #[test]
    fn snapshots_keep_the_selected_addon_details() {
        let pizza = menu("Pizza", "10.00");
        let olives = addon(&pizza, "Olives", "1.50");
        let catalog = build_catalog(vec![pizza.clone()], vec![], vec![olives.clone()]);
        let mut line = request(pizza.id, 1);
        line.addons.push(RequestedAddon {
            addon_id: olives.id,
            quantity: 2,
        });
        let priced = price_items(&[line], &catalog).unwrap();
        assert_eq!(
            priced.items[0].selected_addons,
            vec![AddonSnapshot {
                id: olives.id,
                name: "Olives".to_string(),
                price: d("1.50"),
                quantity: 2,
            }]
        );
        assert_eq!(priced.items[0].addons_total, d("3.00"));
    }

    #[test]
    fn unknown_menu_item_fails_not_found() {
        let catalog = build_catalog(vec![], vec![], vec![]);
        let err = price_items(&[request(Uuid::from_u128(99), 1)], &catalog).unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn disabled_item_fails_unavailable() {
        let mut pizza = menu("Pizza", "10.00");
        pizza.is_available = false;
        let id = pizza.id;
        let catalog = build_catalog(vec![pizza], vec![], vec![]);
        let err = price_items(&[request(id, 1)], &catalog).unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[test]
    fn tracked_stock_bounds_the_requested_quantity() {
        let mut pizza = menu("Pizza", "10.00");
        pizza.stock_quantity = Some(3);
        let id = pizza.id;
        let catalog = build_catalog(vec![pizza], vec![], vec![]);
        assert!(price_items(&[request(id, 3)], &catalog).is_ok());
        let err = price_items(&[request(id, 4)], &catalog).unwrap_err();
        assert!(matches!(err, AppError::OutOfStock(_)));
    }

    #[test]
    fn variant_stock_is_checked_when_a_variant_is_selected() {
        let burger = menu("Burger", "8.00");
        let mut large = variant(&burger, "Large", "10.00");
        large.stock_quantity = Some(1);
        let catalog = build_catalog(vec![burger.clone()], vec![large.clone()], vec![]);
        let line = RequestedItem {
            menu_item_id: burger.id,
            variant_id: Some(large.id),
            quantity: 2,
            addons: Vec::new(),
            item_notes: None,
        };
        let err = price_items(&[line], &catalog).unwrap_err();
        assert!(matches!(err, AppError::OutOfStock(_)));
    }

    #[test]
    fn foreign_variant_or_addon_fails_invalid_selection() {
        let burger = menu("Burger", "8.00");
        let pizza = menu("Pizza Margherita", "10.00");
        let pizza_large = variant(&pizza, "Large", "14.00");
        let pizza_olives = addon(&pizza, "Olives", "1.50");
        let catalog = build_catalog(
            vec![burger.clone(), pizza],
            vec![pizza_large.clone()],
            vec![pizza_olives.clone()],
        );

        let foreign_variant = RequestedItem {
            menu_item_id: burger.id,
            variant_id: Some(pizza_large.id),
            quantity: 1,
            addons: Vec::new(),
            item_notes: None,
        };
        assert!(matches!(
            price_items(&[foreign_variant], &catalog).unwrap_err(),
            AppError::InvalidSelection(_)
        ));

        let mut foreign_addon = request(burger.id, 1);
        foreign_addon.addons.push(RequestedAddon {
            addon_id: pizza_olives.id,
            quantity: 1,
        });
        assert!(matches!(
            price_items(&[foreign_addon], &catalog).unwrap_err(),
            AppError::InvalidSelection(_)
        ));
    }

    #[test]
    fn zero_or_negative_quantities_are_rejected() {
        let pizza = menu("Pizza", "10.00");
        let id = pizza.id;
        let catalog = build_catalog(vec![pizza], vec![], vec![]);
        assert!(matches!(
            price_items(&[request(id, 0)], &catalog).unwrap_err(),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            price_items(&[], &catalog).unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn multi_line_orders_sum_into_the_subtotal() {
        let pizza = menu("Pizza", "10.00");
        let salad = menu("Garden Salad", "4.25");
        let catalog = build_catalog(vec![pizza.clone(), salad.clone()], vec![], vec![]);
        let priced =
            price_items(&[request(pizza.id, 1), request(salad.id, 2)], &catalog).unwrap();
        assert_eq!(priced.subtotal, d("18.50"));
    }

    #[test]
    fn tax_rounds_half_up_to_cents() {
        assert_eq!(compute_tax(d("10.00"), d("0")), d("0.00"));
        assert_eq!(compute_tax(d("11.00"), d("5")), d("0.55"));
        // 7.125% of 9.99 = 0.71178...
        assert_eq!(compute_tax(d("9.99"), d("7.125")), d("0.71"));
        // exact midpoint rounds away from zero
        assert_eq!(compute_tax(d("10.00"), d("7.25")), d("0.73"));
    }
}
