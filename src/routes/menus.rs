use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::{
    ExpressionMethods, NullableExpressionMethods, QueryDsl, QueryResult, SelectableHelper,
};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::core::aliases::DieselError;
use crate::core::app_error::{AppError, StdResponse};
use crate::core::app_state::AppState;
use crate::core::middleware;
use crate::models::catalog::{
    CreateAddonEntity, CreateMenuEntity, CreateVariantEntity, MenuAddonEntity, MenuEntity,
    MenuVariantEntity, UpdateAddonChangeset, UpdateMenuChangeset, UpdateVariantChangeset,
};
use crate::routes::SuccessRes;
use crate::schema::{menu_addons, menu_variants, menus};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    let public = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_menus))
        .routes(utoipa_axum::routes!(get_available_menus))
        .routes(utoipa_axum::routes!(get_menu))
        .routes(utoipa_axum::routes!(get_variants))
        .routes(utoipa_axum::routes!(get_addons));
    let staff = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(create_menu))
        .routes(utoipa_axum::routes!(get_low_stock_menus))
        .routes(utoipa_axum::routes!(reorder_menus))
        .routes(utoipa_axum::routes!(update_menu, delete_menu))
        .routes(utoipa_axum::routes!(update_menu_availability))
        .routes(utoipa_axum::routes!(update_menu_stock))
        .routes(utoipa_axum::routes!(create_variant))
        .routes(utoipa_axum::routes!(update_variant, delete_variant))
        .routes(utoipa_axum::routes!(create_addon))
        .routes(utoipa_axum::routes!(update_addon, delete_addon))
        .route_layer(axum::middleware::from_fn(middleware::user_authorization));
    OpenApiRouter::new().nest("/menus", public.merge(staff))
}

#[derive(Serialize, ToSchema)]
pub struct MenuRes {
    pub menu: MenuEntity,
    pub variants: Vec<MenuVariantEntity>,
    pub addons: Vec<MenuAddonEntity>,
}

/// Loads variants and addons for a page of menu items and groups them under
/// their parent.
async fn attach_relations(
    conn: &mut AsyncPgConnection,
    menus_list: Vec<MenuEntity>,
) -> Result<Vec<MenuRes>, AppError> {
    let menu_ids: Vec<Uuid> = menus_list.iter().map(|menu| menu.id).collect();

    let variants: Vec<MenuVariantEntity> = menu_variants::table
        .filter(menu_variants::menu_id.eq_any(&menu_ids))
        .order((
            menu_variants::sort_order.asc(),
            menu_variants::created_at.asc(),
        ))
        .get_results(conn)
        .await
        .context("Failed to get variants")?;

    let addons: Vec<MenuAddonEntity> = menu_addons::table
        .filter(menu_addons::menu_id.eq_any(&menu_ids))
        .order((
            menu_addons::group_name.asc(),
            menu_addons::sort_order.asc(),
            menu_addons::created_at.asc(),
        ))
        .get_results(conn)
        .await
        .context("Failed to get addons")?;

    let mut variant_group: HashMap<Uuid, Vec<MenuVariantEntity>> = HashMap::new();
    for variant in variants {
        variant_group.entry(variant.menu_id).or_default().push(variant);
    }
    let mut addon_group: HashMap<Uuid, Vec<MenuAddonEntity>> = HashMap::new();
    for addon in addons {
        addon_group.entry(addon.menu_id).or_default().push(addon);
    }

    Ok(menus_list
        .into_iter()
        .map(|menu| MenuRes {
            variants: variant_group.remove(&menu.id).unwrap_or_default(),
            addons: addon_group.remove(&menu.id).unwrap_or_default(),
            menu,
        })
        .collect())
}

async fn menu_exists(conn: &mut AsyncPgConnection, menu_id: Uuid) -> Result<bool, AppError> {
    let count: i64 = menus::table
        .find(menu_id)
        .filter(menus::deleted_at.is_null())
        .count()
        .get_result(conn)
        .await
        .context("Failed to check menu item")?;
    Ok(count > 0)
}

/// List all menu items (public).
#[utoipa::path(
    get,
    path = "/",
    tags = ["Menus"],
    responses(
        (status = 200, description = "List all menu items", body = StdResponse<Vec<MenuRes>, String>)
    )
)]
async fn get_menus(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let menus_list: Vec<MenuEntity> = menus::table
        .filter(menus::deleted_at.is_null())
        .order((menus::sort_order.asc(), menus::created_at.desc()))
        .get_results(conn)
        .await
        .context("Failed to get menu items")?;

    let data = attach_relations(conn, menus_list).await?;

    Ok(StdResponse {
        data: Some(data),
        message: Some("Get menu items successfully"),
    })
}

/// List only available menu items (public).
#[utoipa::path(
    get,
    path = "/available",
    tags = ["Menus"],
    responses(
        (status = 200, description = "List available menu items", body = StdResponse<Vec<MenuRes>, String>)
    )
)]
async fn get_available_menus(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let menus_list: Vec<MenuEntity> = menus::table
        .filter(menus::deleted_at.is_null())
        .filter(menus::is_available.eq(true))
        .order((menus::sort_order.asc(), menus::created_at.desc()))
        .get_results(conn)
        .await
        .context("Failed to get menu items")?;

    let data = attach_relations(conn, menus_list).await?;

    Ok(StdResponse {
        data: Some(data),
        message: Some("Get available menu items successfully"),
    })
}

/// Items whose tracked stock is at or below their low-stock threshold,
/// lowest remaining stock first.
#[utoipa::path(
    get,
    path = "/low-stock",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List low-stock menu items", body = StdResponse<Vec<MenuEntity>, String>)
    )
)]
async fn get_low_stock_menus(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let items: Vec<MenuEntity> = menus::table
        .filter(menus::deleted_at.is_null())
        .filter(menus::stock_quantity.is_not_null())
        .filter(menus::stock_quantity.le(menus::low_stock_threshold.nullable()))
        .order(menus::stock_quantity.asc())
        .get_results(conn)
        .await
        .context("Failed to get low-stock menu items")?;

    Ok(StdResponse {
        data: Some(items),
        message: Some("Get low-stock menu items successfully"),
    })
}

#[derive(Deserialize, Debug, ToSchema)]
struct CreateVariantReq {
    name: String,
    price: Decimal,
    stock_quantity: Option<i32>,
    is_available: Option<bool>,
    sort_order: Option<i32>,
}

#[derive(Deserialize, Debug, ToSchema)]
struct CreateAddonReq {
    name: String,
    price: Decimal,
    stock_quantity: Option<i32>,
    is_available: Option<bool>,
    sort_order: Option<i32>,
    is_required: Option<bool>,
    group_name: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
struct CreateMenuReq {
    name: String,
    description: Option<String>,
    price: Decimal,
    photo_id: Option<Uuid>,
    category_id: Option<Uuid>,
    is_available: Option<bool>,
    stock_quantity: Option<i32>,
    low_stock_threshold: Option<i32>,
    auto_disable_on_stockout: Option<bool>,
    sort_order: Option<i32>,
    #[serde(default)]
    variants: Vec<CreateVariantReq>,
    #[serde(default)]
    addons: Vec<CreateAddonReq>,
}

/// Create a menu item, optionally together with its variants and addons.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    request_body = CreateMenuReq,
    responses(
        (status = 200, description = "Created menu item successfully", body = StdResponse<MenuRes, String>)
    )
)]
async fn create_menu(
    State(state): State<AppState>,
    Json(body): Json<CreateMenuReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let data = conn
        .transaction(move |conn| {
            Box::pin(async move {
                let menu: MenuEntity = diesel::insert_into(menus::table)
                    .values(CreateMenuEntity {
                        name: body.name,
                        description: body.description,
                        price: body.price,
                        photo_id: body.photo_id,
                        category_id: body.category_id,
                        is_available: body.is_available,
                        stock_quantity: body.stock_quantity,
                        low_stock_threshold: body.low_stock_threshold,
                        auto_disable_on_stockout: body.auto_disable_on_stockout,
                        sort_order: body.sort_order,
                    })
                    .returning(MenuEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to create menu item")?;

                let variant_rows: Vec<CreateVariantEntity> = body
                    .variants
                    .into_iter()
                    .map(|variant| CreateVariantEntity {
                        menu_id: menu.id,
                        name: variant.name,
                        price: variant.price,
                        stock_quantity: variant.stock_quantity,
                        is_available: variant.is_available,
                        sort_order: variant.sort_order,
                    })
                    .collect();
                let variants: Vec<MenuVariantEntity> = diesel::insert_into(menu_variants::table)
                    .values(variant_rows)
                    .returning(MenuVariantEntity::as_returning())
                    .get_results(conn)
                    .await
                    .context("Failed to create variants")?;

                let addon_rows: Vec<CreateAddonEntity> = body
                    .addons
                    .into_iter()
                    .map(|addon| CreateAddonEntity {
                        menu_id: menu.id,
                        name: addon.name,
                        price: addon.price,
                        stock_quantity: addon.stock_quantity,
                        is_available: addon.is_available,
                        sort_order: addon.sort_order,
                        is_required: addon.is_required,
                        group_name: addon.group_name,
                    })
                    .collect();
                let addons: Vec<MenuAddonEntity> = diesel::insert_into(menu_addons::table)
                    .values(addon_rows)
                    .returning(MenuAddonEntity::as_returning())
                    .get_results(conn)
                    .await
                    .context("Failed to create addons")?;

                Ok::<MenuRes, anyhow::Error>(MenuRes {
                    menu,
                    variants,
                    addons,
                })
            })
        })
        .await
        .context("Transaction failed")?;

    Ok(StdResponse {
        data: Some(data),
        message: Some("Created menu item successfully"),
    })
}

/// Fetch a menu item with its variants and addons (public).
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["Menus"],
    params(
        ("id" = Uuid, Path, description = "Menu item ID to fetch")
    ),
    responses(
        (status = 200, description = "Get menu item successfully", body = StdResponse<MenuRes, String>)
    )
)]
async fn get_menu(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let menu: QueryResult<MenuEntity> = menus::table
        .find(id)
        .filter(menus::deleted_at.is_null())
        .get_result(conn)
        .await;

    if let Err(err) = menu {
        match err {
            DieselError::NotFound => return Err(AppError::NotFound),
            _ => return Err(AppError::Other(err.into())),
        }
    }

    let menu = menu.unwrap();
    let mut data = attach_relations(conn, vec![menu]).await?;

    Ok(StdResponse {
        data: data.pop(),
        message: Some("Get menu item successfully"),
    })
}

/// Update a menu item.
#[utoipa::path(
    patch,
    path = "/{id}",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Menu item ID to update")
    ),
    request_body = UpdateMenuChangeset,
    responses(
        (status = 200, description = "Updated menu item successfully", body = StdResponse<MenuEntity, String>)
    )
)]
async fn update_menu(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(changeset): Json<UpdateMenuChangeset>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let menu: MenuEntity =
        diesel::update(menus::table.find(id).filter(menus::deleted_at.is_null()))
            .set((changeset, menus::updated_at.eq(diesel::dsl::now)))
            .returning(MenuEntity::as_returning())
            .get_result(conn)
            .await
            .map_err(AppError::from)?;

    Ok(StdResponse {
        data: Some(menu),
        message: Some("Updated menu item successfully"),
    })
}

/// Soft-delete a menu item. Historical order items keep referencing it.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Menu item ID to delete")
    ),
    responses(
        (status = 200, description = "Deleted menu item successfully", body = StdResponse<MenuEntity, String>)
    )
)]
async fn delete_menu(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let menu: MenuEntity =
        diesel::update(menus::table.find(id).filter(menus::deleted_at.is_null()))
            .set(menus::deleted_at.eq(diesel::dsl::now))
            .returning(MenuEntity::as_returning())
            .get_result(conn)
            .await
            .map_err(AppError::from)?;

    Ok(StdResponse {
        data: Some(menu),
        message: Some("Deleted menu item successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct UpdateAvailabilityReq {
    is_available: bool,
}

/// Toggle a menu item's availability.
#[utoipa::path(
    patch,
    path = "/{id}/availability",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Menu item ID to update")
    ),
    request_body = UpdateAvailabilityReq,
    responses(
        (status = 200, description = "Updated availability successfully", body = StdResponse<MenuEntity, String>)
    )
)]
async fn update_menu_availability(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<UpdateAvailabilityReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let menu: MenuEntity =
        diesel::update(menus::table.find(id).filter(menus::deleted_at.is_null()))
            .set((
                menus::is_available.eq(body.is_available),
                menus::updated_at.eq(diesel::dsl::now),
            ))
            .returning(MenuEntity::as_returning())
            .get_result(conn)
            .await
            .map_err(AppError::from)?;

    Ok(StdResponse {
        data: Some(menu),
        message: Some("Updated availability successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct UpdateStockReq {
    /// New tracked quantity; null switches the item back to untracked stock.
    stock_quantity: Option<i32>,
}

/// Set a menu item's stock quantity. Stock reaching zero force-disables the
/// item in the same update when `auto_disable_on_stockout` is set.
#[utoipa::path(
    patch,
    path = "/{id}/stock",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Menu item ID to update")
    ),
    request_body = UpdateStockReq,
    responses(
        (status = 200, description = "Updated stock successfully", body = StdResponse<MenuEntity, String>)
    )
)]
async fn update_menu_stock(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<UpdateStockReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let menu: MenuEntity = menus::table
        .find(id)
        .filter(menus::deleted_at.is_null())
        .get_result(conn)
        .await
        .map_err(AppError::from)?;

    let updated: MenuEntity = if menu.stockout_forces_disable(body.stock_quantity) {
        diesel::update(menus::table.find(id))
            .set((
                menus::stock_quantity.eq(body.stock_quantity),
                menus::is_available.eq(false),
                menus::updated_at.eq(diesel::dsl::now),
            ))
            .returning(MenuEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to update stock")?
    } else {
        diesel::update(menus::table.find(id))
            .set((
                menus::stock_quantity.eq(body.stock_quantity),
                menus::updated_at.eq(diesel::dsl::now),
            ))
            .returning(MenuEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to update stock")?
    };

    Ok(StdResponse {
        data: Some(updated),
        message: Some("Updated stock successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct ReorderItem {
    id: Uuid,
    sort_order: i32,
}

#[derive(Deserialize, ToSchema)]
struct ReorderReq {
    items: Vec<ReorderItem>,
}

/// Update sort order for multiple menu items.
#[utoipa::path(
    patch,
    path = "/reorder",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    request_body = ReorderReq,
    responses(
        (status = 200, description = "Updated sort order successfully", body = StdResponse<SuccessRes, String>)
    )
)]
async fn reorder_menus(
    State(state): State<AppState>,
    Json(body): Json<ReorderReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    for item in &body.items {
        diesel::update(menus::table.find(item.id))
            .set((
                menus::sort_order.eq(item.sort_order),
                menus::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await
            .context("Failed to update sort order")?;
    }

    Ok(StdResponse {
        data: Some(SuccessRes { success: true }),
        message: Some("Updated sort order successfully"),
    })
}

// ==================== Variants ====================

/// List a menu item's variants (public).
#[utoipa::path(
    get,
    path = "/{id}/variants",
    tags = ["Menus"],
    params(
        ("id" = Uuid, Path, description = "Parent menu item ID")
    ),
    responses(
        (status = 200, description = "List variants", body = StdResponse<Vec<MenuVariantEntity>, String>)
    )
)]
async fn get_variants(
    Path(menu_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let variants: Vec<MenuVariantEntity> = menu_variants::table
        .filter(menu_variants::menu_id.eq(menu_id))
        .order((
            menu_variants::sort_order.asc(),
            menu_variants::created_at.asc(),
        ))
        .get_results(conn)
        .await
        .context("Failed to get variants")?;

    Ok(StdResponse {
        data: Some(variants),
        message: Some("Get variants successfully"),
    })
}

/// Create a variant under a menu item.
#[utoipa::path(
    post,
    path = "/{id}/variants",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Parent menu item ID")
    ),
    request_body = CreateVariantReq,
    responses(
        (status = 200, description = "Created variant successfully", body = StdResponse<MenuVariantEntity, String>)
    )
)]
async fn create_variant(
    Path(menu_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<CreateVariantReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    if !menu_exists(conn, menu_id).await? {
        return Err(AppError::NotFound);
    }

    let variant: MenuVariantEntity = diesel::insert_into(menu_variants::table)
        .values(CreateVariantEntity {
            menu_id,
            name: body.name,
            price: body.price,
            stock_quantity: body.stock_quantity,
            is_available: body.is_available,
            sort_order: body.sort_order,
        })
        .returning(MenuVariantEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to create variant")?;

    Ok(StdResponse {
        data: Some(variant),
        message: Some("Created variant successfully"),
    })
}

/// Update a variant. The parent-id filter keeps a guessed variant id from
/// editing another item's variant.
#[utoipa::path(
    patch,
    path = "/{id}/variants/{variant_id}",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Parent menu item ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID to update")
    ),
    request_body = UpdateVariantChangeset,
    responses(
        (status = 200, description = "Updated variant successfully", body = StdResponse<MenuVariantEntity, String>)
    )
)]
async fn update_variant(
    Path((menu_id, variant_id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
    Json(changeset): Json<UpdateVariantChangeset>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let variant: MenuVariantEntity = diesel::update(
        menu_variants::table
            .find(variant_id)
            .filter(menu_variants::menu_id.eq(menu_id)),
    )
    .set((changeset, menu_variants::updated_at.eq(diesel::dsl::now)))
    .returning(MenuVariantEntity::as_returning())
    .get_result(conn)
    .await
    .map_err(AppError::from)?;

    Ok(StdResponse {
        data: Some(variant),
        message: Some("Updated variant successfully"),
    })
}

/// Delete a variant.
#[utoipa::path(
    delete,
    path = "/{id}/variants/{variant_id}",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Parent menu item ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID to delete")
    ),
    responses(
        (status = 200, description = "Deleted variant successfully", body = StdResponse<SuccessRes, String>)
    )
)]
async fn delete_variant(
    Path((menu_id, variant_id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let deleted = diesel::delete(
        menu_variants::table
            .find(variant_id)
            .filter(menu_variants::menu_id.eq(menu_id)),
    )
    .execute(conn)
    .await
    .context("Failed to delete variant")?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StdResponse {
        data: Some(SuccessRes { success: true }),
        message: Some("Deleted variant successfully"),
    })
}

// ==================== Addons ====================

/// List a menu item's addons (public).
#[utoipa::path(
    get,
    path = "/{id}/addons",
    tags = ["Menus"],
    params(
        ("id" = Uuid, Path, description = "Parent menu item ID")
    ),
    responses(
        (status = 200, description = "List addons", body = StdResponse<Vec<MenuAddonEntity>, String>)
    )
)]
async fn get_addons(
    Path(menu_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let addons: Vec<MenuAddonEntity> = menu_addons::table
        .filter(menu_addons::menu_id.eq(menu_id))
        .order((
            menu_addons::group_name.asc(),
            menu_addons::sort_order.asc(),
            menu_addons::created_at.asc(),
        ))
        .get_results(conn)
        .await
        .context("Failed to get addons")?;

    Ok(StdResponse {
        data: Some(addons),
        message: Some("Get addons successfully"),
    })
}

/// Create an addon under a menu item.
#[utoipa::path(
    post,
    path = "/{id}/addons",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Parent menu item ID")
    ),
    request_body = CreateAddonReq,
    responses(
        (status = 200, description = "Created addon successfully", body = StdResponse<MenuAddonEntity, String>)
    )
)]
async fn create_addon(
    Path(menu_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<CreateAddonReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    if !menu_exists(conn, menu_id).await? {
        return Err(AppError::NotFound);
    }

    let addon: MenuAddonEntity = diesel::insert_into(menu_addons::table)
        .values(CreateAddonEntity {
            menu_id,
            name: body.name,
            price: body.price,
            stock_quantity: body.stock_quantity,
            is_available: body.is_available,
            sort_order: body.sort_order,
            is_required: body.is_required,
            group_name: body.group_name,
        })
        .returning(MenuAddonEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to create addon")?;

    Ok(StdResponse {
        data: Some(addon),
        message: Some("Created addon successfully"),
    })
}

/// Update an addon, scoped to its parent menu item.
#[utoipa::path(
    patch,
    path = "/{id}/addons/{addon_id}",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Parent menu item ID"),
        ("addon_id" = Uuid, Path, description = "Addon ID to update")
    ),
    request_body = UpdateAddonChangeset,
    responses(
        (status = 200, description = "Updated addon successfully", body = StdResponse<MenuAddonEntity, String>)
    )
)]
async fn update_addon(
    Path((menu_id, addon_id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
    Json(changeset): Json<UpdateAddonChangeset>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let addon: MenuAddonEntity = diesel::update(
        menu_addons::table
            .find(addon_id)
            .filter(menu_addons::menu_id.eq(menu_id)),
    )
    .set((changeset, menu_addons::updated_at.eq(diesel::dsl::now)))
    .returning(MenuAddonEntity::as_returning())
    .get_result(conn)
    .await
    .map_err(AppError::from)?;

    Ok(StdResponse {
        data: Some(addon),
        message: Some("Updated addon successfully"),
    })
}

/// Delete an addon.
#[utoipa::path(
    delete,
    path = "/{id}/addons/{addon_id}",
    tags = ["Menus"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Parent menu item ID"),
        ("addon_id" = Uuid, Path, description = "Addon ID to delete")
    ),
    responses(
        (status = 200, description = "Deleted addon successfully", body = StdResponse<SuccessRes, String>)
    )
)]
async fn delete_addon(
    Path((menu_id, addon_id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let deleted = diesel::delete(
        menu_addons::table
            .find(addon_id)
            .filter(menu_addons::menu_id.eq(menu_id)),
    )
    .execute(conn)
    .await
    .context("Failed to delete addon")?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StdResponse {
        data: Some(SuccessRes { success: true }),
        message: Some("Deleted addon successfully"),
    })
}
