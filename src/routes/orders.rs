use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};
use chrono::Utc;
use diesel::{ExpressionMethods, QueryDsl, QueryResult, SelectableHelper};
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
use crate::models::catalog::{MenuAddonEntity, MenuEntity, MenuVariantEntity};
use crate::models::orders::{
    AddressSnapshot, CreateOrderEntity, CreateOrderItemEntity, OrderEntity, OrderItemEntity,
};
use crate::models::restaurant_profile::RestaurantProfileEntity;
use crate::models::settings::SettingEntity;
use crate::models::user_addresses::UserAddressEntity;
use crate::opening_hours::Schedule;
use crate::order_status::OrderStatus;
use crate::pricing::{self, RequestedItem};
use crate::routes::delivery_zones::active_zones;
use crate::schema::{
    menu_addons, menu_variants, menus, order_items, orders, restaurant_profile, settings,
    user_addresses,
};
use crate::zones;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    let public = OpenApiRouter::new().routes(utoipa_axum::routes!(create_order));
    let authed = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_orders))
        .routes(utoipa_axum::routes!(get_my_orders))
        .routes(utoipa_axum::routes!(get_ready_orders))
        .routes(utoipa_axum::routes!(get_order, update_order, delete_order))
        .route_layer(axum::middleware::from_fn(middleware::user_authorization));
    OpenApiRouter::new().nest("/orders", public.merge(authed))
}

#[derive(Serialize, ToSchema)]
struct OrderRes {
    pub order: OrderEntity,
    pub items: Vec<OrderItemEntity>,
}

#[derive(Deserialize, ToSchema)]
struct CreateOrderReq {
    items: Vec<RequestedItem>,
    #[serde(default)]
    delivery_address_id: Option<Uuid>,
    #[serde(default)]
    special_instructions: Option<String>,
    /// Caller-supplied total, kept for importing historical orders; when
    /// absent the total is computed as subtotal + tax + delivery fee.
    #[serde(default)]
    total_amount: Option<Decimal>,
    #[serde(default)]
    status: Option<OrderStatus>,
}

/// Attaches the persisted item snapshots to a page of orders.
async fn attach_items(
    conn: &mut AsyncPgConnection,
    orders_list: Vec<OrderEntity>,
) -> Result<Vec<OrderRes>, AppError> {
    let order_ids: Vec<Uuid> = orders_list.iter().map(|order| order.id).collect();
    let items: Vec<OrderItemEntity> = order_items::table
        .filter(order_items::order_id.eq_any(&order_ids))
        .get_results(conn)
        .await
        .context("Failed to get order items")?;

    let mut group: HashMap<Uuid, Vec<OrderItemEntity>> = HashMap::new();
    for item in items {
        group.entry(item.order_id).or_default().push(item);
    }

    Ok(orders_list
        .into_iter()
        .map(|order| OrderRes {
            items: group.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect())
}

/// Create an order. Prices, variant/addon details and the delivery address
/// are resolved against the live records and captured as immutable snapshots;
/// the order plus all line items are written in a single transaction.
///
/// Guest checkout is allowed: the forwarded principal id is optional here.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Orders"],
    request_body = CreateOrderReq,
    responses(
        (status = 200, description = "Created order successfully", body = StdResponse<OrderRes, String>)
    )
)]
async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateOrderReq>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = middleware::principal_id(&headers);
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let settings_row: SettingEntity = settings::table
        .first(conn)
        .await
        .context("Settings row is missing")?;

    if state.config.enforce_opening_hours {
        let profile: RestaurantProfileEntity = restaurant_profile::table
            .first(conn)
            .await
            .context("Restaurant profile row is missing")?;
        let schedule = Schedule::from_values(
            &profile.opening_hours,
            &profile.holiday_closures,
            &profile.special_hours,
        )?;
        let open_state = schedule.resolve_open_state(Utc::now().naive_utc());
        if !open_state.is_open {
            return Err(AppError::ClosedForOrders(
                open_state
                    .reason
                    .unwrap_or_else(|| "Restaurant is currently closed".to_string()),
            ));
        }
    }

    let menu_ids: Vec<Uuid> = body.items.iter().map(|item| item.menu_item_id).collect();
    let menus_list: Vec<MenuEntity> = menus::table
        .filter(menus::id.eq_any(&menu_ids))
        .filter(menus::deleted_at.is_null())
        .get_results(conn)
        .await
        .context("Failed to get menu items")?;
    let variants: Vec<MenuVariantEntity> = menu_variants::table
        .filter(menu_variants::menu_id.eq_any(&menu_ids))
        .get_results(conn)
        .await
        .context("Failed to get variants")?;
    let addons: Vec<MenuAddonEntity> = menu_addons::table
        .filter(menu_addons::menu_id.eq_any(&menu_ids))
        .get_results(conn)
        .await
        .context("Failed to get addons")?;

    let catalog = pricing::build_catalog(menus_list, variants, addons);
    let priced = pricing::price_items(&body.items, &catalog)?;

    let mut delivery_fee = Decimal::ZERO;
    let mut delivery_zone_id = None;
    let mut delivery_address_snapshot = None;
    if let Some(address_id) = body.delivery_address_id {
        let address: UserAddressEntity = user_addresses::table
            .find(address_id)
            .get_result(conn)
            .await
            .map_err(AppError::from)?;
        if let Some(user_id) = user_id {
            if address.user_id != user_id {
                return Err(AppError::ForbiddenResource(
                    "Delivery address does not belong to the ordering user".to_string(),
                ));
            }
        }

        let zones_list = active_zones(conn).await?;
        let zone = zones::find_zone_by_postal_code(&zones_list, &address.postal_code)
            .ok_or_else(|| {
                AppError::NotDeliverable(format!(
                    "No delivery zone covers postal code {}",
                    address.postal_code
                ))
            })?;
        delivery_fee = zone.delivery_fee;
        delivery_zone_id = Some(zone.id);
        delivery_address_snapshot = Some(
            serde_json::to_value(AddressSnapshot::from(&address))
                .context("Failed to serialize address snapshot")?,
        );
    }

    let tax_amount = pricing::compute_tax(priced.subtotal, settings_row.tax_rate);
    let total_amount = body
        .total_amount
        .unwrap_or(priced.subtotal + tax_amount + delivery_fee);
    let status = body.status.unwrap_or(OrderStatus::Pending);
    let subtotal = priced.subtotal;
    let delivery_address_id = body.delivery_address_id;
    let special_instructions = body.special_instructions;

    let (order, items) = conn
        .transaction(move |conn| {
            Box::pin(async move {
                let order: OrderEntity = diesel::insert_into(orders::table)
                    .values(CreateOrderEntity {
                        user_id,
                        status,
                        subtotal,
                        tax_amount,
                        delivery_fee,
                        total_amount,
                        special_instructions,
                        delivery_address_id,
                        delivery_zone_id,
                        delivery_address_snapshot,
                    })
                    .returning(OrderEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to create order")?;

                let item_rows = priced
                    .items
                    .into_iter()
                    .map(|item| {
                        let selected_addons = if item.selected_addons.is_empty() {
                            None
                        } else {
                            Some(serde_json::to_value(&item.selected_addons)?)
                        };
                        Ok(CreateOrderItemEntity {
                            order_id: order.id,
                            menu_item_id: item.menu_item_id,
                            quantity: item.quantity,
                            price: item.unit_price,
                            variant_id: item.variant.as_ref().map(|variant| variant.id),
                            variant_name: item
                                .variant
                                .as_ref()
                                .map(|variant| variant.name.clone()),
                            variant_price: item.variant.as_ref().map(|variant| variant.price),
                            selected_addons,
                            addons_total: item.addons_total,
                            item_total: item.item_total,
                            item_notes: item.item_notes,
                        })
                    })
                    .collect::<Result<Vec<_>, serde_json::Error>>()
                    .context("Failed to serialize addon snapshots")?;

                let items: Vec<OrderItemEntity> = diesel::insert_into(order_items::table)
                    .values(item_rows)
                    .returning(OrderItemEntity::as_returning())
                    .get_results(conn)
                    .await
                    .context("Failed to create order items")?;

                Ok::<(OrderEntity, Vec<OrderItemEntity>), anyhow::Error>((order, items))
            })
        })
        .await
        .context("Transaction failed")?;

    Ok(StdResponse {
        data: Some(OrderRes { order, items }),
        message: Some("Created order successfully"),
    })
}

/// Fetch all orders, newest first.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List all orders", body = StdResponse<Vec<OrderRes>, String>)
    )
)]
async fn get_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let orders_list: Vec<OrderEntity> = orders::table
        .order_by(orders::created_at.desc())
        .get_results(conn)
        .await
        .context("Failed to get orders")?;

    let data = attach_items(conn, orders_list).await?;

    Ok(StdResponse {
        data: Some(data),
        message: Some("Get orders successfully"),
    })
}

/// Fetch the authenticated user's orders, newest first.
#[utoipa::path(
    get,
    path = "/me",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List my orders", body = StdResponse<Vec<OrderRes>, String>)
    )
)]
async fn get_my_orders(
    State(state): State<AppState>,
    Extension(user_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let orders_list: Vec<OrderEntity> = orders::table
        .filter(orders::user_id.eq(user_id))
        .order_by(orders::created_at.desc())
        .get_results(conn)
        .await
        .context("Failed to get my orders")?;

    let data = attach_items(conn, orders_list).await?;

    Ok(StdResponse {
        data: Some(data),
        message: Some("Get my orders successfully"),
    })
}

/// Orders in READY state, oldest first, for FIFO dispatch.
#[utoipa::path(
    get,
    path = "/ready",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List orders ready for delivery", body = StdResponse<Vec<OrderRes>, String>)
    )
)]
async fn get_ready_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let orders_list: Vec<OrderEntity> = orders::table
        .filter(orders::status.eq(OrderStatus::Ready))
        .order_by(orders::created_at.asc())
        .get_results(conn)
        .await
        .context("Failed to get ready orders")?;

    let data = attach_items(conn, orders_list).await?;

    Ok(StdResponse {
        data: Some(data),
        message: Some("Get ready orders successfully"),
    })
}

/// Fetch a single order with its item snapshots.
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get order successfully", body = StdResponse<OrderRes, String>)
    )
)]
async fn get_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let order: QueryResult<OrderEntity> = orders::table.find(id).get_result(conn).await;

    if let Err(err) = order {
        match err {
            DieselError::NotFound => return Err(AppError::NotFound),
            _ => return Err(AppError::Other(err.into())),
        }
    }

    let order = order.unwrap();
    let mut data = attach_items(conn, vec![order]).await?;

    Ok(StdResponse {
        data: data.pop(),
        message: Some("Get order successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct UpdateOrderReq {
    status: OrderStatus,
}

/// Apply a status transition. Only the fixed successor, cancellation from a
/// non-terminal state, and a same-state no-op are accepted.
#[utoipa::path(
    patch,
    path = "/{id}",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID to update")
    ),
    request_body = UpdateOrderReq,
    responses(
        (status = 200, description = "Updated order status successfully", body = StdResponse<OrderEntity, String>)
    )
)]
async fn update_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<UpdateOrderReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let order: OrderEntity = orders::table
        .find(id)
        .get_result(conn)
        .await
        .map_err(AppError::from)?;

    if !order.status.can_transition_to(body.status) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot move order from {} to {}",
            order.status, body.status
        )));
    }

    let updated: OrderEntity = diesel::update(orders::table.find(id))
        .set((
            orders::status.eq(body.status),
            orders::updated_at.eq(diesel::dsl::now),
        ))
        .returning(OrderEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to update order status")?;

    Ok(StdResponse {
        data: Some(updated),
        message: Some("Updated order status successfully"),
    })
}

/// Hard-delete an order. Administrative cleanup only; item snapshots cascade.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID to delete")
    ),
    responses(
        (status = 200, description = "Deleted order successfully", body = StdResponse<OrderEntity, String>)
    )
)]
async fn delete_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let order: QueryResult<OrderEntity> = diesel::delete(orders::table.find(id))
        .returning(OrderEntity::as_returning())
        .get_result(conn)
        .await;

    match order {
        Ok(order) => Ok(StdResponse {
            data: Some(order),
            message: Some("Deleted order successfully"),
        }),
        Err(DieselError::NotFound) => Err(AppError::NotFound),
        Err(err) => Err(AppError::Other(err.into())),
    }
}
