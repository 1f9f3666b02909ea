use anyhow::Context;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::core::aliases::DieselError;
use crate::core::app_error::{AppError, StdResponse};
use crate::core::app_state::AppState;
use crate::core::middleware;
use crate::models::delivery_zones::{
    CreateDeliveryZoneEntity, DeliveryZoneEntity, UpdateDeliveryZoneChangeset,
};
use crate::schema::delivery_zones;
use crate::zones;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    let public = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_active_zones))
        .routes(utoipa_axum::routes!(check_postal_code))
        .routes(utoipa_axum::routes!(check_area));
    let staff = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_zones, create_zone))
        .routes(utoipa_axum::routes!(get_zone, update_zone, delete_zone))
        .route_layer(axum::middleware::from_fn(middleware::user_authorization));
    OpenApiRouter::new().nest("/delivery-zones", public.merge(staff))
}

/// Active, non-deleted zones in configuration order. Matching walks this
/// order, so overlapping zones resolve to the lowest sort_order.
pub(crate) async fn active_zones(
    conn: &mut AsyncPgConnection,
) -> Result<Vec<DeliveryZoneEntity>, AppError> {
    let zones_list: Vec<DeliveryZoneEntity> = delivery_zones::table
        .filter(delivery_zones::deleted_at.is_null())
        .filter(delivery_zones::is_active.eq(true))
        .order((
            delivery_zones::sort_order.asc(),
            delivery_zones::created_at.desc(),
        ))
        .get_results(conn)
        .await
        .context("Failed to get delivery zones")?;
    Ok(zones_list)
}

#[derive(Serialize, ToSchema)]
pub struct DeliverabilityRes {
    pub is_deliverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<DeliveryZoneEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_order: Option<Decimal>,
}

impl DeliverabilityRes {
    fn deliverable(zone: DeliveryZoneEntity) -> Self {
        Self {
            is_deliverable: true,
            delivery_fee: Some(zone.delivery_fee),
            estimated_minutes: zone.estimated_delivery_minutes,
            minimum_order: zone.minimum_order,
            zone: Some(zone),
        }
    }

    fn not_deliverable() -> Self {
        Self {
            is_deliverable: false,
            zone: None,
            delivery_fee: None,
            estimated_minutes: None,
            minimum_order: None,
        }
    }
}

/// List all delivery zones, including inactive ones.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Delivery Zones"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List all delivery zones", body = StdResponse<Vec<DeliveryZoneEntity>, String>)
    )
)]
async fn get_zones(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let zones_list: Vec<DeliveryZoneEntity> = delivery_zones::table
        .filter(delivery_zones::deleted_at.is_null())
        .order((
            delivery_zones::sort_order.asc(),
            delivery_zones::created_at.desc(),
        ))
        .get_results(conn)
        .await
        .context("Failed to get delivery zones")?;

    Ok(StdResponse {
        data: Some(zones_list),
        message: Some("Get delivery zones successfully"),
    })
}

/// List active delivery zones (public).
#[utoipa::path(
    get,
    path = "/active",
    tags = ["Delivery Zones"],
    responses(
        (status = 200, description = "List active delivery zones", body = StdResponse<Vec<DeliveryZoneEntity>, String>)
    )
)]
async fn get_active_zones(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let zones_list = active_zones(conn).await?;

    Ok(StdResponse {
        data: Some(zones_list),
        message: Some("Get active delivery zones successfully"),
    })
}

/// Check whether a postal code is inside any active zone (public).
#[utoipa::path(
    get,
    path = "/check/{postal_code}",
    tags = ["Delivery Zones"],
    params(
        ("postal_code" = String, Path, description = "Postal code to check")
    ),
    responses(
        (status = 200, description = "Checked deliverability", body = StdResponse<DeliverabilityRes, String>)
    )
)]
async fn check_postal_code(
    Path(postal_code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let zones_list = active_zones(conn).await?;
    let result = match zones::find_zone_by_postal_code(&zones_list, &postal_code) {
        Some(zone) => DeliverabilityRes::deliverable(zone.clone()),
        None => DeliverabilityRes::not_deliverable(),
    };

    Ok(StdResponse {
        data: Some(result),
        message: Some("Checked deliverability successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct CheckAreaQuery {
    area: String,
}

/// Check whether an area name is inside any active zone (public).
#[utoipa::path(
    get,
    path = "/check-area",
    tags = ["Delivery Zones"],
    params(
        ("area" = String, Query, description = "Area name to check")
    ),
    responses(
        (status = 200, description = "Checked deliverability", body = StdResponse<DeliverabilityRes, String>)
    )
)]
async fn check_area(
    Query(query): Query<CheckAreaQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let zones_list = active_zones(conn).await?;
    let result = match zones::find_zone_by_area(&zones_list, &query.area) {
        Some(zone) => DeliverabilityRes::deliverable(zone.clone()),
        None => DeliverabilityRes::not_deliverable(),
    };

    Ok(StdResponse {
        data: Some(result),
        message: Some("Checked deliverability successfully"),
    })
}

/// Create a new delivery zone.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Delivery Zones"],
    security(("bearerAuth" = [])),
    request_body = CreateDeliveryZoneEntity,
    responses(
        (status = 200, description = "Created delivery zone successfully", body = StdResponse<DeliveryZoneEntity, String>)
    )
)]
async fn create_zone(
    State(state): State<AppState>,
    Json(body): Json<CreateDeliveryZoneEntity>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let zone: DeliveryZoneEntity = diesel::insert_into(delivery_zones::table)
        .values(body)
        .returning(DeliveryZoneEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to create delivery zone")?;

    Ok(StdResponse {
        data: Some(zone),
        message: Some("Created delivery zone successfully"),
    })
}

/// Fetch a single delivery zone.
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["Delivery Zones"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Delivery zone ID to fetch")
    ),
    responses(
        (status = 200, description = "Get delivery zone successfully", body = StdResponse<DeliveryZoneEntity, String>)
    )
)]
async fn get_zone(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let zone: QueryResult<DeliveryZoneEntity> = delivery_zones::table
        .find(id)
        .filter(delivery_zones::deleted_at.is_null())
        .get_result(conn)
        .await;

    match zone {
        Ok(zone) => Ok(StdResponse {
            data: Some(zone),
            message: Some("Get delivery zone successfully"),
        }),
        Err(DieselError::NotFound) => Err(AppError::NotFound),
        Err(err) => Err(AppError::Other(err.into())),
    }
}

/// Update a delivery zone.
#[utoipa::path(
    patch,
    path = "/{id}",
    tags = ["Delivery Zones"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Delivery zone ID to update")
    ),
    request_body = UpdateDeliveryZoneChangeset,
    responses(
        (status = 200, description = "Updated delivery zone successfully", body = StdResponse<DeliveryZoneEntity, String>)
    )
)]
async fn update_zone(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(changeset): Json<UpdateDeliveryZoneChangeset>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let zone: DeliveryZoneEntity = diesel::update(
        delivery_zones::table
            .find(id)
            .filter(delivery_zones::deleted_at.is_null()),
    )
    .set((changeset, delivery_zones::updated_at.eq(diesel::dsl::now)))
    .returning(DeliveryZoneEntity::as_returning())
    .get_result(conn)
    .await
    .map_err(AppError::from)?;

    Ok(StdResponse {
        data: Some(zone),
        message: Some("Updated delivery zone successfully"),
    })
}

/// Soft-delete a delivery zone. Orders and addresses keep their weak
/// references to it.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Delivery Zones"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Delivery zone ID to delete")
    ),
    responses(
        (status = 200, description = "Deleted delivery zone successfully", body = StdResponse<DeliveryZoneEntity, String>)
    )
)]
async fn delete_zone(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let zone: DeliveryZoneEntity = diesel::update(
        delivery_zones::table
            .find(id)
            .filter(delivery_zones::deleted_at.is_null()),
    )
    .set(delivery_zones::deleted_at.eq(diesel::dsl::now))
    .returning(DeliveryZoneEntity::as_returning())
    .get_result(conn)
    .await
    .map_err(AppError::from)?;

    Ok(StdResponse {
        data: Some(zone),
        message: Some("Deleted delivery zone successfully"),
    })
}
