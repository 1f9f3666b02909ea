use anyhow::Context;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::core::aliases::DieselError;
use crate::core::app_error::{AppError, StdResponse};
use crate::core::app_state::AppState;
use crate::core::middleware;
use crate::models::user_addresses::{
    CreateUserAddressEntity, UpdateUserAddressChangeset, UserAddressEntity,
};
use crate::routes::delivery_zones::active_zones;
use crate::schema::user_addresses;
use crate::zones;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest(
        "/user-addresses",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_my_addresses, create_address))
            .routes(utoipa_axum::routes!(get_default_address))
            .routes(utoipa_axum::routes!(get_address, update_address, delete_address))
            .routes(utoipa_axum::routes!(set_default_address))
            .route_layer(axum::middleware::from_fn(middleware::user_authorization)),
    )
}

#[derive(Deserialize, Debug, ToSchema)]
struct CreateUserAddressReq {
    label: String,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    state: Option<String>,
    postal_code: String,
    country: Option<String>,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    instructions: Option<String>,
    is_default: Option<bool>,
}

/// Create an address for the authenticated user. The covering delivery zone
/// is resolved from the postal code at write time.
#[utoipa::path(
    post,
    path = "/",
    tags = ["User Addresses"],
    security(("bearerAuth" = [])),
    request_body = CreateUserAddressReq,
    responses(
        (status = 200, description = "Created address successfully", body = StdResponse<UserAddressEntity, String>)
    )
)]
async fn create_address(
    State(state): State<AppState>,
    Extension(user_id): Extension<i32>,
    Json(body): Json<CreateUserAddressReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let zones_list = active_zones(conn).await?;
    let delivery_zone_id =
        zones::find_zone_by_postal_code(&zones_list, &body.postal_code).map(|zone| zone.id);

    // Only one default per user; clearing the others first keeps the
    // last-write-wins behavior of concurrent default flips.
    if body.is_default.unwrap_or(false) {
        diesel::update(user_addresses::table.filter(user_addresses::user_id.eq(user_id)))
            .set(user_addresses::is_default.eq(false))
            .execute(conn)
            .await
            .context("Failed to clear existing default addresses")?;
    }

    let address: UserAddressEntity = diesel::insert_into(user_addresses::table)
        .values(CreateUserAddressEntity {
            user_id,
            label: body.label,
            address_line1: body.address_line1,
            address_line2: body.address_line2,
            city: body.city,
            state: body.state,
            postal_code: body.postal_code,
            country: body.country,
            latitude: body.latitude,
            longitude: body.longitude,
            instructions: body.instructions,
            is_default: body.is_default,
            delivery_zone_id,
        })
        .returning(UserAddressEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to create address")?;

    Ok(StdResponse {
        data: Some(address),
        message: Some("Created address successfully"),
    })
}

/// List the authenticated user's addresses, default first.
#[utoipa::path(
    get,
    path = "/",
    tags = ["User Addresses"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List my addresses", body = StdResponse<Vec<UserAddressEntity>, String>)
    )
)]
async fn get_my_addresses(
    State(state): State<AppState>,
    Extension(user_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let addresses: Vec<UserAddressEntity> = user_addresses::table
        .filter(user_addresses::user_id.eq(user_id))
        .order((
            user_addresses::is_default.desc(),
            user_addresses::created_at.desc(),
        ))
        .get_results(conn)
        .await
        .context("Failed to get addresses")?;

    Ok(StdResponse {
        data: Some(addresses),
        message: Some("Get addresses successfully"),
    })
}

/// Fetch the authenticated user's default address, if any.
#[utoipa::path(
    get,
    path = "/default",
    tags = ["User Addresses"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Get default address", body = StdResponse<UserAddressEntity, String>)
    )
)]
async fn get_default_address(
    State(state): State<AppState>,
    Extension(user_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let address: Option<UserAddressEntity> = user_addresses::table
        .filter(user_addresses::user_id.eq(user_id))
        .filter(user_addresses::is_default.eq(true))
        .first(conn)
        .await
        .optional()
        .context("Failed to get default address")?;

    Ok(StdResponse {
        data: address,
        message: Some("Get default address successfully"),
    })
}

/// Fetch one of the authenticated user's addresses.
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["User Addresses"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Address ID to fetch")
    ),
    responses(
        (status = 200, description = "Get address successfully", body = StdResponse<UserAddressEntity, String>)
    )
)]
async fn get_address(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(user_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let address: QueryResult<UserAddressEntity> = user_addresses::table
        .find(id)
        .filter(user_addresses::user_id.eq(user_id))
        .get_result(conn)
        .await;

    match address {
        Ok(address) => Ok(StdResponse {
            data: Some(address),
            message: Some("Get address successfully"),
        }),
        Err(DieselError::NotFound) => Err(AppError::NotFound),
        Err(err) => Err(AppError::Other(err.into())),
    }
}

/// Update one of the authenticated user's addresses. A changed postal code
/// re-resolves the covering delivery zone.
#[utoipa::path(
    patch,
    path = "/{id}",
    tags = ["User Addresses"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Address ID to update")
    ),
    request_body = UpdateUserAddressChangeset,
    responses(
        (status = 200, description = "Updated address successfully", body = StdResponse<UserAddressEntity, String>)
    )
)]
async fn update_address(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(user_id): Extension<i32>,
    Json(changeset): Json<UpdateUserAddressChangeset>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let current: UserAddressEntity = user_addresses::table
        .find(id)
        .filter(user_addresses::user_id.eq(user_id))
        .get_result(conn)
        .await
        .map_err(AppError::from)?;

    let rezoned = match &changeset.postal_code {
        Some(postal_code) if *postal_code != current.postal_code => {
            let zones_list = active_zones(conn).await?;
            Some(zones::find_zone_by_postal_code(&zones_list, postal_code).map(|zone| zone.id))
        }
        _ => None,
    };

    if changeset.is_default == Some(true) {
        diesel::update(user_addresses::table.filter(user_addresses::user_id.eq(user_id)))
            .set(user_addresses::is_default.eq(false))
            .execute(conn)
            .await
            .context("Failed to clear existing default addresses")?;
    }

    let scoped = user_addresses::table
        .find(id)
        .filter(user_addresses::user_id.eq(user_id));
    let updated: UserAddressEntity = match rezoned {
        Some(delivery_zone_id) => diesel::update(scoped)
            .set((
                changeset,
                user_addresses::delivery_zone_id.eq(delivery_zone_id),
                user_addresses::updated_at.eq(diesel::dsl::now),
            ))
            .returning(UserAddressEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to update address")?,
        None => diesel::update(scoped)
            .set((changeset, user_addresses::updated_at.eq(diesel::dsl::now)))
            .returning(UserAddressEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to update address")?,
    };

    Ok(StdResponse {
        data: Some(updated),
        message: Some("Updated address successfully"),
    })
}

/// Delete one of the authenticated user's addresses. Orders keep their
/// snapshot of it.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["User Addresses"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Address ID to delete")
    ),
    responses(
        (status = 200, description = "Deleted address successfully", body = StdResponse<UserAddressEntity, String>)
    )
)]
async fn delete_address(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(user_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let address: QueryResult<UserAddressEntity> = diesel::delete(
        user_addresses::table
            .filter(user_addresses::id.eq(id))
            .filter(user_addresses::user_id.eq(user_id)),
    )
    .returning(UserAddressEntity::as_returning())
    .get_result(conn)
    .await;

    match address {
        Ok(address) => Ok(StdResponse {
            data: Some(address),
            message: Some("Deleted address successfully"),
        }),
        Err(DieselError::NotFound) => Err(AppError::NotFound),
        Err(err) => Err(AppError::Other(err.into())),
    }
}

/// Mark an address as the user's default.
#[utoipa::path(
    post,
    path = "/{id}/default",
    tags = ["User Addresses"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Address ID to mark as default")
    ),
    responses(
        (status = 200, description = "Set default address successfully", body = StdResponse<UserAddressEntity, String>)
    )
)]
async fn set_default_address(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(user_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let address = conn
        .transaction(move |conn| {
            Box::pin(async move {
                diesel::update(
                    user_addresses::table.filter(user_addresses::user_id.eq(user_id)),
                )
                .set(user_addresses::is_default.eq(false))
                .execute(conn)
                .await
                .context("Failed to clear existing default addresses")?;

                let address: UserAddressEntity = diesel::update(
                    user_addresses::table
                        .find(id)
                        .filter(user_addresses::user_id.eq(user_id)),
                )
                .set((
                    user_addresses::is_default.eq(true),
                    user_addresses::updated_at.eq(diesel::dsl::now),
                ))
                .returning(UserAddressEntity::as_returning())
                .get_result(conn)
                .await
                .map_err(|_| AppError::NotFound)?;

                Ok::<UserAddressEntity, AppError>(address)
            })
        })
        .await?;

    Ok(StdResponse {
        data: Some(address),
        message: Some("Set default address successfully"),
    })
}
