use anyhow::Context;
use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::core::app_error::{AppError, StdResponse};
use crate::core::app_state::AppState;
use crate::core::middleware;
use crate::models::restaurant_profile::{RestaurantProfileEntity, UpdateRestaurantProfileChangeset};
use crate::opening_hours::{HolidayClosure, OpenState, Schedule, SpecialHour};
use crate::schema::restaurant_profile;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    let public = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_public_info))
        .routes(utoipa_axum::routes!(is_open));
    let staff = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_profile, update_profile))
        .routes(utoipa_axum::routes!(set_holiday_closures))
        .routes(utoipa_axum::routes!(set_special_hours))
        .route_layer(axum::middleware::from_fn(middleware::user_authorization));
    OpenApiRouter::new().nest("/restaurant-profile", public.merge(staff))
}

/// The profile row is seeded at startup, so a missing row is an internal
/// error rather than a lazily-created default.
async fn load_profile(
    conn: &mut diesel_async::AsyncPgConnection,
) -> Result<RestaurantProfileEntity, AppError> {
    let profile: RestaurantProfileEntity = restaurant_profile::table
        .first(conn)
        .await
        .context("Restaurant profile row is missing")?;
    Ok(profile)
}

/// Fetch the restaurant profile.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Restaurant Profile"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Get restaurant profile successfully", body = StdResponse<RestaurantProfileEntity, String>)
    )
)]
async fn get_profile(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let profile = load_profile(conn).await?;

    Ok(StdResponse {
        data: Some(profile),
        message: Some("Get restaurant profile successfully"),
    })
}

#[derive(Serialize, ToSchema)]
struct PublicProfileRes {
    name: String,
    logo_id: Option<Uuid>,
}

/// Public name and logo reference for unauthenticated surfaces.
#[utoipa::path(
    get,
    path = "/public",
    tags = ["Restaurant Profile"],
    responses(
        (status = 200, description = "Get public restaurant info", body = StdResponse<PublicProfileRes, String>)
    )
)]
async fn get_public_info(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let profile = load_profile(conn).await?;

    Ok(StdResponse {
        data: Some(PublicProfileRes {
            name: profile.name,
            logo_id: profile.logo_id,
        }),
        message: Some("Get public restaurant info successfully"),
    })
}

/// Update the restaurant profile.
#[utoipa::path(
    patch,
    path = "/",
    tags = ["Restaurant Profile"],
    security(("bearerAuth" = [])),
    request_body = UpdateRestaurantProfileChangeset,
    responses(
        (status = 200, description = "Updated restaurant profile successfully", body = StdResponse<RestaurantProfileEntity, String>)
    )
)]
async fn update_profile(
    State(state): State<AppState>,
    Json(changeset): Json<UpdateRestaurantProfileChangeset>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let current = load_profile(conn).await?;

    let updated: RestaurantProfileEntity =
        diesel::update(restaurant_profile::table.find(current.id))
            .set((changeset, restaurant_profile::updated_at.eq(diesel::dsl::now)))
            .returning(RestaurantProfileEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to update restaurant profile")?;

    Ok(StdResponse {
        data: Some(updated),
        message: Some("Updated restaurant profile successfully"),
    })
}

/// Replace the holiday-closure list.
#[utoipa::path(
    put,
    path = "/holiday-closures",
    tags = ["Restaurant Profile"],
    security(("bearerAuth" = [])),
    request_body = Vec<HolidayClosure>,
    responses(
        (status = 200, description = "Updated holiday closures successfully", body = StdResponse<RestaurantProfileEntity, String>)
    )
)]
async fn set_holiday_closures(
    State(state): State<AppState>,
    Json(closures): Json<Vec<HolidayClosure>>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let current = load_profile(conn).await?;
    let closures =
        serde_json::to_value(&closures).context("Failed to serialize holiday closures")?;

    let updated: RestaurantProfileEntity =
        diesel::update(restaurant_profile::table.find(current.id))
            .set((
                restaurant_profile::holiday_closures.eq(closures),
                restaurant_profile::updated_at.eq(diesel::dsl::now),
            ))
            .returning(RestaurantProfileEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to update holiday closures")?;

    Ok(StdResponse {
        data: Some(updated),
        message: Some("Updated holiday closures successfully"),
    })
}

/// Replace the special-hours list.
#[utoipa::path(
    put,
    path = "/special-hours",
    tags = ["Restaurant Profile"],
    security(("bearerAuth" = [])),
    request_body = Vec<SpecialHour>,
    responses(
        (status = 200, description = "Updated special hours successfully", body = StdResponse<RestaurantProfileEntity, String>)
    )
)]
async fn set_special_hours(
    State(state): State<AppState>,
    Json(special_hours): Json<Vec<SpecialHour>>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let current = load_profile(conn).await?;
    let special_hours =
        serde_json::to_value(&special_hours).context("Failed to serialize special hours")?;

    let updated: RestaurantProfileEntity =
        diesel::update(restaurant_profile::table.find(current.id))
            .set((
                restaurant_profile::special_hours.eq(special_hours),
                restaurant_profile::updated_at.eq(diesel::dsl::now),
            ))
            .returning(RestaurantProfileEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to update special hours")?;

    Ok(StdResponse {
        data: Some(updated),
        message: Some("Updated special hours successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct IsOpenQuery {
    /// Instant to evaluate; defaults to now. Injectable for deterministic checks.
    at: Option<DateTime<Utc>>,
}

/// Open/closed determination (public): holiday closures, then date-specific
/// special hours, then the weekly schedule.
#[utoipa::path(
    get,
    path = "/is-open",
    tags = ["Restaurant Profile"],
    params(
        ("at" = Option<String>, Query, description = "RFC 3339 timestamp to evaluate, defaults to now")
    ),
    responses(
        (status = 200, description = "Open state resolved", body = StdResponse<OpenState, String>)
    )
)]
async fn is_open(
    Query(query): Query<IsOpenQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let profile = load_profile(conn).await?;
    let schedule = Schedule::from_values(
        &profile.opening_hours,
        &profile.holiday_closures,
        &profile.special_hours,
    )?;

    let at = query.at.unwrap_or_else(Utc::now).naive_utc();
    let open_state = schedule.resolve_open_state(at);

    Ok(StdResponse {
        data: Some(open_state),
        message: Some("Open state resolved successfully"),
    })
}
