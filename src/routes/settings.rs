use anyhow::Context;
use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use utoipa_axum::router::OpenApiRouter;

use crate::core::app_error::{AppError, StdResponse};
use crate::core::app_state::AppState;
use crate::core::middleware;
use crate::models::settings::{SettingEntity, UpdateSettingChangeset};
use crate::schema::settings;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    let staff = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_settings, update_settings))
        .route_layer(axum::middleware::from_fn(middleware::user_authorization));
    OpenApiRouter::new().nest("/settings", staff)
}

/// Fetch the application settings. The single row is seeded at startup.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Settings"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Get settings successfully", body = StdResponse<SettingEntity, String>)
    )
)]
async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let settings_row: SettingEntity = settings::table
        .first(conn)
        .await
        .context("Settings row is missing")?;

    Ok(StdResponse {
        data: Some(settings_row),
        message: Some("Get settings successfully"),
    })
}

/// Update application settings.
#[utoipa::path(
    patch,
    path = "/",
    tags = ["Settings"],
    security(("bearerAuth" = [])),
    request_body = UpdateSettingChangeset,
    responses(
        (status = 200, description = "Updated settings successfully", body = StdResponse<SettingEntity, String>)
    )
)]
async fn update_settings(
    State(state): State<AppState>,
    Json(changeset): Json<UpdateSettingChangeset>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let current: SettingEntity = settings::table
        .first(conn)
        .await
        .context("Settings row is missing")?;

    let updated: SettingEntity = diesel::update(settings::table.find(current.id))
        .set((changeset, settings::updated_at.eq(diesel::dsl::now)))
        .returning(SettingEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to update settings")?;

    Ok(StdResponse {
        data: Some(updated),
        message: Some("Updated settings successfully"),
    })
}
