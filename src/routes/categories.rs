use anyhow::Context;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::RunQueryDsl;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::core::aliases::DieselError;
use crate::core::app_error::{AppError, StdResponse};
use crate::core::app_state::AppState;
use crate::core::middleware;
use crate::models::catalog::{CategoryEntity, CreateCategoryEntity, UpdateCategoryChangeset};
use crate::schema::categories;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    let public = OpenApiRouter::new().routes(utoipa_axum::routes!(get_categories));
    let staff = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(create_category))
        .routes(utoipa_axum::routes!(get_category, update_category, delete_category))
        .route_layer(axum::middleware::from_fn(middleware::user_authorization));
    OpenApiRouter::new().nest("/categories", public.merge(staff))
}

/// List all categories (public).
#[utoipa::path(
    get,
    path = "/",
    tags = ["Categories"],
    responses(
        (status = 200, description = "List all categories", body = StdResponse<Vec<CategoryEntity>, String>)
    )
)]
async fn get_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let categories_list: Vec<CategoryEntity> = categories::table
        .filter(categories::deleted_at.is_null())
        .order_by(categories::name.asc())
        .get_results(conn)
        .await
        .context("Failed to get categories")?;

    Ok(StdResponse {
        data: Some(categories_list),
        message: Some("Get categories successfully"),
    })
}

/// Create a new category.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Categories"],
    security(("bearerAuth" = [])),
    request_body = CreateCategoryEntity,
    responses(
        (status = 200, description = "Created category successfully", body = StdResponse<CategoryEntity, String>)
    )
)]
async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryEntity>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let category: CategoryEntity = diesel::insert_into(categories::table)
        .values(body)
        .returning(CategoryEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to create category")?;

    Ok(StdResponse {
        data: Some(category),
        message: Some("Created category successfully"),
    })
}

/// Fetch a single category.
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["Categories"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Category ID to fetch")
    ),
    responses(
        (status = 200, description = "Get category successfully", body = StdResponse<CategoryEntity, String>)
    )
)]
async fn get_category(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let category: QueryResult<CategoryEntity> = categories::table
        .find(id)
        .filter(categories::deleted_at.is_null())
        .get_result(conn)
        .await;

    match category {
        Ok(category) => Ok(StdResponse {
            data: Some(category),
            message: Some("Get category successfully"),
        }),
        Err(DieselError::NotFound) => Err(AppError::NotFound),
        Err(err) => Err(AppError::Other(err.into())),
    }
}

/// Update a category.
#[utoipa::path(
    patch,
    path = "/{id}",
    tags = ["Categories"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Category ID to update")
    ),
    request_body = UpdateCategoryChangeset,
    responses(
        (status = 200, description = "Updated category successfully", body = StdResponse<CategoryEntity, String>)
    )
)]
async fn update_category(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(changeset): Json<UpdateCategoryChangeset>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let category: CategoryEntity =
        diesel::update(categories::table.find(id).filter(categories::deleted_at.is_null()))
            .set((changeset, categories::updated_at.eq(diesel::dsl::now)))
            .returning(CategoryEntity::as_returning())
            .get_result(conn)
            .await
            .map_err(AppError::from)?;

    Ok(StdResponse {
        data: Some(category),
        message: Some("Updated category successfully"),
    })
}

/// Soft-delete a category. The row is retained so menu items that referenced
/// it keep resolving in historical views.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Categories"],
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Category ID to delete")
    ),
    responses(
        (status = 200, description = "Deleted category successfully", body = StdResponse<CategoryEntity, String>)
    )
)]
async fn delete_category(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let category: CategoryEntity =
        diesel::update(categories::table.find(id).filter(categories::deleted_at.is_null()))
            .set(categories::deleted_at.eq(diesel::dsl::now))
            .returning(CategoryEntity::as_returning())
            .get_result(conn)
            .await
            .map_err(AppError::from)?;

    Ok(StdResponse {
        data: Some(category),
        message: Some("Deleted category successfully"),
    })
}
