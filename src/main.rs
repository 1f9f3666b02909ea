use anyhow::Result;
use axum::Router;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use foodly_orderservice::core::{app_state::AppState, bootstrap, config, db, swagger};
use foodly_orderservice::{defaults, routes};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let routes = routes::menus::routes_with_openapi()
        .merge(routes::categories::routes_with_openapi())
        .merge(routes::delivery_zones::routes_with_openapi())
        .merge(routes::orders::routes_with_openapi())
        .merge(routes::restaurant_profile::routes_with_openapi())
        .merge(routes::settings::routes_with_openapi())
        .merge(routes::user_addresses::routes_with_openapi());

    let mut openapi = routes.get_openapi().clone();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Foodly OrderService API")
        .version("1.0.0")
        .build();
    let swagger_ui = swagger::create_swagger_ui(openapi)?;

    tracing::info!("Running migrations...");
    let config = config::load()?;
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    let state = AppState::from_config(&config).await?;

    tracing::info!("Seeding singleton rows...");
    defaults::ensure_defaults(&state).await?;

    let app = Router::new()
        .merge(routes)
        .merge(swagger_ui)
        .with_state(state);

    bootstrap::serve("OrderService", app, &config).await?;
    Ok(())
}
