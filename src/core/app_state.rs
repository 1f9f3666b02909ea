use anyhow::{Context, Result};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;

use crate::core::config::Config;

pub type DbPool = Pool<AsyncPgConnection>;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub config: Config,
}

impl AppState {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database.url);
        let db_pool = Pool::builder()
            .build(manager)
            .await
            .context("Failed to build DB connection pool")?;

        Ok(Self {
            db_pool,
            config: config.clone(),
        })
    }
}
