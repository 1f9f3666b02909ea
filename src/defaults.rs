use anyhow::{Context, Result};
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::core::app_state::AppState;
use crate::opening_hours;
use crate::schema::{restaurant_profile, settings};

/// Seeds the two singleton rows at startup. Handlers read them without any
/// lazy get-or-create fallback, so startup must guarantee they exist.
pub async fn ensure_defaults(state: &AppState) -> Result<()> {
    let mut conn = state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;
    ensure_settings(&mut conn).await?;
    ensure_restaurant_profile(&mut conn).await?;
    Ok(())
}

async fn ensure_settings(conn: &mut AsyncPgConnection) -> Result<()> {
    let existing: i64 = settings::table
        .count()
        .get_result(conn)
        .await
        .context("Failed to count settings rows")?;
    if existing == 0 {
        diesel::insert_into(settings::table)
            .default_values()
            .execute(conn)
            .await
            .context("Failed to seed settings")?;
        tracing::info!("Seeded default settings");
    }
    Ok(())
}

async fn ensure_restaurant_profile(conn: &mut AsyncPgConnection) -> Result<()> {
    let existing: i64 = restaurant_profile::table
        .count()
        .get_result(conn)
        .await
        .context("Failed to count restaurant profile rows")?;
    if existing == 0 {
        let opening_hours = serde_json::to_value(opening_hours::default_opening_hours())
            .context("Failed to serialize default opening hours")?;
        diesel::insert_into(restaurant_profile::table)
            .values((
                restaurant_profile::opening_hours.eq(opening_hours),
                restaurant_profile::holiday_closures.eq(serde_json::json!([])),
                restaurant_profile::special_hours.eq(serde_json::json!([])),
            ))
            .execute(conn)
            .await
            .context("Failed to seed restaurant profile")?;
        tracing::info!("Seeded default restaurant profile");
    }
    Ok(())
}
