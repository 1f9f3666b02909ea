use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    /// Reject order creation while the restaurant is closed. Off by default
    /// so staff can still key in phone orders outside opening hours.
    pub enforce_opening_hours: bool,
}

pub fn load() -> Result<Config> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .ok()
        .map(|port| port.parse())
        .transpose()
        .context("PORT must be a valid port number")?
        .unwrap_or(3000);
    let enforce_opening_hours = std::env::var("ENFORCE_OPENING_HOURS")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Ok(Config {
        database: DatabaseConfig { url },
        server: ServerConfig { host, port },
        enforce_opening_hours,
    })
}
