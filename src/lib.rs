pub mod core;
pub mod defaults;
pub mod models;
pub mod opening_hours;
pub mod order_status;
pub mod pricing;
pub mod routes;
pub mod schema;
pub mod zones;
