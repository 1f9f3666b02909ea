use serde::Serialize;
use utoipa::ToSchema;

pub mod categories;
pub mod delivery_zones;
pub mod menus;
pub mod orders;
pub mod restaurant_profile;
pub mod settings;
pub mod user_addresses;

/// Minimal acknowledgement body for operations with nothing else to return.
#[derive(Serialize, ToSchema)]
pub struct SuccessRes {
    pub success: bool,
}
