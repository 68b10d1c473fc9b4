//! User document model.

use prana_core::device::DeviceTokenMap;
use sqlx::types::Json;
use sqlx::FromRow;

/// The device-registration slice of a row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserDevices {
    pub uid: String,
    pub device_tokens: Json<DeviceTokenMap>,
}
