pub mod alerts;
pub mod rules;
pub mod telemetry;

use guardian_core::error::CoreError;
use guardian_core::types::DbId;
use guardian_db::models::device::Device;
use guardian_db::repositories::DeviceRepo;
use sqlx::PgPool;

use crate::error::AppResult;

/// Load a device by internal id or fail with 404.
pub(crate) async fn find_device(pool: &PgPool, id: DbId) -> AppResult<Device> {
    DeviceRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        CoreError::NotFound {
            entity: "Device",
            id,
        }
        .into()
    })
}
