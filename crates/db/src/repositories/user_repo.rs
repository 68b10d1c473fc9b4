//! Repository for the `users` table.

use prana_core::device::DeviceTokenMap;
use sqlx::PgPool;

use crate::models::user::UserDevices;

/// Reads and prunes per-user device registrations.
pub struct UserRepo;

impl UserRepo {
    /// Fetch a user's device registrations.
    ///
    /// Returns `None` when no row exists for `uid`.
    pub async fn find_devices(pool: &PgPool, uid: &str) -> Result<Option<UserDevices>, sqlx::Error> {
        sqlx::query_as::<_, UserDevices>(
            "SELECT uid, device_tokens FROM users WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(pool)
        .await
    }

    /// Convenience wrapper over [`find_devices`](Self::find_devices) that
    /// yields only the map.
    pub async fn find_device_tokens(
        pool: &PgPool,
        uid: &str,
    ) -> Result<Option<DeviceTokenMap>, sqlx::Error> {
        Ok(Self::find_devices(pool, uid)
            .await?
            .map(|row| row.device_tokens.0))
    }

    /// Delete the given keys from the user's `device_tokens` map.
    ///
    /// Uses `jsonb - text[]`, so keys written concurrently by other sessions
    /// are left alone and already-missing keys are a no-op. Returns the number
    /// of rows touched (0 or 1).
    pub async fn remove_device_tokens(
        pool: &PgPool,
        uid: &str,
        tokens: &[String],
    ) -> Result<u64, sqlx::Error> {
        if tokens.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE users \
             SET device_tokens = device_tokens - $2::text[], updated_at = NOW() \
             WHERE uid = $1",
        )
        .bind(uid)
        .bind(tokens)
        .execute(pool)
        .await?;

        tracing::debug!(uid, removed = tokens.len(), "Pruned device tokens");
        Ok(result.rows_affected())
    }
}
