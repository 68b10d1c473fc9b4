//! Document-store seam for user records.

use async_trait::async_trait;
use prana_core::device::DeviceTokenMap;
use prana_db::{DbPool, UserRepo};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read and prune access to user device registrations.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// The user's device-token map, or `None` if the user does not exist.
    async fn device_tokens(&self, uid: &str) -> Result<Option<DeviceTokenMap>, StoreError>;

    /// Delete exactly `tokens` from the user's map in one update.
    async fn remove_device_tokens(&self, uid: &str, tokens: &[String]) -> Result<(), StoreError>;
}

/// [`UserStore`] backed by the PostgreSQL `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn device_tokens(&self, uid: &str) -> Result<Option<DeviceTokenMap>, StoreError> {
        Ok(UserRepo::find_device_tokens(&self.pool, uid).await?)
    }

    async fn remove_device_tokens(&self, uid: &str, tokens: &[String]) -> Result<(), StoreError> {
        let touched = UserRepo::remove_device_tokens(&self.pool, uid, tokens).await?;
        if touched == 0 {
            tracing::debug!(uid, "User row vanished before token pruning");
        }
        Ok(())
    }
}
