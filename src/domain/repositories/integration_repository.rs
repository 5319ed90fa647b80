//! Repository trait for owner integrations.

use crate::domain::entities::Integration;
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    /// Returns the owner's enabled integrations in creation order.
    async fn list_enabled(&self, owner_id: Uuid) -> Result<Vec<Integration>, AppError>;
}
