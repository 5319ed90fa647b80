//! Repository trait for API key authentication.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// API key entity with metadata.
///
/// Keys are stored as HMAC-SHA256 hashes; the raw key is shown once at creation.
#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: i64,
    pub owner_id: Uuid,
    pub name: String,
    pub key_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Repository interface for API key management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgApiKeyRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Looks up a non-revoked key by its hash.
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError>;

    /// Updates the `last_used_at` timestamp for a key.
    async fn update_last_used(&self, id: i64) -> Result<(), AppError>;

    /// Creates a new API key for an owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a key with the same hash already exists.
    async fn create(&self, owner_id: Uuid, name: &str, key_hash: &str) -> Result<ApiKey, AppError>;

    /// Lists keys, optionally restricted to one owner.
    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<ApiKey>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiKey>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiKey>, AppError>;

    /// Sets `revoked_at`, preventing further authentication.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the key does not exist.
    async fn revoke(&self, id: i64) -> Result<(), AppError>;
}
