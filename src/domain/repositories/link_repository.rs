//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Filter and pagination for listing an owner's links.
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    pub project_id: Option<i64>,
    /// Case-insensitive match on short code, destination or title.
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] (`SHORT_CODE_TAKEN`) if the code exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a non-deleted link by its short code (case-sensitive).
    ///
    /// Inactive links are returned; callers decide how to treat them.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a non-deleted link by id, scoped to its owner.
    async fn find_by_id(&self, id: i64, owner_id: Uuid) -> Result<Option<Link>, AppError>;

    /// Returns true if any link, deleted or not, already uses the code.
    async fn code_exists(&self, short_code: &str) -> Result<bool, AppError>;

    /// Lists an owner's links, newest first.
    async fn list(&self, owner_id: Uuid, filter: LinkFilter) -> Result<Vec<Link>, AppError>;

    /// Counts an owner's links matching the filter (pagination ignored).
    async fn count(&self, owner_id: Uuid, filter: LinkFilter) -> Result<i64, AppError>;

    /// Partially updates a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no live link matches `id` + `owner_id`.
    async fn update(&self, id: i64, owner_id: Uuid, patch: LinkPatch) -> Result<Link, AppError>;

    /// Soft-deletes a link. Returns `Ok(false)` if not found or already deleted.
    async fn soft_delete(&self, id: i64, owner_id: Uuid) -> Result<bool, AppError>;
}
