//! Repository trait for projects.

use crate::domain::entities::{NewProject, Project};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the owner already has a project with this name.
    async fn create(&self, new_project: NewProject) -> Result<Project, AppError>;

    /// Lists an owner's projects, newest first.
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Project>, AppError>;

    async fn find_by_id(&self, id: i64, owner_id: Uuid) -> Result<Option<Project>, AppError>;
}
