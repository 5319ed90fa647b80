//! Project management.

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewProject, Project};
use crate::domain::repositories::ProjectRepository;
use crate::error::AppError;

pub const MAX_PROJECT_NAME_LEN: usize = 100;

pub struct ProjectService {
    repository: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    pub fn new(repository: Arc<dyn ProjectRepository>) -> Self {
        Self { repository }
    }

    /// Creates a project for `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` for a blank or overlong name and
    /// `CONFLICT` if the owner already uses the name.
    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<String>,
    ) -> Result<Project, AppError> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_PROJECT_NAME_LEN {
            return Err(AppError::bad_request(
                format!("Project name must be 1-{} characters", MAX_PROJECT_NAME_LEN),
                json!({ "name": name }),
            ));
        }

        let project = self
            .repository
            .create(NewProject {
                owner_id,
                name: name.to_string(),
                description: description.filter(|d| !d.trim().is_empty()),
            })
            .await?;

        tracing::info!(project_id = project.id, owner_id = %owner_id, "Project created");
        Ok(project)
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Project>, AppError> {
        self.repository.list(owner_id).await
    }
}
