//! Handlers for project endpoints.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::projects::{CreateProjectRequest, ProjectListResponse, ProjectResponse};
use crate::application::services::AuthContext;
use crate::error::AppError;
use crate::state::AppState;

/// `POST /api/projects`
///
/// # Errors
///
/// - 400 `VALIDATION_ERROR` for an empty or overlong name
/// - 409 `CONFLICT` when the caller already has a project with that name
pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    payload.validate()?;

    let project = state
        .project_service
        .create(auth.owner_id, &payload.name, payload.description)
        .await?;

    Ok((StatusCode::CREATED, Json(project.into())))
}

/// `GET /api/projects`
pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProjectListResponse>, AppError> {
    let projects = state.project_service.list(auth.owner_id).await?;

    Ok(Json(ProjectListResponse {
        data: projects.into_iter().map(ProjectResponse::from).collect(),
    }))
}
