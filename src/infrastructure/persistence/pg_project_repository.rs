//! PostgreSQL implementation of project repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewProject, Project};
use crate::domain::repositories::ProjectRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    owner_id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(r: ProjectRow) -> Self {
        Project {
            id: r.id,
            owner_id: r.owner_id,
            name: r.name,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

pub struct PgProjectRepository {
    pool: Arc<PgPool>,
}

impl PgProjectRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, new_project: NewProject) -> Result<Project, AppError> {
        let row: ProjectRow = sqlx::query_as(
            r#"
            INSERT INTO projects (owner_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, description, created_at
            "#,
        )
        .bind(new_project.owner_id)
        .bind(new_project.name)
        .bind(new_project.description)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<Project>, AppError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, description, created_at
            FROM projects
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn find_by_id(&self, id: i64, owner_id: Uuid) -> Result<Option<Project>, AppError> {
        let row: Option<ProjectRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, description, created_at
            FROM projects
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Project::from))
    }
}
