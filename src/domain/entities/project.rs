//! Project entity grouping an owner's links.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input data for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}
