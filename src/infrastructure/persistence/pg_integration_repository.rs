//! PostgreSQL implementation of integration repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Integration, IntegrationConfig};
use crate::domain::repositories::IntegrationRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct IntegrationRow {
    id: i64,
    owner_id: Uuid,
    enabled: bool,
    config: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
}

pub struct PgIntegrationRepository {
    pool: Arc<PgPool>,
}

impl PgIntegrationRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntegrationRepository for PgIntegrationRepository {
    async fn list_enabled(&self, owner_id: Uuid) -> Result<Vec<Integration>, AppError> {
        let rows: Vec<IntegrationRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, enabled, config, created_at
            FROM integrations
            WHERE owner_id = $1 AND enabled
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        // Unrecognised integration types are skipped rather than failing the redirect.
        Ok(rows
            .into_iter()
            .filter_map(|r| {
                match serde_json::from_value::<IntegrationConfig>(r.config.0) {
                    Ok(config) => Some(Integration {
                        id: r.id,
                        owner_id: r.owner_id,
                        enabled: r.enabled,
                        config,
                        created_at: r.created_at,
                    }),
                    Err(e) => {
                        tracing::warn!(integration_id = r.id, error = %e, "Skipping malformed integration");
                        None
                    }
                }
            })
            .collect())
    }
}
