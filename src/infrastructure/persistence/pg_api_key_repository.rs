//! PostgreSQL implementation of API key repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::repositories::{ApiKey, ApiKeyRepository};
use crate::error::AppError;

const KEY_COLUMNS: &str = "id, owner_id, name, key_hash, created_at, last_used_at, revoked_at";

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    id: i64,
    owner_id: Uuid,
    name: String,
    key_hash: String,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<ApiKeyRow> for ApiKey {
    fn from(r: ApiKeyRow) -> Self {
        ApiKey {
            id: r.id,
            owner_id: r.owner_id,
            name: r.name,
            key_hash: r.key_hash,
            created_at: r.created_at,
            last_used_at: r.last_used_at,
            revoked_at: r.revoked_at,
        }
    }
}

/// PostgreSQL repository for API key storage and validation.
///
/// Stores HMAC hashes only. Raw keys are never persisted.
pub struct PgApiKeyRepository {
    pool: Arc<PgPool>,
}

impl PgApiKeyRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let sql =
            format!("SELECT {KEY_COLUMNS} FROM api_keys WHERE key_hash = $1 AND revoked_at IS NULL");

        let row: Option<ApiKeyRow> = sqlx::query_as(&sql)
            .bind(key_hash)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ApiKey::from))
    }

    async fn update_last_used(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1 AND revoked_at IS NULL")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn create(&self, owner_id: Uuid, name: &str, key_hash: &str) -> Result<ApiKey, AppError> {
        let sql = format!(
            "INSERT INTO api_keys (owner_id, name, key_hash) VALUES ($1, $2, $3) RETURNING {KEY_COLUMNS}"
        );

        let row: ApiKeyRow = sqlx::query_as(&sql)
            .bind(owner_id)
            .bind(name)
            .bind(key_hash)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<ApiKey>, AppError> {
        let sql = format!(
            "SELECT {KEY_COLUMNS} FROM api_keys \
             WHERE ($1::uuid IS NULL OR owner_id = $1) \
             ORDER BY created_at DESC, id DESC"
        );

        let rows: Vec<ApiKeyRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(ApiKey::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiKey>, AppError> {
        let sql = format!("SELECT {KEY_COLUMNS} FROM api_keys WHERE id = $1");

        let row: Option<ApiKeyRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ApiKey::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiKey>, AppError> {
        let sql = format!(
            "SELECT {KEY_COLUMNS} FROM api_keys WHERE name = $1 ORDER BY created_at DESC LIMIT 1"
        );

        let row: Option<ApiKeyRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ApiKey::from))
    }

    async fn revoke(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE api_keys SET revoked_at = COALESCE(revoked_at, NOW()) WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("API key not found", json!({ "id": id })));
        }

        Ok(())
    }
}
