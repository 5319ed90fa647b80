//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{
    Link, LinkPatch, NewLink, RedirectType, RotationTarget, TargetingRules, TrackingConfig,
    UtmParams,
};
use crate::domain::repositories::{LinkFilter, LinkRepository};
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, short_code, destination_url, owner_id, project_id, title, \
     is_active, expires_at, click_limit, total_clicks, password_hash, redirect_type, \
     targeting, tracking, utm, rotation, created_at, updated_at, deleted_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    destination_url: String,
    owner_id: Uuid,
    project_id: Option<i64>,
    title: Option<String>,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    click_limit: Option<i64>,
    total_clicks: i64,
    password_hash: Option<String>,
    redirect_type: i16,
    targeting: Option<Json<TargetingRules>>,
    tracking: Option<Json<TrackingConfig>>,
    utm: Option<Json<UtmParams>>,
    rotation: Json<Vec<RotationTarget>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        // The column is constrained to 301/302.
        let redirect_type = u16::try_from(r.redirect_type)
            .ok()
            .and_then(|v| RedirectType::try_from(v).ok())
            .unwrap_or_default();

        Link {
            id: r.id,
            short_code: r.short_code,
            destination_url: r.destination_url,
            owner_id: r.owner_id,
            project_id: r.project_id,
            title: r.title,
            is_active: r.is_active,
            expires_at: r.expires_at,
            click_limit: r.click_limit,
            total_clicks: r.total_clicks,
            password_hash: r.password_hash,
            redirect_type,
            targeting: r.targeting.map(|j| j.0),
            tracking: r.tracking.map(|j| j.0),
            utm: r.utm.map(|j| j.0),
            rotation: r.rotation.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        }
    }
}

fn redirect_status(t: RedirectType) -> i16 {
    match t {
        RedirectType::Permanent => 301,
        RedirectType::Temporary => 302,
    }
}

/// PostgreSQL repository for link storage and retrieval.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Appends the owner scope and filter predicates shared by `list` and `count`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, owner_id: Uuid, filter: &LinkFilter) {
    qb.push(" WHERE deleted_at IS NULL AND owner_id = ");
    qb.push_bind(owner_id);

    if let Some(project_id) = filter.project_id {
        qb.push(" AND project_id = ");
        qb.push_bind(project_id);
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (short_code ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR destination_url ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR title ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            INSERT INTO links (
                short_code, destination_url, owner_id, project_id, title, is_active,
                expires_at, click_limit, password_hash, redirect_type,
                targeting, tracking, utm, rotation
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row: LinkRow = sqlx::query_as(&sql)
            .bind(new_link.short_code)
            .bind(new_link.destination_url)
            .bind(new_link.owner_id)
            .bind(new_link.project_id)
            .bind(new_link.title)
            .bind(new_link.is_active)
            .bind(new_link.expires_at)
            .bind(new_link.click_limit)
            .bind(new_link.password_hash)
            .bind(redirect_status(new_link.redirect_type))
            .bind(new_link.targeting.map(Json))
            .bind(new_link.tracking.map(Json))
            .bind(new_link.utm.map(Json))
            .bind(Json(new_link.rotation))
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_code = $1 AND deleted_at IS NULL"
        );

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(short_code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_id(&self, id: i64, owner_id: Uuid) -> Result<Option<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL"
        );

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn code_exists(&self, short_code: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM links WHERE short_code = $1)")
                .bind(short_code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn list(&self, owner_id: Uuid, filter: LinkFilter) -> Result<Vec<Link>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {LINK_COLUMNS} FROM links"));
        push_filter(&mut qb, owner_id, &filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(filter.limit);
        qb.push(" OFFSET ");
        qb.push_bind(filter.offset);

        let rows: Vec<LinkRow> = qb
            .build_query_as()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count(&self, owner_id: Uuid, filter: LinkFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM links");
        push_filter(&mut qb, owner_id, &filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, owner_id: Uuid, patch: LinkPatch) -> Result<Link, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE links SET updated_at = NOW()");

        if let Some(v) = patch.destination_url {
            qb.push(", destination_url = ").push_bind(v);
        }
        if let Some(v) = patch.project_id {
            qb.push(", project_id = ").push_bind(v);
        }
        if let Some(v) = patch.title {
            qb.push(", title = ").push_bind(v);
        }
        if let Some(v) = patch.is_active {
            qb.push(", is_active = ").push_bind(v);
        }
        if let Some(v) = patch.expires_at {
            qb.push(", expires_at = ").push_bind(v);
        }
        if let Some(v) = patch.click_limit {
            qb.push(", click_limit = ").push_bind(v);
        }
        if let Some(v) = patch.password_hash {
            qb.push(", password_hash = ").push_bind(v);
        }
        if let Some(v) = patch.redirect_type {
            qb.push(", redirect_type = ").push_bind(redirect_status(v));
        }
        if let Some(v) = patch.targeting {
            qb.push(", targeting = ").push_bind(v.map(Json));
        }
        if let Some(v) = patch.tracking {
            qb.push(", tracking = ").push_bind(v.map(Json));
        }
        if let Some(v) = patch.utm {
            qb.push(", utm = ").push_bind(v.map(Json));
        }
        if let Some(v) = patch.rotation {
            qb.push(", rotation = ").push_bind(Json(v));
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND owner_id = ").push_bind(owner_id);
        qb.push(" AND deleted_at IS NULL RETURNING ");
        qb.push(LINK_COLUMNS);

        let row: Option<LinkRow> = qb
            .build_query_as()
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::from).ok_or_else(|| {
            AppError::not_found("Link not found", serde_json::json!({ "id": id }))
        })
    }

    async fn soft_delete(&self, id: i64, owner_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET deleted_at = NOW(), updated_at = NOW(), is_active = FALSE
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_filter_sql() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM links");
        push_filter(
            &mut qb,
            Uuid::nil(),
            &LinkFilter {
                project_id: Some(3),
                search: Some("promo".to_string()),
                ..Default::default()
            },
        );

        let sql = qb.sql();
        assert!(sql.contains("deleted_at IS NULL AND owner_id = $1"));
        assert!(sql.contains("project_id = $2"));
        assert!(sql.contains("title ILIKE $5"));
    }
}
