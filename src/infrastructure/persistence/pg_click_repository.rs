//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::{
    Breakdown, ClickRepository, DailyClicks, LinkAnalytics, OwnerStats,
};
use crate::error::AppError;

/// Rows returned per breakdown dimension.
const BREAKDOWN_LIMIT: i64 = 10;

const CLICK_COLUMNS: &str = "id, link_id, clicked_at, ip, user_agent, referer, device, browser, \
     os, country, country_code, region, city";

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
    device: String,
    browser: String,
    os: String,
    country: String,
    country_code: String,
    region: String,
    city: String,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click {
            id: r.id,
            link_id: r.link_id,
            clicked_at: r.clicked_at,
            ip: r.ip,
            user_agent: r.user_agent,
            referer: r.referer,
            device: r.device,
            browser: r.browser,
            os: r.os,
            country: r.country,
            country_code: r.country_code,
            region: r.region,
            city: r.city,
        }
    }
}

/// Grouping expressions for the analytics breakdowns.
#[derive(Debug, Clone, Copy)]
enum Dimension {
    Device,
    Browser,
    Os,
    Country,
    Referrer,
}

impl Dimension {
    fn expression(self) -> &'static str {
        match self {
            Dimension::Device => "device",
            Dimension::Browser => "browser",
            Dimension::Os => "os",
            Dimension::Country => "country",
            Dimension::Referrer => "COALESCE(NULLIF(referer, ''), 'Direct')",
        }
    }
}

/// PostgreSQL repository for click recording and analytics.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn breakdown(
        &self,
        dimension: Dimension,
        link_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Breakdown>, AppError> {
        let expr = dimension.expression();
        let sql = format!(
            r#"
            SELECT {expr} AS label, COUNT(*) AS clicks
            FROM link_clicks
            WHERE link_id = $1 AND clicked_at >= $2
            GROUP BY 1
            ORDER BY clicks DESC, label ASC
            LIMIT $3
            "#
        );

        let rows: Vec<(String, i64)> = sqlx::query_as(&sql)
            .bind(link_id)
            .bind(since)
            .bind(BREAKDOWN_LIMIT)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(label, clicks)| Breakdown { label, clicks })
            .collect())
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE links SET total_clicks = total_clicks + 1 WHERE id = $1")
            .bind(new_click.link_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::bad_request(
                "Link does not exist",
                json!({ "link_id": new_click.link_id }),
            ));
        }

        let sql = format!(
            r#"
            INSERT INTO link_clicks (
                link_id, clicked_at, ip, user_agent, referer, device, browser, os,
                country, country_code, region, city
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {CLICK_COLUMNS}
            "#
        );

        let location = new_click.location;
        let row: ClickRow = sqlx::query_as(&sql)
            .bind(new_click.link_id)
            .bind(new_click.clicked_at)
            .bind(new_click.ip)
            .bind(new_click.user_agent)
            .bind(new_click.referer)
            .bind(new_click.device)
            .bind(new_click.browser)
            .bind(new_click.os)
            .bind(location.country)
            .bind(location.country_code)
            .bind(location.region)
            .bind(location.city)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn link_analytics(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
        recent_limit: i64,
    ) -> Result<LinkAnalytics, AppError> {
        let (total_clicks, unique_visitors): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(DISTINCT ip)
            FROM link_clicks
            WHERE link_id = $1 AND clicked_at >= $2
            "#,
        )
        .bind(link_id)
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        let days: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT (clicked_at AT TIME ZONE 'UTC')::date AS day, COUNT(*)
            FROM link_clicks
            WHERE link_id = $1 AND clicked_at >= $2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(link_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        let recent_sql = format!(
            "SELECT {CLICK_COLUMNS} FROM link_clicks WHERE link_id = $1 \
             ORDER BY clicked_at DESC, id DESC LIMIT $2"
        );
        let recent: Vec<ClickRow> = sqlx::query_as(&recent_sql)
            .bind(link_id)
            .bind(recent_limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(LinkAnalytics {
            total_clicks,
            unique_visitors,
            clicks_by_day: days
                .into_iter()
                .map(|(date, clicks)| DailyClicks { date, clicks })
                .collect(),
            devices: self.breakdown(Dimension::Device, link_id, since).await?,
            browsers: self.breakdown(Dimension::Browser, link_id, since).await?,
            operating_systems: self.breakdown(Dimension::Os, link_id, since).await?,
            countries: self.breakdown(Dimension::Country, link_id, since).await?,
            referrers: self.breakdown(Dimension::Referrer, link_id, since).await?,
            recent_clicks: recent.into_iter().map(Click::from).collect(),
        })
    }

    async fn owner_stats(
        &self,
        owner_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<OwnerStats, AppError> {
        let (total_links, active_links, total_clicks, clicks_last_24h, total_projects): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM links WHERE owner_id = $1 AND deleted_at IS NULL),
                (SELECT COUNT(*) FROM links
                  WHERE owner_id = $1 AND deleted_at IS NULL AND is_active
                    AND (expires_at IS NULL OR expires_at > NOW())),
                (SELECT COALESCE(SUM(total_clicks), 0)::bigint FROM links
                  WHERE owner_id = $1 AND deleted_at IS NULL),
                (SELECT COUNT(*) FROM link_clicks c
                   JOIN links l ON l.id = c.link_id
                  WHERE l.owner_id = $1 AND c.clicked_at >= $2),
                (SELECT COUNT(*) FROM projects WHERE owner_id = $1)
            "#,
        )
        .bind(owner_id)
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(OwnerStats {
            total_links,
            active_links,
            total_clicks,
            clicks_last_24h,
            total_projects,
        })
    }
}
