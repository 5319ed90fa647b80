//! Repository trait for click recording and analytics.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Click count for a single label (device type, browser, country, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub label: String,
    pub clicks: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: i64,
}

/// Aggregated click analytics for one link over a time window.
#[derive(Debug, Clone, Default)]
pub struct LinkAnalytics {
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub clicks_by_day: Vec<DailyClicks>,
    pub devices: Vec<Breakdown>,
    pub browsers: Vec<Breakdown>,
    pub operating_systems: Vec<Breakdown>,
    pub countries: Vec<Breakdown>,
    pub referrers: Vec<Breakdown>,
    pub recent_clicks: Vec<Click>,
}

/// Account-wide totals for an owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnerStats {
    pub total_links: i64,
    pub active_links: i64,
    pub total_clicks: i64,
    pub clicks_last_24h: i64,
    pub total_projects: i64,
}

/// Repository interface for click tracking and statistics.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends one click row and bumps the link's counter in the same
    /// transaction (`total_clicks = total_clicks + 1`).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the referenced link does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Aggregates clicks of a link recorded at or after `since`.
    ///
    /// `recent_limit` bounds the number of raw clicks returned.
    async fn link_analytics(
        &self,
        link_id: i64,
        since: DateTime<Utc>,
        recent_limit: i64,
    ) -> Result<LinkAnalytics, AppError>;

    /// Computes account totals; `since` bounds `clicks_last_24h`.
    async fn owner_stats(&self, owner_id: Uuid, since: DateTime<Utc>)
    -> Result<OwnerStats, AppError>;
}
