//! Link analytics and account statistics.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::repositories::{ClickRepository, LinkAnalytics, LinkRepository, OwnerStats};
use crate::error::AppError;

/// Number of raw clicks returned with link analytics.
pub const RECENT_CLICKS: i64 = 20;

/// Analytics window, written as `24h`, `7d`, `30d` or `90d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalyticsPeriod {
    #[serde(rename = "24h")]
    Day,
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl AnalyticsPeriod {
    pub fn duration(self) -> Duration {
        match self {
            AnalyticsPeriod::Day => Duration::hours(24),
            AnalyticsPeriod::Week => Duration::days(7),
            AnalyticsPeriod::Month => Duration::days(30),
            AnalyticsPeriod::Quarter => Duration::days(90),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnalyticsPeriod::Day => "24h",
            AnalyticsPeriod::Week => "7d",
            AnalyticsPeriod::Month => "30d",
            AnalyticsPeriod::Quarter => "90d",
        }
    }

    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

impl FromStr for AnalyticsPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(AnalyticsPeriod::Day),
            "7d" => Ok(AnalyticsPeriod::Week),
            "30d" => Ok(AnalyticsPeriod::Month),
            "90d" => Ok(AnalyticsPeriod::Quarter),
            other => Err(AppError::bad_request(
                "period must be one of 24h, 7d, 30d, 90d",
                json!({ "period": other }),
            )),
        }
    }
}

pub struct StatsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
}

impl StatsService {
    pub fn new(links: Arc<dyn LinkRepository>, clicks: Arc<dyn ClickRepository>) -> Self {
        Self { links, clicks }
    }

    /// Aggregates clicks of one of the owner's links over `period`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` if the link does not belong to `owner_id`.
    pub async fn link_analytics(
        &self,
        owner_id: Uuid,
        link_id: i64,
        period: AnalyticsPeriod,
        now: DateTime<Utc>,
    ) -> Result<LinkAnalytics, AppError> {
        if self.links.find_by_id(link_id, owner_id).await?.is_none() {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "id": link_id }),
            ));
        }

        self.clicks
            .link_analytics(link_id, period.since(now), RECENT_CLICKS)
            .await
    }

    pub async fn owner_stats(&self, owner_id: Uuid, now: DateTime<Utc>) -> Result<OwnerStats, AppError> {
        self.clicks
            .owner_stats(owner_id, now - Duration::hours(24))
            .await
    }
}
