//! DTOs for link analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Click;
use crate::domain::repositories::{Breakdown, DailyClicks, LinkAnalytics};
use crate::utils::ip::mask_ip;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    /// `24h`, `7d` (default), `30d` or `90d`.
    pub period: Option<String>,
}

/// A recorded click as exposed by the API. The IP is always masked.
#[derive(Debug, Serialize)]
pub struct ClickInfo {
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub country: String,
    pub country_code: String,
    pub region: String,
    pub city: String,
}

impl From<Click> for ClickInfo {
    fn from(c: Click) -> Self {
        Self {
            clicked_at: c.clicked_at,
            ip: c.ip.as_deref().map(mask_ip),
            user_agent: c.user_agent,
            referer: c.referer,
            device: c.device,
            browser: c.browser,
            os: c.os,
            country: c.country,
            country_code: c.country_code,
            region: c.region,
            city: c.city,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub link_id: i64,
    pub period: &'static str,
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub clicks_by_day: Vec<DailyClicks>,
    pub devices: Vec<Breakdown>,
    pub browsers: Vec<Breakdown>,
    pub operating_systems: Vec<Breakdown>,
    pub countries: Vec<Breakdown>,
    pub referrers: Vec<Breakdown>,
    pub recent_clicks: Vec<ClickInfo>,
}

impl AnalyticsResponse {
    pub fn new(link_id: i64, period: &'static str, a: LinkAnalytics) -> Self {
        Self {
            link_id,
            period,
            total_clicks: a.total_clicks,
            unique_visitors: a.unique_visitors,
            clicks_by_day: a.clicks_by_day,
            devices: a.devices,
            browsers: a.browsers,
            operating_systems: a.operating_systems,
            countries: a.countries,
            referrers: a.referrers,
            recent_clicks: a.recent_clicks.into_iter().map(ClickInfo::from).collect(),
        }
    }
}
