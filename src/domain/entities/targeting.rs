//! Geo and time targeting rules embedded on a link.
//!
//! Stored as JSONB; evaluated by [`crate::domain::targeting`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetingRules {
    #[serde(default)]
    pub geo: Option<GeoRules>,
    #[serde(default)]
    pub time: Option<TimeRules>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRules {
    #[serde(default)]
    pub allowed_countries: Vec<String>,
    #[serde(default)]
    pub blocked_countries: Vec<String>,
    #[serde(default)]
    pub allowed_regions: Vec<String>,
    #[serde(default)]
    pub blocked_regions: Vec<String>,
    #[serde(default)]
    pub redirects: Vec<GeoRedirect>,
}

/// Destination override for visitors from a country, optionally narrowed to a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRedirect {
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
    pub url: String,
}

/// Inclusive hour window. `start > end` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u8,
    pub end: u8,
}

impl HourWindow {
    pub fn contains(&self, hour: u8) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour <= self.end
        } else {
            !(hour < self.start && hour > self.end)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRules {
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Days of week, 0 = Sunday through 6 = Saturday. Empty allows every day.
    #[serde(default)]
    pub allowed_days: Vec<u8>,
    #[serde(default)]
    pub allowed_hours: Option<HourWindow>,
    /// Offset applied to `now` before day/hour checks.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub redirects: Vec<TimeRedirect>,
}

/// Destination override for matching days and hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRedirect {
    #[serde(default)]
    pub days: Vec<u8>,
    #[serde(default)]
    pub hours: Option<HourWindow>,
    pub url: String,
}
