//! Click entity representing a single resolved visit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used when a location or client attribute cannot be derived.
pub const UNKNOWN: &str = "Unknown";

/// Geographic location of a visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// ISO 3166-1 alpha-2 code, or [`UNKNOWN`].
    pub country_code: String,
    pub country: String,
    /// Region (state/province) code, or [`UNKNOWN`].
    pub region: String,
    pub city: String,
}

impl GeoLocation {
    pub fn unknown() -> Self {
        Self {
            country_code: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.country_code == UNKNOWN
    }
}

impl Default for GeoLocation {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A click recorded when a link resolves to its destination.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
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

/// Input data for recording a click.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    /// Request time, not the time the worker writes the row.
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub location: GeoLocation,
}
