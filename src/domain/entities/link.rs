//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::targeting::TargetingRules;
use super::tracking::TrackingConfig;

/// HTTP status used for a direct redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u16", into = "u16")]
pub enum RedirectType {
    Permanent,
    #[default]
    Temporary,
}

impl RedirectType {
    pub fn status_code(self) -> u16 {
        match self {
            RedirectType::Permanent => 301,
            RedirectType::Temporary => 302,
        }
    }
}

impl TryFrom<u16> for RedirectType {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            301 => Ok(RedirectType::Permanent),
            302 => Ok(RedirectType::Temporary),
            other => Err(format!("redirect_type must be 301 or 302, got {}", other)),
        }
    }
}

impl From<RedirectType> for u16 {
    fn from(value: RedirectType) -> Self {
        value.status_code()
    }
}

/// UTM parameters appended to the destination URL on redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UtmParams {
    /// Returns the non-empty `(utm_*, value)` pairs in canonical order.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("utm_source", &self.source),
            ("utm_medium", &self.medium),
            ("utm_campaign", &self.campaign),
            ("utm_term", &self.term),
            ("utm_content", &self.content),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}

/// One weighted destination in an A/B rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationTarget {
    pub url: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// A shortened link with its access rules.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub destination_url: String,
    pub owner_id: Uuid,
    pub project_id: Option<i64>,
    pub title: Option<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_limit: Option<i64>,
    pub total_clicks: i64,
    pub password_hash: Option<String>,
    pub redirect_type: RedirectType,
    pub targeting: Option<TargetingRules>,
    pub tracking: Option<TrackingConfig>,
    pub utm: Option<UtmParams>,
    pub rotation: Vec<RotationTarget>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if the link has passed its expiry time at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true once the recorded clicks reach the configured limit.
    pub fn is_limit_reached(&self) -> bool {
        self.click_limit
            .is_some_and(|limit| self.total_clicks >= limit)
    }

    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub destination_url: String,
    pub owner_id: Uuid,
    pub project_id: Option<i64>,
    pub title: Option<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_limit: Option<i64>,
    pub password_hash: Option<String>,
    pub redirect_type: RedirectType,
    pub targeting: Option<TargetingRules>,
    pub tracking: Option<TrackingConfig>,
    pub utm: Option<UtmParams>,
    pub rotation: Vec<RotationTarget>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged. Double options distinguish "leave as is"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub destination_url: Option<String>,
    pub project_id: Option<Option<i64>>,
    pub title: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub click_limit: Option<Option<i64>>,
    pub password_hash: Option<Option<String>>,
    pub redirect_type: Option<RedirectType>,
    pub targeting: Option<Option<TargetingRules>>,
    pub tracking: Option<Option<TrackingConfig>>,
    pub utm: Option<Option<UtmParams>>,
    pub rotation: Option<Vec<RotationTarget>>,
}

impl LinkPatch {
    /// Applies the patch to a link in memory.
    pub fn apply_to(self, link: &mut Link) {
        if let Some(v) = self.destination_url {
            link.destination_url = v;
        }
        if let Some(v) = self.project_id {
            link.project_id = v;
        }
        if let Some(v) = self.title {
            link.title = v;
        }
        if let Some(v) = self.is_active {
            link.is_active = v;
        }
        if let Some(v) = self.expires_at {
            link.expires_at = v;
        }
        if let Some(v) = self.click_limit {
            link.click_limit = v;
        }
        if let Some(v) = self.password_hash {
            link.password_hash = v;
        }
        if let Some(v) = self.redirect_type {
            link.redirect_type = v;
        }
        if let Some(v) = self.targeting {
            link.targeting = v;
        }
        if let Some(v) = self.tracking {
            link.tracking = v;
        }
        if let Some(v) = self.utm {
            link.utm = v;
        }
        if let Some(v) = self.rotation {
            link.rotation = v;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::link;
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_link_is_expired() {
        let now = Utc::now();
        let mut l = link("abc123", "https://example.com");
        assert!(!l.is_expired_at(now));

        l.expires_at = Some(now - Duration::days(1));
        assert!(l.is_expired_at(now));

        l.expires_at = Some(now + Duration::days(1));
        assert!(!l.is_expired_at(now));
    }

    #[test]
    fn test_link_limit_reached() {
        let mut l = link("abc123", "https://example.com");
        assert!(!l.is_limit_reached());

        l.click_limit = Some(3);
        l.total_clicks = 2;
        assert!(!l.is_limit_reached());

        l.total_clicks = 3;
        assert!(l.is_limit_reached());

        l.total_clicks = 4;
        assert!(l.is_limit_reached());
    }

    #[test]
    fn test_redirect_type_serde() {
        let t: RedirectType = serde_json::from_str("301").unwrap();
        assert_eq!(t, RedirectType::Permanent);
        assert_eq!(serde_json::to_string(&RedirectType::Temporary).unwrap(), "302");
        assert!(serde_json::from_str::<RedirectType>("307").is_err());
    }

    #[test]
    fn test_utm_pairs_skip_empty() {
        let utm = UtmParams {
            source: Some("newsletter".to_string()),
            medium: Some(String::new()),
            campaign: Some("spring".to_string()),
            term: None,
            content: None,
        };

        assert_eq!(
            utm.pairs(),
            vec![("utm_source", "newsletter"), ("utm_campaign", "spring")]
        );
        assert!(UtmParams::default().is_empty());
    }

    #[test]
    fn test_patch_clears_expiry() {
        let mut l = link("abc123", "https://example.com");
        l.expires_at = Some(Utc::now());

        LinkPatch {
            expires_at: Some(None),
            title: Some(Some("Docs".to_string())),
            ..Default::default()
        }
        .apply_to(&mut l);

        assert!(l.expires_at.is_none());
        assert_eq!(l.title.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_rotation_default_weight() {
        let t: RotationTarget = serde_json::from_str(r#"{"url":"https://a.example"}"#).unwrap();
        assert_eq!(t.weight, 1);
    }
}
