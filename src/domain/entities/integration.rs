//! Owner-level integrations applied to every link the owner has.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tracking::{Placement, ScriptKind, TrackingScript};

#[derive(Debug, Clone)]
pub struct Integration {
    pub id: i64,
    pub owner_id: Uuid,
    pub enabled: bool,
    pub config: IntegrationConfig,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrationConfig {
    GoogleAnalytics { measurement_id: String },
    FacebookPixel { pixel_id: String },
    Webhook {
        url: String,
        #[serde(default)]
        secret: Option<String>,
    },
}

/// Webhook endpoint notified after a click is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub integration_id: i64,
    pub url: String,
    pub secret: Option<String>,
}

impl Integration {
    /// Head script contributed to the interstitial, if this is an analytics integration.
    pub fn tracking_script(&self) -> Option<TrackingScript> {
        let kind = match &self.config {
            IntegrationConfig::GoogleAnalytics { measurement_id } => ScriptKind::GoogleAnalytics {
                measurement_id: measurement_id.clone(),
            },
            IntegrationConfig::FacebookPixel { pixel_id } => ScriptKind::FacebookPixel {
                pixel_id: pixel_id.clone(),
            },
            IntegrationConfig::Webhook { .. } => return None,
        };

        Some(TrackingScript {
            kind,
            enabled: self.enabled,
            placement: Placement::Head,
        })
    }

    pub fn webhook_target(&self) -> Option<WebhookTarget> {
        match &self.config {
            IntegrationConfig::Webhook { url, secret } if self.enabled => Some(WebhookTarget {
                integration_id: self.id,
                url: url.clone(),
                secret: secret.clone(),
            }),
            _ => None,
        }
    }
}
