//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{Click, GeoLocation, WebhookTarget};

/// A granted visit, handed from the redirect handler to the click worker.
///
/// Carries everything the worker needs so it never has to reload the link:
/// the request metadata, the location if the resolver already looked it up,
/// and the owner's webhook targets.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub short_code: String,
    pub owner_id: Uuid,
    pub destination_url: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    /// Set when geo targeting required a lookup during resolution.
    pub location: Option<GeoLocation>,
    pub webhooks: Vec<WebhookTarget>,
    pub clicked_at: DateTime<Utc>,
}

/// JSON body POSTed to webhook integrations after a click is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub event: &'static str,
    pub link_id: i64,
    pub short_code: String,
    pub destination_url: String,
    pub clicked_at: DateTime<Utc>,
    pub referer: Option<String>,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub country: String,
    pub country_code: String,
    pub region: String,
    pub city: String,
}

impl WebhookPayload {
    pub const LINK_CLICKED: &'static str = "link.clicked";

    /// Builds the payload from the queued event and the stored click row.
    ///
    /// The IP is intentionally left out of third-party notifications.
    pub fn link_clicked(event: &ClickEvent, click: &Click) -> Self {
        Self {
            event: Self::LINK_CLICKED,
            link_id: event.link_id,
            short_code: event.short_code.clone(),
            destination_url: event.destination_url.clone(),
            clicked_at: click.clicked_at,
            referer: click.referer.clone(),
            device: click.device.clone(),
            browser: click.browser.clone(),
            os: click.os.clone(),
            country: click.country.clone(),
            country_code: click.country_code.clone(),
            region: click.region.clone(),
            city: click.city.clone(),
        }
    }
}
