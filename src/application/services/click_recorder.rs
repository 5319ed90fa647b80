//! Turns queued click events into stored click rows.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::ClickSink;
use crate::domain::entities::{Click, NewClick};
use crate::domain::geo::{GeoLocator, locate_optional};
use crate::domain::repositories::ClickRepository;
use crate::domain::user_agent::parse_user_agent;
use crate::error::AppError;

/// Enriches an event with device and location data, then persists it.
pub struct ClickRecorder {
    clicks: Arc<dyn ClickRepository>,
    geo: Arc<dyn GeoLocator>,
}

impl ClickRecorder {
    pub fn new(clicks: Arc<dyn ClickRepository>, geo: Arc<dyn GeoLocator>) -> Self {
        Self { clicks, geo }
    }

    /// Builds the row to insert. Reuses the location resolved during redirect
    /// resolution instead of looking it up twice.
    pub async fn build_click(&self, event: &ClickEvent) -> NewClick {
        let client = parse_user_agent(event.user_agent.as_deref());

        let location = match &event.location {
            Some(location) => location.clone(),
            None => locate_optional(self.geo.as_ref(), event.ip.as_deref()).await,
        };

        NewClick {
            link_id: event.link_id,
            clicked_at: event.clicked_at,
            ip: event.ip.clone(),
            user_agent: event.user_agent.clone(),
            referer: event.referer.clone(),
            device: client.device,
            browser: client.browser,
            os: client.os,
            location,
        }
    }
}

#[async_trait]
impl ClickSink for ClickRecorder {
    async fn record(&self, event: &ClickEvent) -> Result<Click, AppError> {
        let new_click = self.build_click(event).await;
        self.clicks.record_click(new_click).await
    }
}
