//! Short code resolution for the redirect service.
//!
//! The resolver walks a fixed pipeline and stops at the first rule that
//! blocks the visit:
//!
//! existence → active → expiry → click limit → password → geo → time →
//! destination (rotation, geo override, time override) → UTM → tracking.
//!
//! Only granted outcomes carry a [`ClickEvent`].

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::services::tracking_composer::{
    ComposedScripts, ScriptContext, compose_scripts, should_serve_interstitial,
};
use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{
    GeoLocation, Integration, Link, RedirectType, TrackingScript, WebhookTarget,
};
use crate::domain::geo::{GeoLocator, locate_optional};
use crate::domain::repositories::{IntegrationRepository, LinkRepository};
use crate::domain::rotation::pick_rotation_url;
use crate::domain::targeting::{
    check_geo_targeting, check_time_targeting, find_geo_redirect, find_time_redirect,
};
use crate::error::AppError;
use crate::utils::password::verify_password;
use crate::utils::utm::inject_utm;

/// Request metadata the resolver needs.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    /// Value of the `p` query parameter.
    pub password: Option<String>,
    pub now: DateTime<Utc>,
}

/// Data rendered into the tracking interstitial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterstitialPage {
    pub short_code: String,
    pub destination_url: String,
    pub delay_seconds: u32,
    pub cloaking: bool,
    pub scripts: ComposedScripts,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    NotFound,
    Expired,
    LimitReached,
    PasswordRequired {
        short_code: String,
        invalid_attempt: bool,
    },
    Unavailable,
    Interstitial {
        page: InterstitialPage,
        click: ClickEvent,
    },
    Redirect {
        location: String,
        redirect_type: RedirectType,
        click: ClickEvent,
    },
}

impl Resolution {
    /// Label used for logs and the `redirect_outcomes_total` counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::NotFound => "not_found",
            Resolution::Expired => "expired",
            Resolution::LimitReached => "limit_reached",
            Resolution::PasswordRequired { .. } => "password_required",
            Resolution::Unavailable => "unavailable",
            Resolution::Interstitial { .. } => "interstitial",
            Resolution::Redirect { .. } => "redirect",
        }
    }
}

pub struct RedirectService {
    links: Arc<dyn LinkRepository>,
    integrations: Arc<dyn IntegrationRepository>,
    geo: Arc<dyn GeoLocator>,
}

impl RedirectService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        integrations: Arc<dyn IntegrationRepository>,
        geo: Arc<dyn GeoLocator>,
    ) -> Self {
        Self {
            links,
            integrations,
            geo,
        }
    }

    /// Resolves `short_code` for one visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on repository failures or a stored
    /// password hash that cannot be parsed.
    pub async fn resolve(
        &self,
        short_code: &str,
        ctx: &RequestContext,
    ) -> Result<Resolution, AppError> {
        let Some(link) = self.links.find_by_code(short_code).await? else {
            return Ok(Resolution::NotFound);
        };

        if link.is_deleted() || !link.is_active {
            return Ok(Resolution::NotFound);
        }
        if link.is_expired_at(ctx.now) {
            return Ok(Resolution::Expired);
        }
        if link.is_limit_reached() {
            return Ok(Resolution::LimitReached);
        }

        if let Some(hash) = &link.password_hash {
            match ctx.password.as_deref().filter(|p| !p.is_empty()) {
                None => {
                    return Ok(Resolution::PasswordRequired {
                        short_code: link.short_code.clone(),
                        invalid_attempt: false,
                    });
                }
                Some(candidate) => {
                    if !verify_password(candidate, hash)? {
                        return Ok(Resolution::PasswordRequired {
                            short_code: link.short_code.clone(),
                            invalid_attempt: true,
                        });
                    }
                }
            }
        }

        let geo_rules = link.targeting.as_ref().and_then(|t| t.geo.as_ref());
        let time_rules = link.targeting.as_ref().and_then(|t| t.time.as_ref());

        let location = match geo_rules {
            Some(_) => Some(locate_optional(self.geo.as_ref(), ctx.ip.as_deref()).await),
            None => None,
        };

        if let (Some(rules), Some(location)) = (geo_rules, &location)
            && !check_geo_targeting(location, rules)
        {
            return Ok(Resolution::Unavailable);
        }
        if let Some(rules) = time_rules
            && !check_time_targeting(rules, ctx.now)
        {
            return Ok(Resolution::Unavailable);
        }

        let destination = resolve_destination(&link, location.as_ref(), ctx.now);
        let destination = match &link.utm {
            Some(utm) => inject_utm(&destination, utm),
            None => destination,
        };

        let integrations = self.load_integrations(&link).await;
        let webhooks: Vec<WebhookTarget> = integrations
            .iter()
            .filter_map(Integration::webhook_target)
            .collect();

        let click = ClickEvent {
            link_id: link.id,
            short_code: link.short_code.clone(),
            owner_id: link.owner_id,
            destination_url: destination.clone(),
            ip: ctx.ip.clone(),
            user_agent: ctx.user_agent.clone(),
            referer: ctx.referer.clone(),
            location,
            webhooks,
            clicked_at: ctx.now,
        };

        if let Some(tracking) = &link.tracking {
            let integration_scripts: Vec<TrackingScript> = integrations
                .iter()
                .filter_map(Integration::tracking_script)
                .collect();

            if should_serve_interstitial(tracking, &integration_scripts) {
                let scripts = if tracking.enabled {
                    compose_scripts(
                        &integration_scripts,
                        &tracking.scripts,
                        &ScriptContext {
                            destination_url: &destination,
                            short_code: &link.short_code,
                            link_id: link.id,
                        },
                    )
                } else {
                    ComposedScripts::default()
                };

                return Ok(Resolution::Interstitial {
                    page: InterstitialPage {
                        short_code: link.short_code.clone(),
                        destination_url: destination,
                        delay_seconds: tracking.delay_seconds,
                        cloaking: tracking.cloaking,
                        scripts,
                    },
                    click,
                });
            }
        }

        Ok(Resolution::Redirect {
            location: destination,
            redirect_type: link.redirect_type,
            click,
        })
    }

    /// Owner integrations are best effort: a lookup failure only drops them.
    async fn load_integrations(&self, link: &Link) -> Vec<Integration> {
        match self.integrations.list_enabled(link.owner_id).await {
            Ok(integrations) => integrations,
            Err(e) => {
                tracing::warn!(
                    owner_id = %link.owner_id,
                    short_code = %link.short_code,
                    error = %e,
                    "Failed to load integrations; continuing without them"
                );
                Vec::new()
            }
        }
    }
}

/// Rotation first, then the geo override, then the time override; each is
/// consulted only if the previous one produced nothing.
fn resolve_destination(link: &Link, location: Option<&GeoLocation>, now: DateTime<Utc>) -> String {
    if let Some(url) = pick_rotation_url(&link.rotation) {
        return url.to_string();
    }

    let targeting = link.targeting.as_ref();

    if let (Some(rules), Some(location)) = (targeting.and_then(|t| t.geo.as_ref()), location)
        && let Some(url) = find_geo_redirect(location, rules)
    {
        return url.to_string();
    }

    if let Some(rules) = targeting.and_then(|t| t.time.as_ref())
        && let Some(url) = find_time_redirect(rules, now)
    {
        return url.to_string();
    }

    link.destination_url.clone()
}
