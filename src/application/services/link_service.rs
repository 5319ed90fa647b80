//! Link management: creation, listing, updates and soft deletion.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{
    HourWindow, Link, LinkPatch, NewLink, RedirectType, RotationTarget, TargetingRules,
    TrackingConfig, UtmParams,
};
use crate::domain::repositories::{LinkFilter, LinkRepository, ProjectRepository};
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::password::{process_new_password, process_update_password};
use crate::utils::url_normalizer::normalize_url;

/// Longest accepted interstitial delay.
pub const MAX_DELAY_SECONDS: u32 = 30;

/// Largest accepted bulk batch.
pub const MAX_BULK_LINKS: usize = 100;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default)]
pub struct CreateLinkInput {
    pub destination_url: String,
    pub short_code: Option<String>,
    pub title: Option<String>,
    pub project_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_limit: Option<i64>,
    pub password: Option<String>,
    pub redirect_type: Option<RedirectType>,
    pub targeting: Option<TargetingRules>,
    pub tracking: Option<TrackingConfig>,
    pub utm: Option<UtmParams>,
    pub rotation: Option<Vec<RotationTarget>>,
    pub is_active: Option<bool>,
}

/// Partial update. Double options clear a field with `Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct UpdateLinkInput {
    pub destination_url: Option<String>,
    pub title: Option<Option<String>>,
    pub project_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub click_limit: Option<Option<i64>>,
    /// `Some("")` removes password protection.
    pub password: Option<String>,
    pub redirect_type: Option<RedirectType>,
    pub targeting: Option<Option<TargetingRules>>,
    pub tracking: Option<Option<TrackingConfig>>,
    pub utm: Option<Option<UtmParams>>,
    pub rotation: Option<Vec<RotationTarget>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListLinksQuery {
    pub page: u32,
    pub limit: u32,
    pub project_id: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl LinkPage {
    pub fn total_pages(&self) -> i64 {
        if self.limit == 0 {
            return 0;
        }
        (self.total + i64::from(self.limit) - 1) / i64::from(self.limit)
    }
}

/// Service for managing an owner's short links.
///
/// Every operation is scoped to `owner_id`; links of other owners behave
/// as if they did not exist.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    projects: Arc<dyn ProjectRepository>,
    base_url: String,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        projects: Arc<dyn ProjectRepository>,
        base_url: String,
    ) -> Self {
        Self {
            links,
            projects,
            base_url,
        }
    }

    /// Public URL of a link under `APP_BASE_URL`.
    pub fn short_url(&self, link: &Link) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), link.short_code)
    }

    /// Creates a link.
    ///
    /// # Errors
    ///
    /// - `INVALID_URL` / `INVALID_SHORT_CODE` / `VALIDATION_ERROR` (400)
    /// - `PROJECT_NOT_FOUND` (404)
    /// - `SHORT_CODE_TAKEN` (409)
    pub async fn create(&self, owner_id: Uuid, input: CreateLinkInput) -> Result<Link, AppError> {
        let destination_url = normalize_url(&input.destination_url)?;

        if let Some(limit) = input.click_limit {
            validate_click_limit(limit)?;
        }
        let rotation = normalize_rotation(input.rotation.unwrap_or_default())?;
        let targeting = input.targeting.map(normalize_targeting).transpose()?;
        if let Some(tracking) = &input.tracking {
            validate_tracking(tracking)?;
        }
        if let Some(project_id) = input.project_id {
            self.ensure_project(owner_id, project_id).await?;
        }

        let short_code = match input.short_code.filter(|c| !c.is_empty()) {
            Some(custom) => {
                validate_custom_code(&custom)?;
                if self.links.code_exists(&custom).await? {
                    return Err(short_code_taken(&custom));
                }
                custom
            }
            None => self.generate_unique_code().await?,
        };

        let password_hash = process_new_password(input.password.as_deref())?;

        let new_link = NewLink {
            short_code,
            destination_url,
            owner_id,
            project_id: input.project_id,
            title: input.title.filter(|t| !t.trim().is_empty()),
            is_active: input.is_active.unwrap_or(true),
            expires_at: input.expires_at,
            click_limit: input.click_limit,
            password_hash,
            redirect_type: input.redirect_type.unwrap_or_default(),
            targeting,
            tracking: input.tracking,
            utm: input.utm.filter(|u| !u.is_empty()),
            rotation,
        };

        let link = self.links.create(new_link).await?;
        tracing::info!(link_id = link.id, short_code = %link.short_code, owner_id = %owner_id, "Link created");
        Ok(link)
    }

    /// Creates each input independently; one failure does not stop the rest.
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` for an empty batch or one above
    /// [`MAX_BULK_LINKS`]. Per-item failures are returned in the vector.
    pub async fn bulk_create(
        &self,
        owner_id: Uuid,
        inputs: Vec<CreateLinkInput>,
    ) -> Result<Vec<Result<Link, AppError>>, AppError> {
        if inputs.is_empty() || inputs.len() > MAX_BULK_LINKS {
            return Err(AppError::bad_request(
                format!("Bulk requests must contain 1-{} links", MAX_BULK_LINKS),
                json!({ "provided": inputs.len(), "max": MAX_BULK_LINKS }),
            ));
        }

        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            results.push(self.create(owner_id, input).await);
        }
        Ok(results)
    }

    pub async fn list(&self, owner_id: Uuid, query: ListLinksQuery) -> Result<LinkPage, AppError> {
        let page = query.page.max(1);
        let limit = if query.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            query.limit
        };
        if limit > MAX_PAGE_SIZE {
            return Err(AppError::bad_request(
                format!("limit must be between 1 and {}", MAX_PAGE_SIZE),
                json!({ "limit": limit }),
            ));
        }

        let filter = LinkFilter {
            project_id: query.project_id,
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            offset: i64::from(page - 1) * i64::from(limit),
            limit: i64::from(limit),
        };

        let total = self.links.count(owner_id, filter.clone()).await?;
        let links = self.links.list(owner_id, filter).await?;

        Ok(LinkPage {
            links,
            total,
            page,
            limit,
        })
    }

    pub async fn get(&self, owner_id: Uuid, id: i64) -> Result<Link, AppError> {
        self.links
            .find_by_id(id, owner_id)
            .await?
            .ok_or_else(|| link_not_found(id))
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Same validation codes as [`Self::create`], plus `NOT_FOUND`.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: i64,
        input: UpdateLinkInput,
    ) -> Result<Link, AppError> {
        // Resolve ownership first so foreign ids read as missing.
        self.get(owner_id, id).await?;

        let destination_url = input
            .destination_url
            .as_deref()
            .map(normalize_url)
            .transpose()?;
        if let Some(Some(limit)) = input.click_limit {
            validate_click_limit(limit)?;
        }
        let rotation = input.rotation.map(normalize_rotation).transpose()?;
        let targeting = input
            .targeting
            .map(|t| t.map(normalize_targeting).transpose())
            .transpose()?;
        if let Some(Some(tracking)) = &input.tracking {
            validate_tracking(tracking)?;
        }
        if let Some(Some(project_id)) = input.project_id {
            self.ensure_project(owner_id, project_id).await?;
        }

        let patch = LinkPatch {
            destination_url,
            project_id: input.project_id,
            title: input.title,
            is_active: input.is_active,
            expires_at: input.expires_at,
            click_limit: input.click_limit,
            password_hash: process_update_password(input.password.as_deref())?,
            redirect_type: input.redirect_type,
            targeting,
            tracking: input.tracking,
            utm: input.utm,
            rotation,
        };

        let link = self.links.update(id, owner_id, patch).await?;
        tracing::info!(link_id = link.id, owner_id = %owner_id, "Link updated");
        Ok(link)
    }

    /// Soft-deletes a link. The short code stays reserved.
    pub async fn delete(&self, owner_id: Uuid, id: i64) -> Result<(), AppError> {
        if !self.links.soft_delete(id, owner_id).await? {
            return Err(link_not_found(id));
        }
        tracing::info!(link_id = id, owner_id = %owner_id, "Link deleted");
        Ok(())
    }

    async fn ensure_project(&self, owner_id: Uuid, project_id: i64) -> Result<(), AppError> {
        match self.projects.find_by_id(project_id, owner_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(
                "Project not found",
                json!({ "project_id": project_id }),
            )
            .with_code("PROJECT_NOT_FOUND")),
        }
    }

    /// Generates a free code, retrying up to 10 times on collision.
    async fn generate_unique_code(&self) -> Result<String, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for attempt in 1..=MAX_ATTEMPTS {
            let code = generate_code()?;
            if validate_custom_code(&code).is_ok() && !self.links.code_exists(&code).await? {
                return Ok(code);
            }
            tracing::warn!(attempt, "Short code collision, retrying");
        }

        Err(AppError::internal(
            "Failed to generate unique short code",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}

fn link_not_found(id: i64) -> AppError {
    AppError::not_found("Link not found", json!({ "id": id }))
}

fn short_code_taken(code: &str) -> AppError {
    AppError::conflict("Short code is already taken", json!({ "short_code": code }))
        .with_code("SHORT_CODE_TAKEN")
}

fn validate_click_limit(limit: i64) -> Result<(), AppError> {
    if limit < 1 {
        return Err(AppError::bad_request(
            "click_limit must be at least 1",
            json!({ "click_limit": limit }),
        ));
    }
    Ok(())
}

fn normalize_rotation(targets: Vec<RotationTarget>) -> Result<Vec<RotationTarget>, AppError> {
    targets
        .into_iter()
        .map(|t| {
            if t.weight == 0 {
                return Err(AppError::bad_request(
                    "Rotation weights must be at least 1",
                    json!({ "url": t.url }),
                ));
            }
            Ok(RotationTarget {
                url: normalize_url(&t.url)?,
                weight: t.weight,
            })
        })
        .collect()
}

/// Validates targeting rules and normalizes their override URLs in place.
fn normalize_targeting(mut rules: TargetingRules) -> Result<TargetingRules, AppError> {
    if let Some(geo) = &mut rules.geo {
        for redirect in &mut geo.redirects {
            redirect.url = normalize_url(&redirect.url)?;
        }
    }

    if let Some(time) = &mut rules.time {
        if let (Some(start), Some(end)) = (time.starts_at, time.expires_at)
            && start >= end
        {
            return Err(AppError::bad_request(
                "targeting.time.starts_at must be before expires_at",
                json!({}),
            ));
        }

        let bad_day = |d: &u8| *d > 6;
        let bad_window = |w: &HourWindow| w.start > 23 || w.end > 23;

        if time.allowed_days.iter().any(bad_day)
            || time.redirects.iter().any(|r| r.days.iter().any(bad_day))
        {
            return Err(AppError::bad_request(
                "Days must be between 0 (Sunday) and 6 (Saturday)",
                json!({}),
            ));
        }
        if time.allowed_hours.as_ref().is_some_and(bad_window)
            || time.redirects.iter().any(|r| r.hours.as_ref().is_some_and(bad_window))
        {
            return Err(AppError::bad_request(
                "Hours must be between 0 and 23",
                json!({}),
            ));
        }
        if time.utc_offset_minutes.abs() > 14 * 60 {
            return Err(AppError::bad_request(
                "utc_offset_minutes must be within +/-840",
                json!({ "utc_offset_minutes": time.utc_offset_minutes }),
            ));
        }
        for redirect in &mut time.redirects {
            redirect.url = normalize_url(&redirect.url)?;
        }
    }

    Ok(rules)
}

fn validate_tracking(tracking: &TrackingConfig) -> Result<(), AppError> {
    if tracking.delay_seconds > MAX_DELAY_SECONDS {
        return Err(AppError::bad_request(
            format!("tracking.delay_seconds must be at most {}", MAX_DELAY_SECONDS),
            json!({ "delay_seconds": tracking.delay_seconds }),
        ));
    }
    Ok(())
}
