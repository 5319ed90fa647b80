//! DTOs for link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use validator::Validate;

use crate::application::services::link_service::{CreateLinkInput, UpdateLinkInput};
use crate::domain::entities::{
    Link, RedirectType, RotationTarget, TargetingRules, TrackingConfig, UtmParams,
};
use crate::error::ErrorInfo;

use super::pagination::PaginationMeta;

/// Request body for `POST /api/links` and each item of a bulk request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048))]
    pub destination_url: String,
    pub short_code: Option<String>,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub project_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub click_limit: Option<i64>,
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
    /// `301` or `302`.
    pub redirect_type: Option<RedirectType>,
    pub targeting: Option<TargetingRules>,
    pub tracking: Option<TrackingConfig>,
    pub utm: Option<UtmParams>,
    pub rotation: Option<Vec<RotationTarget>>,
    pub is_active: Option<bool>,
}

impl From<CreateLinkRequest> for CreateLinkInput {
    fn from(r: CreateLinkRequest) -> Self {
        Self {
            destination_url: r.destination_url,
            short_code: r.short_code,
            title: r.title,
            project_id: r.project_id,
            expires_at: r.expires_at,
            click_limit: r.click_limit,
            password: r.password,
            redirect_type: r.redirect_type,
            targeting: r.targeting,
            tracking: r.tracking,
            utm: r.utm,
            rotation: r.rotation,
            is_active: r.is_active,
        }
    }
}

/// Request body for `PUT /api/links/{id}`.
///
/// Absent fields are left unchanged. For nullable fields, `null` clears the
/// value. `"password": ""` removes password protection.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(length(min = 1, max = 2048))]
    pub destination_url: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub project_id: Option<Option<i64>>,

    pub is_active: Option<bool>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub click_limit: Option<Option<i64>>,

    #[validate(length(max = 128))]
    pub password: Option<String>,

    pub redirect_type: Option<RedirectType>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub targeting: Option<Option<TargetingRules>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub tracking: Option<Option<TrackingConfig>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub utm: Option<Option<UtmParams>>,

    pub rotation: Option<Vec<RotationTarget>>,
}

impl From<UpdateLinkRequest> for UpdateLinkInput {
    fn from(r: UpdateLinkRequest) -> Self {
        Self {
            destination_url: r.destination_url,
            title: r.title,
            project_id: r.project_id,
            is_active: r.is_active,
            expires_at: r.expires_at,
            click_limit: r.click_limit,
            password: r.password,
            redirect_type: r.redirect_type,
            targeting: r.targeting,
            tracking: r.tracking,
            utm: r.utm,
            rotation: r.rotation,
        }
    }
}

/// A link as returned by the API. The password hash is never exposed.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub short_code: String,
    pub short_url: String,
    pub destination_url: String,
    pub title: Option<String>,
    pub project_id: Option<i64>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_limit: Option<i64>,
    pub total_clicks: i64,
    pub password_protected: bool,
    pub redirect_type: RedirectType,
    pub targeting: Option<TargetingRules>,
    pub tracking: Option<TrackingConfig>,
    pub utm: Option<UtmParams>,
    pub rotation: Vec<RotationTarget>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn new(link: Link, short_url: String) -> Self {
        Self {
            password_protected: link.is_password_protected(),
            id: link.id,
            short_code: link.short_code,
            short_url,
            destination_url: link.destination_url,
            title: link.title,
            project_id: link.project_id,
            is_active: link.is_active,
            expires_at: link.expires_at,
            click_limit: link.click_limit,
            total_clicks: link.total_clicks,
            redirect_type: link.redirect_type,
            targeting: link.targeting,
            tracking: link.tracking,
            utm: link.utm,
            rotation: link.rotation,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub data: Vec<LinkResponse>,
    pub pagination: PaginationMeta,
}

/// Request body for `POST /api/links/bulk`.
///
/// Items are validated one by one so a bad item does not reject the batch.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkCreateRequest {
    #[validate(length(min = 1, max = 100, message = "links must contain 1-100 items"))]
    pub links: Vec<CreateLinkRequest>,
}

#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    pub summary: BatchSummary,
    pub items: Vec<BulkResultItem>,
}

/// Individual result for a link in the batch.
///
/// Untagged: successful items carry `link`, failed ones carry `error`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BulkResultItem {
    Success {
        destination_url: String,
        link: LinkResponse,
    },
    Error {
        destination_url: String,
        error: ErrorInfo,
    },
}

/// Summary statistics for batch processing.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
