//! Handlers for link management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::api::dto::analytics::{AnalyticsParams, AnalyticsResponse};
use crate::api::dto::links::{
    BatchSummary, BulkCreateRequest, BulkCreateResponse, BulkResultItem, CreateLinkRequest,
    LinkListResponse, LinkResponse, UpdateLinkRequest,
};
use crate::api::dto::pagination::{ListLinksParams, PaginationMeta};
use crate::application::services::{AnalyticsPeriod, AuthContext};
use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;

fn to_response(state: &AppState, link: Link) -> LinkResponse {
    let short_url = state.link_service.short_url(&link);
    LinkResponse::new(link, short_url)
}

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "destination_url": "https://example.com/launch",
///   "short_code": "launch",
///   "expires_at": "2026-12-31T23:59:59Z",
///   "password": "hunter2",
///   "redirect_type": 301
/// }
/// ```
///
/// Only `destination_url` is required.
///
/// # Errors
///
/// - 400 `INVALID_URL`, `INVALID_SHORT_CODE`, `VALIDATION_ERROR`
/// - 404 `PROJECT_NOT_FOUND`
/// - 409 `SHORT_CODE_TAKEN`
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create(auth.owner_id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(&state, link))))
}

/// Creates up to 100 links in one request.
///
/// # Endpoint
///
/// `POST /api/links/bulk`
///
/// Items are processed independently and in order. If one fails, the others
/// continue. The response carries a summary plus one result per item.
///
/// # Errors
///
/// Returns 400 when the batch is empty or holds more than 100 items.
pub async fn bulk_create_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<BulkCreateRequest>,
) -> Result<Json<BulkCreateResponse>, AppError> {
    payload.validate()?;

    let total = payload.links.len();

    // Items failing request validation keep their slot; the rest go to the service.
    let mut slots = Vec::with_capacity(total);
    let mut inputs = Vec::with_capacity(total);
    for item in payload.links {
        let destination_url = item.destination_url.clone();
        match item.validate() {
            Ok(()) => {
                inputs.push(item.into());
                slots.push((destination_url, None));
            }
            Err(e) => slots.push((destination_url, Some(AppError::from(e)))),
        }
    }

    let mut created = if inputs.is_empty() {
        Vec::new()
    } else {
        state.link_service.bulk_create(auth.owner_id, inputs).await?
    }
    .into_iter();

    let mut items = Vec::with_capacity(total);
    let mut successful = 0;
    let mut failed = 0;

    for (destination_url, invalid) in slots {
        let result = match invalid {
            Some(err) => Err(err),
            None => created.next().unwrap_or_else(|| {
                Err(AppError::internal("Missing bulk result", json!({})))
            }),
        };

        match result {
            Ok(link) => {
                successful += 1;
                items.push(BulkResultItem::Success {
                    destination_url,
                    link: to_response(&state, link),
                });
            }
            Err(err) => {
                failed += 1;
                items.push(BulkResultItem::Error {
                    destination_url,
                    error: err.to_error_info(),
                });
            }
        }
    }

    tracing::info!(owner_id = %auth.owner_id, total, successful, failed, "Bulk create finished");

    Ok(Json(BulkCreateResponse {
        summary: BatchSummary {
            total,
            successful,
            failed,
        },
        items,
    }))
}

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/links?page=1&limit=20&project_id=3&search=promo`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ListLinksParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let page = state
        .link_service
        .list(auth.owner_id, params.into_query()?)
        .await?;

    let pagination = PaginationMeta::from(&page);
    let data = page
        .links
        .into_iter()
        .map(|link| to_response(&state, link))
        .collect();

    Ok(Json(LinkListResponse { data, pagination }))
}

/// `GET /api/links/{id}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get(auth.owner_id, id).await?;
    Ok(Json(to_response(&state, link)))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PUT /api/links/{id}`
///
/// Absent fields are unchanged, `null` clears nullable fields and
/// `"password": ""` removes password protection.
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update(auth.owner_id, id, payload.into())
        .await?;

    Ok(Json(to_response(&state, link)))
}

/// Soft-deletes a link. The short code stays reserved.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}` → `204 No Content`
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete(auth.owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Click analytics for one link.
///
/// # Endpoint
///
/// `GET /api/links/{id}/analytics?period=7d`
///
/// `period` is one of `24h`, `7d` (default), `30d`, `90d`. Recent clicks
/// are returned with masked IPs.
pub async fn link_analytics_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let period = match params.period.as_deref() {
        Some(p) => p.parse::<AnalyticsPeriod>()?,
        None => AnalyticsPeriod::default(),
    };

    let analytics = state
        .stats_service
        .link_analytics(auth.owner_id, id, period, Utc::now())
        .await?;

    Ok(Json(AnalyticsResponse::new(id, period.as_str(), analytics)))
}
