//! Handler for account statistics.

use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::application::services::AuthContext;
use crate::domain::repositories::OwnerStats;
use crate::error::AppError;
use crate::state::AppState;

/// Totals across the caller's account.
///
/// # Endpoint
///
/// `GET /api/stats`
///
/// # Response
///
/// ```json
/// {
///   "total_links": 42,
///   "active_links": 40,
///   "total_clicks": 1234,
///   "clicks_last_24h": 56,
///   "total_projects": 3
/// }
/// ```
pub async fn stats_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<OwnerStats>, AppError> {
    let stats = state
        .stats_service
        .owner_stats(auth.owner_id, Utc::now())
        .await?;

    Ok(Json(stats))
}
