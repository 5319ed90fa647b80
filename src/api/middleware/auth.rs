//! API key authentication middleware.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the raw API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Query parameter accepted when the header is absent.
pub const API_KEY_QUERY: &str = "api_key";

/// Extracts the raw key from the `X-API-Key` header or the `api_key` query parameter.
fn extract_api_key(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    let from_header = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        url::form_urlencoded::parse(query?.as_bytes())
            .find(|(k, _)| k == API_KEY_QUERY)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Authenticates the request and attaches its [`AuthContext`] as an extension.
///
/// # Errors
///
/// - `401 MISSING_API_KEY` when neither header nor query parameter is present
/// - `401 INVALID_API_KEY` when the key is unknown or revoked
///
/// [`AuthContext`]: crate::application::services::AuthContext
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw_key = extract_api_key(req.headers(), req.uri().query())
        .ok_or_else(|| AppError::unauthorized("MISSING_API_KEY", "API key required"))?;

    let auth = st.auth_service.authenticate(&raw_key).await?;
    tracing::debug!(owner_id = %auth.owner_id, api_key_id = auth.api_key_id, "Authenticated");

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
