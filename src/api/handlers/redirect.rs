//! Handler for short URL redirects.

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::services::{RequestContext, Resolution};
use crate::domain::click_event::ClickEvent;
use crate::pages::{
    ErrorTemplate, ExpiredTemplate, InterstitialTemplate, LimitReachedTemplate, NotFoundTemplate,
    PasswordTemplate, UnavailableTemplate,
};
use crate::state::AppState;
use crate::utils::ip::client_ip;

#[derive(Debug, Default, Deserialize)]
pub struct RedirectParams {
    /// Password submitted through the password form.
    pub p: Option<String>,
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|v| !v.is_empty())
}

/// Resolves a short code and answers with a redirect, an interstitial or an
/// HTML status page.
///
/// # Endpoint
///
/// `GET /{code}` (optionally `?p=<password>`)
///
/// # Outcomes
///
/// | outcome | status |
/// |---|---|
/// | missing, deleted or inactive | 404 |
/// | expired / click limit reached | 410 |
/// | password required or wrong | 401 |
/// | geo or time targeting rejected | 403 |
/// | tracking interstitial | 200 |
/// | redirect | 301 / 302 |
/// | internal error | 500 |
///
/// # Click Tracking
///
/// Granted visits offer a click event to the bounded queue with `try_send`.
/// A full or closed queue drops the event; the response never waits.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<RedirectParams>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let ctx = RequestContext {
        ip: client_ip(&headers, Some(addr), state.behind_proxy).map(|ip| ip.to_string()),
        user_agent: header_string(&headers, header::USER_AGENT),
        referer: header_string(&headers, header::REFERER),
        password: params.p,
        now: Utc::now(),
    };

    let resolution = match state.redirect_service.resolve(&code, &ctx).await {
        Ok(resolution) => resolution,
        Err(e) => {
            tracing::error!(short_code = %code, error = ?e, "Redirect resolution failed");
            metrics::counter!("redirect_outcomes_total", "outcome" => "error").increment(1);
            return (StatusCode::INTERNAL_SERVER_ERROR, ErrorTemplate {}).into_response();
        }
    };

    let outcome = resolution.outcome();
    metrics::counter!("redirect_outcomes_total", "outcome" => outcome).increment(1);
    tracing::debug!(short_code = %code, outcome, "Resolved short code");

    match resolution {
        Resolution::NotFound => {
            (StatusCode::NOT_FOUND, NotFoundTemplate { short_code: code }).into_response()
        }
        Resolution::Expired => {
            (StatusCode::GONE, ExpiredTemplate { short_code: code }).into_response()
        }
        Resolution::LimitReached => {
            (StatusCode::GONE, LimitReachedTemplate { short_code: code }).into_response()
        }
        Resolution::PasswordRequired {
            short_code,
            invalid_attempt,
        } => (
            StatusCode::UNAUTHORIZED,
            PasswordTemplate {
                short_code,
                invalid_attempt,
            },
        )
            .into_response(),
        Resolution::Unavailable => (StatusCode::FORBIDDEN, UnavailableTemplate {}).into_response(),
        Resolution::Interstitial { page, click } => {
            enqueue_click(&state, click);

            let cloaking = page.cloaking;
            let mut response = InterstitialTemplate::from(page).into_response();
            let headers = response.headers_mut();
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            if cloaking {
                headers.insert(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                );
            }
            response
        }
        Resolution::Redirect {
            location,
            redirect_type,
            click,
        } => {
            let Ok(location) = HeaderValue::from_str(&location) else {
                tracing::error!(short_code = %code, "Destination is not a valid Location header");
                return (StatusCode::INTERNAL_SERVER_ERROR, ErrorTemplate {}).into_response();
            };

            enqueue_click(&state, click);

            let status = StatusCode::from_u16(redirect_type.status_code())
                .unwrap_or(StatusCode::FOUND);
            let mut response = status.into_response();
            let headers = response.headers_mut();
            headers.insert(header::LOCATION, location);
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        }
    }
}

/// Offers a click to the worker queue without waiting.
fn enqueue_click(state: &AppState, click: ClickEvent) {
    match state.click_tx.try_send(click) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            tracing::warn!(link_id = event.link_id, "Click queue full, dropping event");
            metrics::counter!("clicks_dropped_total", "reason" => "full").increment(1);
        }
        Err(TrySendError::Closed(event)) => {
            tracing::warn!(link_id = event.link_id, "Click queue closed, dropping event");
            metrics::counter!("clicks_dropped_total", "reason" => "closed").increment(1);
        }
    }
}
