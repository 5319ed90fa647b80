//! Per-client rate limiting using the token bucket algorithm.

use anyhow::{Result, anyhow};
use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor,
};

use crate::utils::ip::client_ip;

/// Management API: one token every 9 s, i.e. 100 requests per 15 minutes.
const API_REPLENISH_MS: u64 = 9_000;

/// Redirect service: one token every 600 ms, i.e. 100 requests per minute.
const REDIRECT_REPLENISH_MS: u64 = 600;

const BURST: u32 = 100;

pub type RateLimitLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Keys requests by client IP.
///
/// Uses the socket peer address, or the forwarding headers when
/// `behind_proxy` is set.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub behind_proxy: bool,
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        client_ip(req.headers(), peer, self.behind_proxy).ok_or(GovernorError::UnableToExtractKey)
    }
}

fn build(replenish_ms: u64, behind_proxy: bool) -> Result<RateLimitLayer> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(replenish_ms)
        .burst_size(BURST)
        .key_extractor(ClientIpKeyExtractor { behind_proxy })
        .finish()
        .ok_or_else(|| anyhow!("Invalid rate limiter configuration"))?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}

/// Rate limiter for the management API (100 requests / 15 minutes per IP).
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn api_layer(behind_proxy: bool) -> Result<RateLimitLayer> {
    build(API_REPLENISH_MS, behind_proxy)
}

/// Rate limiter for the redirect service (100 requests / minute per IP).
pub fn redirect_layer(behind_proxy: bool) -> Result<RateLimitLayer> {
    build(REDIRECT_REPLENISH_MS, behind_proxy)
}
