//! Client IP extraction and masking.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

/// Resolves the client IP for a request.
///
/// When `behind_proxy` is set the left-most `X-Forwarded-For` entry wins,
/// then `X-Real-IP`; otherwise only the socket peer address is trusted.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> Option<IpAddr> {
    if behind_proxy
        && let Some(ip) = forwarded_ip(headers)
    {
        return Some(ip);
    }
    peer.map(|addr| addr.ip())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let from_xff = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    from_xff.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    })
}

/// Masks an IP for display.
///
/// IPv4 hides the last octet (`203.0.113.xxx`); IPv6 keeps the first three
/// groups (`2001:db8:85a3::xxxx`). Values that do not parse are fully hidden.
pub fn mask_ip(ip: &str) -> String {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => {
            let [a, b, c, _] = v4.octets();
            format!("{}.{}.{}.xxx", a, b, c)
        }
        Ok(IpAddr::V6(v6)) => {
            let s = v6.segments();
            format!("{:x}:{:x}:{:x}::xxxx", s[0], s[1], s[2])
        }
        Err(_) => "xxx".to_string(),
    }
}
