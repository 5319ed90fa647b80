//! Destination URL validation and normalization.

use serde_json::json;
use url::Url;

use crate::error::AppError;

/// Upper bound on stored destination length.
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,
}

impl From<UrlNormalizationError> for AppError {
    fn from(err: UrlNormalizationError) -> Self {
        AppError::bad_request(err.to_string(), json!({})).with_code("INVALID_URL")
    }
}

/// Normalizes a destination URL to a canonical form.
///
/// Only `http` and `https` are accepted. The host is lowercased, default
/// ports and fragments are dropped; path and query are preserved.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let input = input.trim();
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlNormalizationError::MissingHost)?
        .to_ascii_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    url.set_fragment(None);

    // `Url` already elides the scheme's default port on parse; this only
    // matters for explicit `:80` on https and the like, which are kept.
    Ok(url.to_string())
}
