//! Pluggable IP geolocation.

use async_trait::async_trait;

use crate::domain::entities::GeoLocation;

/// Resolves a client IP to a location.
///
/// Lookups never fail the caller: implementations return
/// [`GeoLocation::unknown`] when the provider errors or has no data.
/// Use [`locate_optional`] when the client IP may be missing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn locate(&self, ip: &str) -> GeoLocation;
}

/// Resolves an optional IP; a missing IP is an unknown location.
pub async fn locate_optional(geo: &dyn GeoLocator, ip: Option<&str>) -> GeoLocation {
    match ip {
        Some(ip) => geo.locate(ip).await,
        None => GeoLocation::unknown(),
    }
}

/// Locator used when no provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGeoLocator;

#[async_trait]
impl GeoLocator for NullGeoLocator {
    async fn locate(&self, _ip: &str) -> GeoLocation {
        GeoLocation::unknown()
    }
}
