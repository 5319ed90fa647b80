//! Geolocation through an HTTP lookup service.

use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

use crate::domain::entities::{GeoLocation, UNKNOWN};
use crate::domain::geo::GeoLocator;

/// Placeholder replaced by the client IP in the lookup URL template.
pub const IP_PLACEHOLDER: &str = "{ip}";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Accepts both ip-api.com style (`countryCode`) and snake_case field names.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    country: Option<String>,
    #[serde(default, alias = "countryCode")]
    country_code: Option<String>,
    #[serde(default, alias = "region_code", alias = "regionCode")]
    region: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

impl LookupResponse {
    fn into_location(self) -> GeoLocation {
        let field = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        GeoLocation {
            country_code: field(self.country_code.map(|c| c.to_ascii_uppercase())),
            country: field(self.country),
            region: field(self.region),
            city: field(self.city),
        }
    }
}

/// Looks up visitor locations with `GET <template with {ip} substituted>`.
///
/// Errors, timeouts and private addresses resolve to [`GeoLocation::unknown`].
pub struct HttpGeoLocator {
    client: reqwest::Client,
    url_template: String,
}

impl HttpGeoLocator {
    pub fn new(url_template: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(LOOKUP_TIMEOUT).build()?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    fn lookup_url(&self, ip: &str) -> String {
        if self.url_template.contains(IP_PLACEHOLDER) {
            self.url_template.replace(IP_PLACEHOLDER, ip)
        } else {
            format!("{}/{}", self.url_template.trim_end_matches('/'), ip)
        }
    }
}

fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => !(v6.is_loopback() || v6.is_unspecified()),
    }
}

#[async_trait]
impl GeoLocator for HttpGeoLocator {
    async fn locate(&self, ip: &str) -> GeoLocation {
        match ip.parse::<IpAddr>() {
            Ok(addr) if is_public(&addr) => {}
            _ => return GeoLocation::unknown(),
        }

        let response = match self.client.get(self.lookup_url(ip)).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Geolocation request failed");
                return GeoLocation::unknown();
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Geolocation lookup returned an error");
            return GeoLocation::unknown();
        }

        match response.json::<LookupResponse>().await {
            Ok(body) => body.into_location(),
            Err(e) => {
                tracing::warn!(error = %e, "Geolocation response could not be parsed");
                GeoLocation::unknown()
            }
        }
    }
}
