//! Outbound HTTP adapters built on a shared `reqwest` client.
//!
//! - [`HttpGeoLocator`] - IP geolocation through a JSON lookup endpoint
//! - [`HttpWebhookDispatcher`] - signed `link.clicked` webhook delivery

pub mod geo_locator;
pub mod webhook_dispatcher;

pub use geo_locator::HttpGeoLocator;
pub use webhook_dispatcher::{HttpWebhookDispatcher, SIGNATURE_HEADER, sign_body};
