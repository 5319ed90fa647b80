//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL with its access rules
//! - [`Click`] - One recorded visit on a link
//! - [`Project`] - A named group of links
//! - [`Integration`] - Owner-level analytics or webhook configuration
//! - [`TargetingRules`] / [`TrackingConfig`] - JSON documents embedded on a link
//!
//! Creation inputs use separate `New*` structs; partial updates use [`LinkPatch`].

pub mod click;
pub mod integration;
pub mod link;
pub mod project;
pub mod targeting;
pub mod tracking;

pub use click::{Click, GeoLocation, NewClick, UNKNOWN};
pub use integration::{Integration, IntegrationConfig, WebhookTarget};
pub use link::{Link, LinkPatch, NewLink, RedirectType, RotationTarget, UtmParams};
pub use project::{NewProject, Project};
pub use targeting::{GeoRedirect, GeoRules, HourWindow, TargetingRules, TimeRedirect, TimeRules};
pub use tracking::{Placement, ScriptKind, TrackingConfig, TrackingScript};
