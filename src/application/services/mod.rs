//! Business logic services for the application layer.

pub mod auth_service;
pub mod click_recorder;
pub mod link_service;
pub mod project_service;
pub mod redirect_service;
pub mod stats_service;
pub mod tracking_composer;

pub use auth_service::{AuthContext, AuthService};
pub use click_recorder::ClickRecorder;
pub use link_service::LinkService;
pub use project_service::ProjectService;
pub use redirect_service::{RedirectService, RequestContext, Resolution};
pub use stats_service::{AnalyticsPeriod, StatsService};
