//! Application layer services implementing business logic.
//!
//! Services consume repository traits and give HTTP handlers and the admin
//! CLI a clean API.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link creation, listing, updates and bulk import
//! - [`services::project_service::ProjectService`] - Projects
//! - [`services::stats_service::StatsService`] - Link analytics and owner counters
//! - [`services::auth_service::AuthService`] - API key authentication and lifecycle
//! - [`services::redirect_service::RedirectService`] - Short code resolution pipeline
//! - [`services::click_recorder::ClickRecorder`] - Click persistence for the worker
//! - [`services::tracking_composer`] - Interstitial script composition

pub mod services;
