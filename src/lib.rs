//! # nanhi-link
//!
//! A link management API and redirect service built with Axum and PostgreSQL.
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, repository traits and pure rules
//!   (targeting, rotation, user-agent parsing, click worker)
//! - **Application Layer** ([`application`]) - Services orchestrating the rules
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL repositories,
//!   geolocation and webhook clients
//! - **API Layer** ([`api`]) - REST handlers, DTOs and middleware
//! - **Pages** ([`pages`]) - HTML served by the redirect service
//!
//! ## Servers
//!
//! Two Axum servers share one [`AppState`]:
//!
//! - the management API (`/api/*`, API key authentication)
//! - the redirect service (`GET /{code}`)
//!
//! ## Features
//!
//! - Custom or generated short codes, expiry, click limits, passwords
//! - Geo and time targeting, weighted A/B rotation, UTM tagging
//! - Tracking interstitials with owner analytics integrations
//! - Asynchronous click recording with retries and signed webhooks
//! - Per-link analytics and owner dashboard counters
//!
//! ## Configuration
//!
//! Loaded from environment variables via [`config::Config`].

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;
pub mod utils;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for integration tests and library users.
pub mod prelude {
    pub use crate::application::services::{
        AuthContext, AuthService, LinkService, ProjectService, RedirectService, StatsService,
    };
    pub use crate::domain::entities::{Click, Link, NewLink, Project};
    pub use crate::error::AppError;
    pub use crate::state::{AppState, Repositories, StateSettings};
}
