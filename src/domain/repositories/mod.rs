//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link CRUD and click counter
//! - [`ClickRepository`] - Click recording and analytics
//! - [`ProjectRepository`] - Project management
//! - [`ApiKeyRepository`] - API key authentication
//! - [`IntegrationRepository`] - Owner analytics/webhook integrations

pub mod api_key_repository;
pub mod click_repository;
pub mod integration_repository;
pub mod link_repository;
pub mod project_repository;

pub use api_key_repository::{ApiKey, ApiKeyRepository};
pub use click_repository::{Breakdown, ClickRepository, DailyClicks, LinkAnalytics, OwnerStats};
pub use integration_repository::IntegrationRepository;
pub use link_repository::{LinkFilter, LinkRepository};
pub use project_repository::ProjectRepository;

#[cfg(test)]
pub use api_key_repository::MockApiKeyRepository;
#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use integration_repository::MockIntegrationRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
