//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through private `FromRow` structs. JSONB columns go through
//! [`sqlx::types::Json`].
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage and retrieval
//! - [`PgClickRepository`] - Click recording and analytics queries
//! - [`PgProjectRepository`] - Projects
//! - [`PgApiKeyRepository`] - API key storage and validation
//! - [`PgIntegrationRepository`] - Owner integrations
//! - [`PgHealthProbe`] - Connectivity check

pub mod pg_api_key_repository;
pub mod pg_click_repository;
pub mod pg_health_probe;
pub mod pg_integration_repository;
pub mod pg_link_repository;
pub mod pg_project_repository;

pub use pg_api_key_repository::PgApiKeyRepository;
pub use pg_click_repository::PgClickRepository;
pub use pg_health_probe::{DatabaseProbe, PgHealthProbe};
pub use pg_integration_repository::PgIntegrationRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_project_repository::PgProjectRepository;
