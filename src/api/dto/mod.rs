//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation where the service layer does not already check.

pub mod analytics;
pub mod health;
pub mod links;
pub mod pagination;
pub mod projects;
