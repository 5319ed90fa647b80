//! HTTP surface of both servers.
//!
//! The management API lives under `/api` and speaks JSON; the redirect
//! handler answers `GET /{code}` with a redirect or an HTML page.
//!
//! # Modules
//!
//! - [`dto`] - Request bodies, query parameters and JSON responses
//! - [`handlers`] - Axum handlers for links, projects, stats and redirects
//! - [`middleware`] - API key auth, per-IP rate limits and request tracing
//! - [`routes`] - The authenticated `/api` route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
