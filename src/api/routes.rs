//! Management API route configuration.
//!
//! All endpoints require an API key via [`crate::api::middleware::auth`].

use crate::api::handlers::{
    bulk_create_handler, create_link_handler, create_project_handler, delete_link_handler,
    get_link_handler, link_analytics_handler, list_links_handler, list_projects_handler,
    stats_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `GET    /links`                 - List links (paginated, filterable)
/// - `POST   /links`                 - Create a link
/// - `POST   /links/bulk`            - Create up to 100 links
/// - `GET    /links/{id}`            - Fetch a link
/// - `PUT    /links/{id}`            - Partially update a link
/// - `DELETE /links/{id}`            - Soft-delete a link
/// - `GET    /links/{id}/analytics`  - Click analytics for a period
/// - `GET    /projects`              - List projects
/// - `POST   /projects`              - Create a project
/// - `GET    /stats`                 - Owner dashboard counters
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route("/links/bulk", post(bulk_create_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .put(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/links/{id}/analytics", get(link_analytics_handler))
        .route(
            "/projects",
            get(list_projects_handler).post(create_project_handler),
        )
        .route("/stats", get(stats_handler))
}
