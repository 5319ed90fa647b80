//! Pagination query parameters and response metadata.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::application::services::link_service::{
    DEFAULT_PAGE_SIZE, LinkPage, ListLinksQuery, MAX_PAGE_SIZE,
};
use crate::error::AppError;

/// Query parameters for `GET /api/links`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListLinksParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub project_id: Option<i64>,

    #[serde(default)]
    pub search: Option<String>,
}

impl ListLinksParams {
    /// Validates bounds and converts to a service query.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `limit`: 20
    ///
    /// # Errors
    ///
    /// `VALIDATION_ERROR` when `page` is 0 or `limit` is outside 1..=100.
    pub fn into_query(self) -> Result<ListLinksQuery, AppError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::bad_request(
                "page must be greater than 0",
                serde_json::json!({ "page": page }),
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::bad_request(
                format!("limit must be between 1 and {}", MAX_PAGE_SIZE),
                serde_json::json!({ "limit": limit }),
            ));
        }

        Ok(ListLinksQuery {
            page,
            limit,
            project_id: self.project_id,
            search: self.search,
        })
    }
}

/// Pagination metadata for list responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl From<&LinkPage> for PaginationMeta {
    fn from(page: &LinkPage) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages(),
        }
    }
}
