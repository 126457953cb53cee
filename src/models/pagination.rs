//! Page arithmetic shared by every listing

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// `?page=N` query parameter of plain listings
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number (default: 1)
    pub page: Option<i64>,
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub items: Vec<T>,
    /// Number of records across all pages
    pub total: i64,
    /// Current page number (1-based)
    pub page: i64,
    /// Items per page
    pub per_page: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Slice of a result set selected by a page number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
    pub offset: i64,
    pub limit: i64,
}

impl PageWindow {
    /// Resolve `page` (default 1) against `total` records.
    ///
    /// The first page always exists, even when empty. Any other page outside
    /// `1..=num_pages` is reported as not found.
    pub fn new(page: Option<i64>, per_page: i64, total: i64) -> AppResult<Self> {
        if per_page <= 0 {
            return Err(AppError::Internal(format!("Invalid page size {}", per_page)));
        }

        let total = total.max(0);
        let num_pages = ((total + per_page - 1) / per_page).max(1);
        let page = page.unwrap_or(1);

        if page < 1 || page > num_pages {
            return Err(AppError::NotFound(format!("Invalid page {}", page)));
        }

        let offset = (page - 1) * per_page;
        let limit = per_page.min(total - offset).max(0);

        Ok(Self {
            page,
            per_page,
            total,
            num_pages,
            offset,
            limit,
        })
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T>
    where
        T: for<'a> ToSchema<'a>,
    {
        Page {
            items,
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            num_pages: self.num_pages,
            has_next: self.page < self.num_pages,
            has_previous: self.page > 1,
        }
    }
}
