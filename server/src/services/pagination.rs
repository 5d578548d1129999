//! Page/limit query parameters and their translation to a store window.

use serde::Deserialize;

use crate::backend::Window;

pub const DEFAULT_PAGE_LIMIT: i64 = 6;
pub const MAX_PAGE_LIMIT: i64 = 50;

/// `?page=&limit=` as sent by the admin panels. Pages are 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    #[cfg(test)]
    #[must_use]
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page: Some(page), limit: Some(limit) }
    }

    /// Page 0 or below is page 1; the limit is clamped to `1..=MAX_PAGE_LIMIT`.
    #[must_use]
    pub fn window(self) -> Window {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        Window { offset: (page - 1).saturating_mul(limit), limit }
    }
}

#[cfg(test)]
#[path = "pagination_test.rs"]
mod tests;
