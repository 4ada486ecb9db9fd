use serde::Serialize;

use crate::validation::{FromQueryParams, QueryParams, ValidationErrors};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Requested page window. `page` and `limit` are 1-based and at least 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl Pagination {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Read `page` and `limit` from the query string, recording problems in
    /// `errors`.
    pub fn from_params(params: &QueryParams, errors: &mut ValidationErrors) -> Self {
        Self {
            page: params.integer(errors, "page", 1),
            limit: params.integer(errors, "limit", 1),
        }
    }

    pub fn window(&self) -> Window {
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Window {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit),
        }
    }
}

impl FromQueryParams for Pagination {
    fn from_query_params(params: &QueryParams) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let pagination = Self::from_params(params, &mut errors);
        errors.finish(pagination)
    }
}

/// Resolved pagination: defaults applied and `limit` clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
}

/// One page of a list response.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, window: Window) -> Self {
        Self {
            data,
            total,
            page: window.page,
            limit: window.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let window = Pagination::default().window();
        assert_eq!(window, Window { page: 1, limit: 10, skip: 0 });
    }

    #[test]
    fn test_limit_clamped() {
        let window = Pagination::new(1, 500).window();
        assert_eq!(window.limit, 100);
    }

    #[test]
    fn test_skip() {
        let window = Pagination::new(3, 25).window();
        assert_eq!(window.skip, 50);
        assert_eq!(window.page, 3);
    }

    #[test]
    fn test_skip_saturates() {
        let window = Pagination::new(u64::MAX, 100).window();
        assert_eq!(window.skip, u64::MAX);
    }

    #[test]
    fn test_from_params() {
        let params = QueryParams::from([("page", "2"), ("limit", "5")]);
        let mut errors = ValidationErrors::new();
        let pagination = Pagination::from_params(&params, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(pagination, Pagination::new(2, 5));
    }

    #[test]
    fn test_from_params_rejects_zero_page() {
        let params = QueryParams::from([("page", "0")]);
        let mut errors = ValidationErrors::new();
        Pagination::from_params(&params, &mut errors);
        assert!(errors.has_field("page"));
    }
}
