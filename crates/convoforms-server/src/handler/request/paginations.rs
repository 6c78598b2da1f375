use convoforms_postgres::query::{MAX_PAGE_SIZE, Pagination};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Offset pagination query parameters.
///
/// Missing values fall back to the first page of 50 items; out-of-range
/// values are clamped rather than rejected.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaginationRequest {
    /// Number of items to skip.
    pub offset: Option<i64>,
    /// Maximum number of items to return, at most 200.
    pub limit: Option<i64>,
}

impl PaginationRequest {
    const DEFAULT_LIMIT: i64 = 50;

    #[inline]
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, MAX_PAGE_SIZE)
    }
}

impl From<PaginationRequest> for Pagination {
    #[inline]
    fn from(value: PaginationRequest) -> Self {
        Pagination::new(value.limit(), value.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let pagination: Pagination = PaginationRequest::default().into();
        assert_eq!(pagination, Pagination::new(50, 0));
    }

    #[test]
    fn clamps_out_of_range_values() {
        let pagination: Pagination = PaginationRequest::new(-5, 10_000).into();
        assert_eq!(pagination.offset, 0);
        assert_eq!(pagination.limit, MAX_PAGE_SIZE);

        let pagination: Pagination = PaginationRequest::new(0, 0).into();
        assert_eq!(pagination.limit, 1);
    }
}
