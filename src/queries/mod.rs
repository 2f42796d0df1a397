//! Composable filter predicates and paginated fetches for the list views.
//!
//! Each filter struct builds a `Condition` from its present fields only;
//! absent fields never widen the predicate. Totals are counted inside the
//! same transaction as the page fetch so the count and the page agree.

pub mod certificate_queries;
pub mod order_queries;
pub mod warranty_queries;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 200;

/// Offset-based pagination input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Clamps to sane bounds: page ≥ 1, 1 ≤ page_size ≤ MAX_PAGE_SIZE.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(self) -> u64 {
        (self.page.max(1) - 1) * self.page_size
    }
}

/// One page of results with a transaction-consistent total.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: request.page,
            page_size: request.page_size,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_normalization_clamps_bounds() {
        let p = PageRequest {
            page: 0,
            page_size: 10_000,
        }
        .normalized();
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, MAX_PAGE_SIZE);
        assert_eq!(p.offset(), 0);

        let p2 = PageRequest {
            page: 3,
            page_size: 20,
        };
        assert_eq!(p2.offset(), 40);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<()> = Page {
            items: vec![],
            total: 41,
            page: 1,
            page_size: 20,
        };
        assert_eq!(page.total_pages(), 3);
    }
}
