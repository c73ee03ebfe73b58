//! Pagination types

use serde::{Deserialize, Serialize};

/// Maximum items per page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default items per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Offset pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Rows to skip
    pub offset: u64,
    /// Rows to return (max 100)
    pub limit: u32,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// Limit is clamped to 1..=100.
    pub fn new(offset: u64, limit: u32) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total matching count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items for the current window
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Offset of the first item
    pub offset: u64,
}

impl<T> Page<T> {
    /// Cut a window out of an already filtered and sorted list.
    pub fn slice(all: Vec<T>, page: Pagination) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect();
        Self {
            items,
            total,
            offset: page.offset,
        }
    }

    /// Check if rows exist after this page.
    pub fn has_next(&self) -> bool {
        self.offset + (self.items.len() as u64) < self.total.max(0) as u64
    }

    /// Check if rows exist before this page.
    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }

    /// Map items, keeping the window.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_limit() {
        assert_eq!(Pagination::new(0, 0).limit, 1);
        assert_eq!(Pagination::new(0, 999).limit, 100);
        assert_eq!(Pagination::default().limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn slice_window() {
        let page = Page::slice((1..=25).collect::<Vec<_>>(), Pagination::new(10, 10));
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total, 25);
        assert!(page.has_next());
        assert!(page.has_prev());

        let last = Page::slice((1..=25).collect::<Vec<_>>(), Pagination::new(20, 10));
        assert_eq!(last.items.len(), 5);
        assert!(!last.has_next());
    }

    #[test]
    fn offset_past_end_is_empty() {
        let page = Page::slice(vec![1, 2, 3], Pagination::new(10, 5));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert!(!page.has_next());
    }
}
