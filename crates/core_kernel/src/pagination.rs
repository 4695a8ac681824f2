//! Paging primitives
//!
//! Listing operations take a [`PageRequest`] and return a [`PageResult`]. Bounds
//! on `page`/`size` are enforced by the boundary layer, so these types accept
//! any value and stay well-defined for degenerate input.

use serde::{Deserialize, Serialize};

/// A zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Number of rows to skip before this page starts
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus the total element count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> PageResult<T> {
    pub fn new(content: Vec<T>, page: u32, size: u32, total_elements: u64) -> Self {
        Self {
            content,
            page,
            size,
            total_elements,
        }
    }

    /// An empty page for the given request
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request.page, request.size, 0)
    }

    /// `ceil(total / size)`; a zero page size yields zero pages
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        i128::from(self.page) >= i128::from(self.total_pages()) - 1
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Converts the content while keeping the paging metadata
    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_first_page() {
        let page: PageResult<u8> = PageResult::new(vec![], 0, 10, 0);
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_first());
        assert!(page.is_last());
        assert!(page.is_empty());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = PageResult::new(vec![1, 2, 3], 0, 3, 10);
        assert_eq!(page.total_pages(), 4);
        assert!(!page.is_last());

        let last = PageResult::new(vec![10], 3, 3, 10);
        assert!(last.is_last());
        assert!(!last.is_first());
    }

    #[test]
    fn test_zero_size_is_degenerate_but_defined() {
        let page: PageResult<u8> = PageResult::new(vec![], 2, 0, 5);
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_last());
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(3, 25).offset(), 75);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = PageResult::new(vec![1, 2], 1, 2, 6).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_elements, 6);
    }
}
