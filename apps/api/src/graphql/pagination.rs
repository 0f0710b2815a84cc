//! Shared pagination utilities for GraphQL resolvers
//!
//! List arguments follow the storefront convention: `pageSize` plus a
//! 1-based `currentPage`.

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: i32 = 20;

/// Maximum items per page for list queries
pub const MAX_PAGE_SIZE: i32 = 100;

/// Clamp page size to valid range
#[inline]
pub fn clamp_page_size(page_size: i32) -> u32 {
    page_size.clamp(1, MAX_PAGE_SIZE) as u32
}

/// Clamp page number to at least the first page
#[inline]
pub fn clamp_current_page(current_page: i32) -> u32 {
    current_page.max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_size_valid() {
        assert_eq!(clamp_page_size(50), 50);
    }

    #[test]
    fn test_clamp_page_size_too_high() {
        assert_eq!(clamp_page_size(500), 100);
    }

    #[test]
    fn test_clamp_page_size_too_low() {
        assert_eq!(clamp_page_size(0), 1);
        assert_eq!(clamp_page_size(-5), 1);
    }

    #[test]
    fn test_clamp_current_page() {
        assert_eq!(clamp_current_page(3), 3);
        assert_eq!(clamp_current_page(0), 1);
        assert_eq!(clamp_current_page(-2), 1);
    }
}
