//! Pagination of briefing listings

/// Briefings per page
pub const PAGE_SIZE: i64 = 6;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
    /// Whether pages exist after this one
    pub has_more: bool,
}

/// Calculate pagination metadata from total results and requested page
///
/// The page is clamped to `[1, total_pages]`.
///
/// # Examples
/// ```
/// use briefing_api::pagination::calculate_pagination;
///
/// // 14 briefings = 3 pages (6 + 6 + 2)
/// let p = calculate_pagination(14, 2);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 6);
/// assert!(p.has_more);
///
/// let p = calculate_pagination(14, 99);
/// assert_eq!(p.page, 3);
/// assert!(!p.has_more);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.max(1).min(total_pages.max(1));

    Pagination {
        page,
        total_pages,
        offset: (page - 1) * PAGE_SIZE,
        has_more: page < total_pages,
    }
}
