//! Pagination arithmetic
//!
//! Pure functions; pages are 1-indexed.

use std::fmt;
use std::ops::{Range, RangeInclusive};

/// Maximum number of page-number buttons shown at once
pub const MAX_PAGE_BUTTONS: usize = 5;

/// Items per page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limited(usize),
    Unbounded,
}

impl PageSize {
    /// Parse a page-size control value: a positive integer, `all` or `unbounded`
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") || value.eq_ignore_ascii_case("unbounded") {
            return Some(PageSize::Unbounded);
        }
        match value.parse::<usize>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(PageSize::Limited(n)),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, PageSize::Unbounded)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Limited(n) => write!(f, "{}", n),
            PageSize::Unbounded => write!(f, "all"),
        }
    }
}

/// `max(1, ceil(len / size))`
pub fn total_pages(len: usize, size: PageSize) -> usize {
    match size {
        PageSize::Limited(n) if n > 0 => len.div_ceil(n).max(1),
        _ => 1,
    }
}

/// Clamp `page` into `[1, total]`
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// Index range of the visible slice for `page`
pub fn slice_bounds(len: usize, page: usize, size: PageSize) -> Range<usize> {
    match size {
        PageSize::Limited(n) if n > 0 => {
            let start = (page.max(1) - 1).saturating_mul(n).min(len);
            let end = start.saturating_add(n).min(len);
            start..end
        }
        _ => 0..len,
    }
}

/// Sliding window of page numbers centered on `current`, clamped to `[1, total]`
pub fn page_window(current: usize, total: usize) -> RangeInclusive<usize> {
    let total = total.max(1);
    let current = clamp_page(current, total);
    let half = MAX_PAGE_BUTTONS / 2;
    let mut start = current.saturating_sub(half).max(1);
    let end = (start + MAX_PAGE_BUTTONS - 1).min(total);
    if end + 1 - start < MAX_PAGE_BUTTONS {
        start = (end + 1).saturating_sub(MAX_PAGE_BUTTONS).max(1);
    }
    start..=end
}
