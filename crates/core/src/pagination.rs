//! Page-number pagination for list endpoints.
//!
//! Query values arrive as raw strings; anything that fails to parse is
//! treated as if the parameter were absent.

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Page used when `page` is absent or below 1.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when `page_size` is absent or not positive.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound for `page_size`.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A resolved page request, ready to turn into `LIMIT` / `OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub page_size: i64,
}

impl Page {
    /// Resolve raw `page` / `page_size` query values into a clamped page.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self {
            page: clamp_page(parse_param(page)),
            page_size: clamp_page_size(parse_param(page_size)),
        }
    }

    /// Row limit for the query.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Row offset for the query.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Clamp a page number; values below 1 become [`DEFAULT_PAGE`].
pub fn clamp_page(page: Option<i64>) -> i64 {
    match page {
        Some(p) if p >= 1 => p,
        _ => DEFAULT_PAGE,
    }
}

/// Clamp a page size to `1..=MAX_PAGE_SIZE`.
///
/// Values above the ceiling become [`MAX_PAGE_SIZE`]; zero, negative, or
/// missing values become [`DEFAULT_PAGE_SIZE`].
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    match page_size {
        Some(s) if s > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
        Some(s) if s > 0 => s,
        _ => DEFAULT_PAGE_SIZE,
    }
}

fn parse_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
