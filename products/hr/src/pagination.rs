use std::ops::Range;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One-based page selection over an ordered record list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Values below 1 are clamped to 1.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Builds a request from raw query values. Missing, malformed or
    /// non-positive values fall back to the defaults.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            page_size: parse_positive(page_size).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Index range of this page within `total` records, or `None` when the
    /// page starts past the end.
    pub fn window(&self, total: usize) -> Option<Range<usize>> {
        let start = self.offset();
        if start >= total {
            return None;
        }
        let end = start.saturating_add(self.page_size).min(total);
        Some(start..end)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    let value = raw?.trim().parse::<i64>().ok()?;
    if value < 1 {
        return None;
    }
    usize::try_from(value).ok()
}
