//! Page arithmetic for upstream result windows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Solicitations shown per page.
pub const SOLICITATIONS_PER_PAGE: u64 = 20;

// Display window around the current page.
const LEFT_EDGE: u64 = 2;
const LEFT_CURRENT: u64 = 2;
const RIGHT_CURRENT: u64 = 5;
const RIGHT_EDGE: u64 = 2;

/// Zero-based index of the first record on `page_number`.
///
/// Callers pass `page_number >= 1`; a zero page is treated as page 1. Offsets
/// past `u64::MAX` saturate, which upstream answers with an empty page.
pub fn compute_offset(page_number: u64, page_size: u64) -> u64 {
    page_number.saturating_sub(1).saturating_mul(page_size)
}

/// A requested page, clamped to `page_number >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_number: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page_number: i64) -> Self {
        Self::with_size(page_number, SOLICITATIONS_PER_PAGE)
    }

    pub fn with_size(page_number: i64, page_size: u64) -> Self {
        Self {
            page_number: page_number.max(1) as u64,
            page_size: page_size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        compute_offset(self.page_number, self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u64,
    pub per_page: u64,
    pub total_count: u64,
    pub offset: u64,
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    pub fn new(page_number: u64, page_size: u64, total_count: u64) -> Self {
        let page = page_number.max(1);
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };

        Self {
            page,
            per_page: page_size,
            total_count,
            offset: compute_offset(page, page_size),
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }

    pub fn from_request(request: &PageRequest, total_count: u64) -> Self {
        Self::new(request.page_number, request.page_size, total_count)
    }

    /// True when the requested page starts past the last record.
    pub fn is_out_of_range(&self) -> bool {
        self.offset >= self.total_count
    }

    pub fn previous_page(&self) -> Option<u64> {
        self.has_previous.then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_next.then(|| self.page + 1)
    }

    /// Page numbers to render in a pager, `None` marking a gap.
    ///
    /// Keeps the first and last two pages plus a band from two pages before
    /// the current page to four after it.
    pub fn pages(&self) -> Vec<Option<u64>> {
        let total = self.total_pages;
        let band_start = self.page.saturating_sub(LEFT_CURRENT).max(1);
        let band_end = self.page.saturating_add(RIGHT_CURRENT - 1).min(total);
        let tail_start = total.saturating_sub(RIGHT_EDGE - 1).max(1);

        let shown: BTreeSet<u64> = (1..=LEFT_EDGE.min(total))
            .chain(band_start..=band_end)
            .chain(tail_start..=total)
            .collect();

        let mut window = Vec::with_capacity(shown.len() + 2);
        let mut last = 0;
        for num in shown {
            if last + 1 != num {
                window.push(None);
            }
            window.push(Some(num));
            last = num;
        }

        window
    }
}
