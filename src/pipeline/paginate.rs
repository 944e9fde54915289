//! Paginate / virtualize stage
//!
//! Two mutually exclusive ways of windowing a sorted, filtered collection:
//! discrete pages (`paginate`, [`PageInfo`]) and incremental reveal for
//! virtual scroll ([`VirtualCursor`]).

use serde::Serialize;

/// Slice out one 1-indexed page
///
/// Returns `records[(page-1)*page_size .. page*page_size]`, truncated at the
/// end of the collection. Page 0, pages past the end and a zero page size
/// all yield an empty slice.
pub fn paginate<R>(records: &[R], page: usize, page_size: usize) -> &[R] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(records.len());
    &records[start..end]
}

/// Number of pages needed for `count` records, never less than 1
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

/// Clamp a page number into `[1, total_pages]`
pub fn clamp_page(page: usize, count: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(count, page_size))
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// Current page number (starts at 1, clamped into range)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages (at least 1)
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,

    /// Index of the first item on this page (0 when the page is empty)
    pub start: usize,

    /// One past the index of the last item on this page
    pub end: usize,
}

impl PageInfo {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        // Ensure page_size is at least 1 to avoid division by zero
        let page_size = page_size.max(1);
        let total_pages = total_pages(total, page_size);
        let page = page.clamp(1, total_pages);
        let start = ((page - 1) * page_size).min(total);
        let end = (start + page_size).min(total);

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
            start,
            end,
        }
    }

    /// "N–M of T" with 1-based N, or "0 of 0" for an empty table
    pub fn range_label(&self) -> String {
        if self.total == 0 {
            "0 of 0".to_string()
        } else {
            format!("{}–{} of {}", self.start + 1, self.end, self.total)
        }
    }
}

/// Proof that a load was started; completing it needs the matching generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Incremental reveal state for virtual scroll
///
/// `displayed` starts at `initial` and grows by `increment` per completed
/// load, capped at the collection size. A load is two-phase so hosts can show
/// a loading indicator in between; `reset` supersedes any load in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualCursor {
    initial: usize,
    increment: usize,
    displayed: usize,
    loading: bool,
    generation: u64,
}

impl VirtualCursor {
    pub fn new(initial: usize, increment: usize) -> Self {
        Self {
            initial,
            increment: increment.max(1),
            displayed: initial,
            loading: false,
            generation: 0,
        }
    }

    pub fn displayed(&self) -> usize {
        self.displayed
    }

    /// Number of rows actually shown out of `total`
    pub fn visible(&self, total: usize) -> usize {
        self.displayed.min(total)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.displayed < total
    }

    /// Start a load if there is more to show and none is in flight
    pub fn begin_load(&mut self, total: usize) -> Option<LoadTicket> {
        if self.loading || !self.has_more(total) {
            return None;
        }
        self.loading = true;
        Some(LoadTicket {
            generation: self.generation,
        })
    }

    /// Finish a load started with `begin_load`
    ///
    /// Returns false, changing nothing, if the cursor was reset since the
    /// ticket was issued.
    pub fn complete_load(&mut self, ticket: LoadTicket, total: usize) -> bool {
        if ticket.generation != self.generation || !self.loading {
            return false;
        }
        self.displayed = self.displayed.saturating_add(self.increment).min(total).max(self.displayed);
        self.loading = false;
        true
    }

    /// Abandon a load started with `begin_load` without revealing rows
    ///
    /// Returns false, changing nothing, if the ticket is stale or the load
    /// already finished.
    pub fn cancel_load(&mut self, ticket: LoadTicket) -> bool {
        if ticket.generation != self.generation || !self.loading {
            return false;
        }
        self.loading = false;
        true
    }

    /// Back to the initial size, superseding any load in flight
    pub fn reset(&mut self) {
        self.displayed = self.initial;
        self.loading = false;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Change the initial size and increment, then reset
    pub fn reconfigure(&mut self, initial: usize, increment: usize) {
        self.initial = initial;
        self.increment = increment.max(1);
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_slices() {
        let records: Vec<usize> = (0..120).collect();
        assert_eq!(paginate(&records, 1, 50), &records[0..50]);
        assert_eq!(paginate(&records, 3, 50), &records[100..120]);
        assert!(paginate(&records, 4, 50).is_empty());
        assert!(paginate(&records, 0, 50).is_empty());
        assert!(paginate(&records, 1, 0).is_empty());
    }

    #[test]
    fn test_total_pages_minimum_one() {
        assert_eq!(total_pages(0, 50), 1);
        assert_eq!(total_pages(120, 50), 3);
        assert_eq!(total_pages(100, 50), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(4, 120, 50), 3);
        assert_eq!(clamp_page(0, 120, 50), 1);
        assert_eq!(clamp_page(2, 0, 50), 1);
    }

    #[test]
    fn test_page_info() {
        let info = PageInfo::new(1, 20, 145);
        assert_eq!(info.total, 145);
        assert_eq!(info.total_pages, 8);
        assert!(!info.has_prev);
        assert!(info.has_next);
        assert_eq!(info.range_label(), "1–20 of 145");

        let last = PageInfo::new(99, 20, 145);
        assert_eq!(last.page, 8);
        assert!(!last.has_next);
        assert_eq!((last.start, last.end), (140, 145));

        assert_eq!(PageInfo::new(1, 20, 0).range_label(), "0 of 0");
    }

    #[test]
    fn test_virtual_cursor_caps_at_total() {
        let mut cursor = VirtualCursor::new(4, 4);
        let ticket = cursor.begin_load(10).expect("should start");
        assert!(cursor.is_loading());
        assert!(cursor.begin_load(10).is_none());
        assert!(cursor.complete_load(ticket, 10));
        assert_eq!(cursor.displayed(), 8);

        let ticket = cursor.begin_load(10).expect("should start");
        cursor.complete_load(ticket, 10);
        assert_eq!(cursor.displayed(), 10);
        assert!(!cursor.has_more(10));
        assert!(cursor.begin_load(10).is_none());
    }

    #[test]
    fn test_reset_supersedes_load() {
        let mut cursor = VirtualCursor::new(4, 4);
        let ticket = cursor.begin_load(10).expect("should start");
        cursor.reset();
        assert!(!cursor.complete_load(ticket, 10));
        assert_eq!(cursor.displayed(), 4);
        assert!(!cursor.is_loading());
    }

    #[test]
    fn test_cancel_load_frees_cursor() {
        let mut cursor = VirtualCursor::new(4, 4);
        let ticket = cursor.begin_load(10).expect("should start");
        assert!(cursor.cancel_load(ticket));
        assert!(!cursor.is_loading());
        assert_eq!(cursor.displayed(), 4);
        assert!(!cursor.complete_load(ticket, 10));
        assert!(!cursor.cancel_load(ticket));

        let stale = cursor.begin_load(10).expect("should start again");
        cursor.reset();
        let fresh = cursor.begin_load(10).expect("should start after reset");
        assert!(!cursor.cancel_load(stale));
        assert!(cursor.is_loading());
        assert!(cursor.complete_load(fresh, 10));
    }
}
