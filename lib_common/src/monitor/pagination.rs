//! Bounded page derivation over the sample sequence.
//!
//! The pager never owns the data; it only derives a window over whatever
//! sequence the scoreboard currently publishes. An empty sequence is exactly
//! one empty page, and the page index always stays within
//! `[1, max(1, ceil(len / per_page))]`.

/// Default page size of the dashboard sample table.
pub const DEFAULT_PER_PAGE: usize = 10;

/// A 1-based page cursor over an ordered sequence of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    /// Current page, always >= 1.
    page: usize,
    /// Fixed page size, always >= 1.
    per_page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl Pager {
    /// Creates a pager on page 1. A `per_page` of zero is bumped to one.
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// The current page (1-based).
    pub fn page(&self) -> usize {
        self.page
    }

    /// The fixed page size.
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Total pages for a sequence of `len` items: `max(1, ceil(len / per_page))`.
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.per_page).max(1)
    }

    /// Moves back to page 1.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Clamps the page down to `total_pages(len)` after the backing
    /// sequence shrank in place. Never clamps below 1. A wholesale
    /// replacement of the sequence goes through [`reset`](Self::reset)
    /// instead.
    pub fn clamp(&mut self, len: usize) {
        let total = self.total_pages(len);
        if self.page > total {
            self.page = total;
        }
    }

    /// Advances one page; a no-op at the last page.
    pub fn next(&mut self, len: usize) {
        if self.page < self.total_pages(len) {
            self.page += 1;
        }
    }

    /// Goes back one page; a no-op at page 1.
    pub fn prev(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// The slice of `items` visible on the current page:
    /// `[(page-1)*per_page, page*per_page)`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1) * self.per_page;
        let end = (start + self.per_page).min(items.len());
        if start >= items.len() {
            &[]
        } else {
            &items[start..end]
        }
    }
}
