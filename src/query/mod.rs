//! The list-view pipeline behind the queue table.
//!
//! Given the raw collection and a [`FilterSortState`], [`apply`] filters by
//! patient name, sorts stably, and cuts out the requested page. It is a pure
//! function of its inputs: the raw collection is only borrowed.

use std::ops::Range;

pub mod filter;
pub mod sort;

pub use filter::{filter_entries, matches_patient_name};
pub use sort::{SortField, SortKey, SortOrder, compare_entries, sort_entries, sort_key};

use crate::types::QueueEntry;

/// Page sizes offered by the table footer.
pub const ROWS_PER_PAGE_OPTIONS: &[usize] = &[5, 10, 25];

pub const DEFAULT_ROWS_PER_PAGE: usize = 5;

/// View-owned table parameters. Reset whenever the view is left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSortState {
    pub order: SortOrder,
    pub order_by: SortField,
    filter_name: String,
    page: usize,
    rows_per_page: usize,
}

impl Default for FilterSortState {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl FilterSortState {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            order: SortOrder::Asc,
            order_by: SortField::default(),
            filter_name: String::new(),
            page: 0,
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn filter_name(&self) -> &str {
        &self.filter_name
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Change the search text. Returns to the first page.
    pub fn set_filter_name(&mut self, filter_name: impl Into<String>) {
        self.filter_name = filter_name.into();
        self.page = 0;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Change the page size. Returns to the first page so the view never
    /// points past the end.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page.max(1);
        self.page = 0;
    }

    /// Column header click: a second click on the ascending column flips it
    /// to descending, any other click sorts ascending by that column.
    pub fn request_sort(&mut self, field: SortField) {
        self.order = if self.order_by == field {
            self.order.flip()
        } else {
            SortOrder::Asc
        };
        self.order_by = field;
    }
}

/// Index range of page `page` in a sequence of `len` items.
///
/// Clipped to `len`; a page past the end yields an empty range.
pub fn page_range(len: usize, page: usize, rows_per_page: usize) -> Range<usize> {
    let start = page.saturating_mul(rows_per_page).min(len);
    let end = start.saturating_add(rows_per_page).min(len);
    start..end
}

/// The contiguous slice for `page`, never longer than `rows_per_page`.
pub fn paginate<T>(items: &[T], page: usize, rows_per_page: usize) -> &[T] {
    &items[page_range(items.len(), page, rows_per_page)]
}

/// Result of running the pipeline once.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    matching: Vec<&'a QueueEntry>,
    range: Range<usize>,
    rows_per_page: usize,
    page: usize,
    not_found: bool,
}

impl<'a> PageView<'a> {
    /// Rows to render on the current page.
    pub fn rows(&self) -> &[&'a QueueEntry] {
        &self.matching[self.range.clone()]
    }

    /// Every entry matching the filter, sorted, before pagination.
    pub fn matching(&self) -> &[&'a QueueEntry] {
        &self.matching
    }

    pub fn total_matching(&self) -> usize {
        self.matching.len()
    }

    /// True only when the user searched and nothing matched.
    pub fn not_found(&self) -> bool {
        self.not_found
    }

    /// Zero-based index range of the visible rows within `matching`.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Blank rows that keep the table height constant on a short last page.
    pub fn empty_rows(&self) -> usize {
        if self.page == 0 {
            return 0;
        }
        (self.page + 1)
            .saturating_mul(self.rows_per_page)
            .saturating_sub(self.matching.len())
            .min(self.rows_per_page)
    }
}

/// Run filter, sort, and paginate over `entries`.
pub fn apply<'a>(entries: &'a [QueueEntry], state: &FilterSortState) -> PageView<'a> {
    let mut matching = filter_entries(entries, &state.filter_name);
    sort_entries(&mut matching, state.order_by, state.order);

    let range = page_range(matching.len(), state.page, state.rows_per_page);
    let not_found = matching.is_empty() && !state.filter_name.is_empty();

    PageView {
        matching,
        range,
        rows_per_page: state.rows_per_page,
        page: state.page,
        not_found,
    }
}
