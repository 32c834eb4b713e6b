//! Collection page envelope.

use serde::Serialize;

use crate::request::PageRequest;

/// One page of a collection together with the pagination metadata the
/// serving layer needs to render `_meta` style envelopes.
///
/// An out-of-range page is represented as an empty `Page`, not an error;
/// callers that require the page to exist decide that policy themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    page: u32,
    per_page: u32,
    total_items: u64,
}

impl<T> Page<T> {
    /// Wrap a loaded page of items with its request and collection total.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total_items,
        }
    }

    /// An empty page for the given request.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the envelope, yielding the items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The 1-indexed page number this envelope holds.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The page size used to produce this envelope.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Total items in the whole collection.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Total pages in the whole collection at this page size.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.per_page as u64)
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform the items while keeping the pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    clippy::indexing_slicing,
    reason = "panicking on malformed fixtures is the assertion"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn page_of(total: u64, request: PageRequest, items: Vec<u32>) -> Page<u32> {
        Page::new(items, request, total)
    }

    #[rstest]
    fn totals_round_up_to_whole_pages() {
        let page = page_of(21, PageRequest::new(1, 10), (0..10).collect());
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(!page.has_prev());
    }

    #[rstest]
    fn last_page_has_no_next() {
        let page = page_of(21, PageRequest::new(3, 10), vec![20]);
        assert!(!page.has_next());
        assert!(page.has_prev());
        assert_eq!(page.len(), 1);
    }

    #[rstest]
    fn empty_page_reports_zero_everything() {
        let page = Page::<u32>::empty(PageRequest::new(5, 10));
        assert!(page.is_empty());
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }

    #[rstest]
    fn map_preserves_metadata() {
        let page = page_of(2, PageRequest::new(1, 10), vec![1, 2]).map(|n| n * 2);
        assert_eq!(page.items(), &[2, 4]);
        assert_eq!(page.total_items(), 2);
        assert_eq!(page.per_page(), 10);
    }

    #[rstest]
    fn serialises_with_metadata() {
        let page = page_of(1, PageRequest::new(1, 10), vec![7]);
        let value = serde_json::to_value(&page).expect("serialisable");
        assert_eq!(value["items"][0], 7);
        assert_eq!(value["total_items"], 1);
        assert_eq!(value["page"], 1);
    }
}
