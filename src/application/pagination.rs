//! Numbered page arithmetic shared by every feed.
//!
//! Pages are 1-based. A request for a page past the end clamps to the last
//! page, and an empty candidate set still has exactly one (empty) page.

use std::num::NonZeroU32;

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Parse a raw `?page=` value. Absent, non-numeric, and zero values select page 1.
pub fn parse_page_number(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|number| *number >= 1)
        .unwrap_or(1)
}

/// Offset window a store adapter must fetch for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u32,
}

impl PageWindow {
    pub fn new(offset: u64, limit: u32) -> Self {
        Self { offset, limit }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset)
            .unwrap_or(usize::MAX)
            .min(items.len());
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let end = start.saturating_add(limit).min(items.len());
        &items[start..end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub number: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub page_size: u32,
    /// Number of items on this page.
    pub len: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageMeta {
    pub fn next_page_number(&self) -> Option<u32> {
        self.has_next.then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u32> {
        self.has_previous.then(|| self.number - 1)
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.offset(), self.page_size)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.page_size)
    }

    /// 1-based index of the first item on the page, 0 when the page is empty.
    pub fn start_index(&self) -> u64 {
        if self.len == 0 {
            0
        } else {
            self.offset() + 1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: NonZeroU32,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(NonZeroU32::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroU32::MIN))
    }
}

impl Paginator {
    pub fn new(page_size: NonZeroU32) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    pub fn total_pages(&self, total_items: u64) -> u32 {
        let size = u64::from(self.page_size.get());
        let pages = total_items.div_ceil(size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Resolve the requested page against `total_items`, clamping out-of-range requests.
    pub fn locate(&self, total_items: u64, requested: u32) -> PageMeta {
        let total_pages = self.total_pages(total_items);
        let number = requested.clamp(1, total_pages);
        let size = self.page_size.get();

        let len = if number < total_pages {
            size
        } else {
            let before = u64::from(number - 1) * u64::from(size);
            let remaining = total_items.saturating_sub(before);
            u32::try_from(remaining).unwrap_or(size).min(size)
        };

        PageMeta {
            number,
            total_pages,
            total_items,
            page_size: size,
            len,
            has_next: number < total_pages,
            has_previous: number > 1,
        }
    }

    /// Slice an already ordered sequence.
    pub fn paginate<T: Clone>(&self, items: &[T], requested: u32) -> Page<T> {
        let meta = self.locate(items.len() as u64, requested);
        Page {
            items: meta.window().slice(items).to_vec(),
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paginator(size: u32) -> Paginator {
        Paginator::new(NonZeroU32::new(size).expect("non-zero"))
    }

    #[test]
    fn fifteen_items_split_ten_then_five() {
        let items: Vec<u32> = (0..15).collect();
        let pages = paginator(10);

        let first = pages.paginate(&items, 1);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.meta.total_pages, 2);
        assert!(first.meta.has_next);
        assert!(!first.meta.has_previous);

        let second = pages.paginate(&items, 2);
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.meta.len, 5);
        assert!(!second.meta.has_next);
        assert!(second.meta.has_previous);
    }

    #[test]
    fn exact_multiple_fills_the_last_page() {
        let items: Vec<u32> = (0..20).collect();
        let pages = paginator(10);

        assert_eq!(pages.total_pages(20), 2);
        let second = pages.paginate(&items, 2);
        assert_eq!(second.items.len(), 10);
        assert_eq!(second.items.first(), Some(&10));

        let beyond = pages.paginate(&items, 3);
        assert_eq!(beyond.meta.number, 2);
        assert_eq!(beyond.items, second.items);
    }

    #[test]
    fn empty_set_has_one_empty_page() {
        let pages = paginator(10);
        let page = pages.paginate::<u32>(&[], 4);
        assert_eq!(page.meta.number, 1);
        assert_eq!(page.meta.total_pages, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.meta.start_index(), 0);
        assert!(!page.meta.has_next);
        assert!(!page.meta.has_previous);
    }

    #[test]
    fn pages_concatenate_to_the_full_sequence() {
        let pages = paginator(4);
        for total in 0..=13u32 {
            let items: Vec<u32> = (0..total).collect();
            let total_pages = pages.total_pages(u64::from(total));
            let mut collected = Vec::new();
            for number in 1..=total_pages {
                collected.extend(pages.paginate(&items, number).items);
            }
            assert_eq!(collected, items, "total = {total}");
        }
    }

    #[test]
    fn page_numbers_parse_leniently() {
        assert_eq!(parse_page_number(None), 1);
        assert_eq!(parse_page_number(Some("2")), 2);
        assert_eq!(parse_page_number(Some(" 3 ")), 3);
        assert_eq!(parse_page_number(Some("0")), 1);
        assert_eq!(parse_page_number(Some("-4")), 1);
        assert_eq!(parse_page_number(Some("last")), 1);
    }

    #[test]
    fn meta_navigation_helpers() {
        let meta = paginator(10).locate(25, 2);
        assert_eq!(meta.next_page_number(), Some(3));
        assert_eq!(meta.previous_page_number(), Some(1));
        assert_eq!(meta.window(), PageWindow::new(10, 10));
        assert_eq!(meta.start_index(), 11);

        let last = paginator(10).locate(25, 3);
        assert_eq!(last.len, 5);
        assert_eq!(last.next_page_number(), None);
    }

    #[test]
    fn window_slice_stays_in_bounds() {
        let items = [1, 2, 3];
        assert_eq!(PageWindow::new(2, 10).slice(&items), &[3]);
        assert!(PageWindow::new(5, 10).slice(&items).is_empty());
        assert_eq!(PageWindow::new(0, u32::MAX).slice(&items), &items);
    }
}
