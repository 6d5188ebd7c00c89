use crate::shared::types::NextPage;

/// 1-indexed paginator over a counted result set.
///
/// Out-of-range page numbers clamp to the nearest valid page instead of
/// erroring, and an empty result set still has one (empty) page.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    pub total_items: i64,
    pub page_size: i64,
}

/// A resolved page position plus the LIMIT/OFFSET to fetch it.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Paginator {
    pub fn new(total_items: i64, page_size: i64) -> Self {
        Self {
            total_items: total_items.max(0),
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self) -> i64 {
        (self.total_items + self.page_size - 1) / self.page_size.max(1)
    }

    /// Resolve a requested page number, clamping into `1..=total_pages`.
    pub fn get_page(&self, requested: i64) -> Page {
        let total_pages = self.total_pages().max(1);
        let number = requested.clamp(1, total_pages);
        Page {
            number,
            total_pages,
            total_items: self.total_items,
            limit: self.page_size,
            offset: (number - 1) * self.page_size,
        }
    }
}

impl Page {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn next_page_number(&self) -> NextPage {
        if self.has_next() {
            NextPage::Page(self.number + 1)
        } else {
            NextPage::End
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_items_one_per_page() {
        let p = Paginator::new(3, 1);
        assert_eq!(p.total_pages(), 3);

        let first = p.get_page(1);
        assert_eq!(first.offset, 0);
        assert!(first.has_next());
        assert_eq!(first.next_page_number(), NextPage::Page(2));

        let last = p.get_page(3);
        assert!(!last.has_next());
        assert_eq!(last.next_page_number(), NextPage::End);
    }

    #[test]
    fn out_of_range_clamps_to_last_page() {
        let page = Paginator::new(3, 1).get_page(4);
        assert_eq!(page.number, 3);
        assert_eq!(page.offset, 2);
        assert!(!page.has_next());
    }

    #[test]
    fn zero_and_negative_clamp_to_first_page() {
        let p = Paginator::new(10, 5);
        assert_eq!(p.get_page(0).number, 1);
        assert_eq!(p.get_page(-2).number, 1);
    }

    #[test]
    fn empty_set_has_one_empty_page() {
        let page = Paginator::new(0, 20).get_page(7);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 0);
        assert_eq!(page.offset, 0);
        assert!(!page.has_next());
    }

    #[test]
    fn partial_last_page() {
        let p = Paginator::new(21, 20);
        assert_eq!(p.total_pages(), 2);
        let last = p.get_page(2);
        assert_eq!(last.offset, 20);
        assert!(!last.has_next());
    }
}
