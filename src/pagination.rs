/// Total page count for a collection. An empty collection still has one
/// page boundary so the menus always have a valid current page.
pub fn total_pages(count: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 1;
    }
    count.div_ceil(per_page).max(1)
}

/// Half-open index range for slicing the active collection. A current page
/// outside [1, total_pages] falls back to the first page-size window.
pub fn page_bounds(page: usize, per_page: usize, total_pages: usize) -> (usize, usize) {
    if page < 1 || page > total_pages {
        return (0, per_page);
    }
    let begin = (page - 1) * per_page;
    (begin, begin + per_page)
}

/// Slice of `items` for the given page, clamped to the collection bounds.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize, total_pages: usize) -> &[T] {
    let (begin, end) = page_bounds(page, per_page, total_pages);
    let begin = begin.min(items.len());
    let end = end.min(items.len());
    &items[begin..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn total_pages_never_below_one() {
        for count in 0..30 {
            assert!(total_pages(count, 10) >= 1);
        }
    }

    #[test]
    fn bounds_for_valid_pages() {
        assert_eq!(page_bounds(1, 10, 3), (0, 10));
        assert_eq!(page_bounds(2, 10, 3), (10, 20));
        assert_eq!(page_bounds(3, 10, 3), (20, 30));
    }

    #[test]
    fn out_of_range_page_falls_back_to_first_window() {
        assert_eq!(page_bounds(0, 10, 3), (0, 10));
        assert_eq!(page_bounds(4, 10, 3), (0, 10));
    }

    #[test]
    fn slice_never_exceeds_collection_bounds() {
        let items: Vec<usize> = (0..25).collect();
        let total = total_pages(items.len(), 10);
        for page in 0..=total + 1 {
            let slice = page_slice(&items, page, 10, total);
            assert!(slice.len() <= 10);
        }
        assert_eq!(page_slice(&items, 3, 10, total), &items[20..25]);
    }

    #[test]
    fn empty_collection_renders_empty_page() {
        let items: Vec<usize> = Vec::new();
        let total = total_pages(items.len(), 10);
        assert_eq!(total, 1);
        assert!(page_slice(&items, 1, 10, total).is_empty());
    }
}
