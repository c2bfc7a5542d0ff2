//! Page/limit slicing for list queries

use std::ops::Range;

/// Index range of page `page` (1-based) of `limit` items over `total` results.
///
/// A `limit` of zero falls back to `default_limit`. Returns `None` when the
/// page is zero, no usable limit is available, or the page starts past the
/// end of the results; callers answer those with an empty list.
pub fn paginate(total: usize, page: usize, limit: usize, default_limit: usize) -> Option<Range<usize>> {
    if page == 0 {
        return None;
    }
    let limit = if limit == 0 { default_limit } else { limit };
    if limit == 0 {
        return None;
    }

    let start = (page - 1).checked_mul(limit)?;
    if start >= total {
        return None;
    }
    let end = start.saturating_add(limit).min(total);
    Some(start..end)
}

/// Applies [`paginate`] to an owned result list
pub fn page_of<T>(mut items: Vec<T>, page: usize, limit: usize, default_limit: usize) -> Vec<T> {
    match paginate(items.len(), page, limit, default_limit) {
        Some(range) => {
            items.truncate(range.end);
            items.drain(..range.start);
            items
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_page_holds_remainder() {
        assert_eq!(paginate(15, 1, 10, 100), Some(0..10));
        assert_eq!(paginate(15, 2, 10, 100), Some(10..15));
        assert_eq!(paginate(15, 3, 10, 100), None);
    }

    #[test]
    fn invalid_bounds_are_empty() {
        assert_eq!(paginate(15, 0, 10, 100), None);
        assert_eq!(paginate(0, 1, 10, 100), None);
        assert_eq!(paginate(15, 1, 0, 0), None);
        assert_eq!(paginate(15, usize::MAX, usize::MAX, 100), None);
    }

    #[test]
    fn zero_limit_uses_default() {
        assert_eq!(paginate(15, 1, 0, 4), Some(0..4));
    }

    #[test]
    fn page_of_slices_records() {
        let records: Vec<u32> = (1..=15).collect();
        assert_eq!(page_of(records.clone(), 2, 10, 100), (11..=15).collect::<Vec<_>>());
        assert!(page_of(records, 3, 10, 100).is_empty());
    }
}
