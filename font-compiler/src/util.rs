//! Misc utility functions

/// The binary search parameters stored in the table directory and in cmap
/// format 4 subtables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchRange {
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SearchRange {
    /// Compute the search parameters for `n_items` items of `item_size` bytes.
    ///
    /// `search_range` is `item_size` times the largest power of two that is
    /// `<= n_items`, `entry_selector` is the log2 of that power, and
    /// `range_shift` is the remainder `n_items * item_size - search_range`.
    pub fn compute(n_items: usize, item_size: usize) -> Self {
        // The result doesn't really make sense with 0 items but ... let's at least not fail
        let entry_selector = n_items.checked_ilog2().unwrap_or(0) as usize;
        let search_range = (1usize << entry_selector) * item_size;
        let range_shift = (n_items * item_size).saturating_sub(search_range);
        SearchRange {
            search_range: search_range.try_into().unwrap_or(u16::MAX),
            entry_selector: entry_selector.try_into().unwrap_or(u16::MAX),
            range_shift: range_shift.try_into().unwrap_or(u16::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SearchRange;

    #[test]
    fn table_directory_params() {
        // Roboto has 22 tables
        let range = SearchRange::compute(22, 16);
        assert_eq!(
            (256, 4, 96),
            (range.search_range, range.entry_selector, range.range_shift)
        );
        let range = SearchRange::compute(9, 16);
        assert_eq!(
            (128, 3, 16),
            (range.search_range, range.entry_selector, range.range_shift)
        );
    }

    #[test]
    fn segment_params() {
        for seg_count in 1..=300usize {
            let range = SearchRange::compute(seg_count, 2);
            let pow = 1usize << range.entry_selector;
            assert_eq!(range.search_range as usize, 2 * pow);
            assert!(pow <= seg_count && seg_count < pow * 2);
            assert_eq!(range.range_shift as usize, 2 * seg_count - 2 * pow);
        }
    }

    #[test]
    fn survives_zero() {
        let range = SearchRange::compute(0, 16);
        assert_eq!(range.range_shift, 0);
    }
}
