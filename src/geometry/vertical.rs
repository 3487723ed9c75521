//! Vertical distribution of transit rows.
//!
//! The canvas height is split into `row_count + 1` padding slots (top margin,
//! one gap between each pair of rows, bottom margin) and `row_count` row bodies.
//! Both splits use the same drift-free integer allocation, so:
//!
//! - slot sizes always sum to exactly the budget they split
//! - no two slots of the same kind differ by more than one pixel
//!
//! ```text
//!  ┌──────────────────────────┐
//!  │ top margin               │
//!  ├──────────────────────────┤  rows[0].y_start
//!  │ row 0                    │
//!  ├──────────────────────────┤
//!  │ gap                      │
//!  ├──────────────────────────┤  rows[1].y_start
//!  │ row 1                    │
//!  ├──────────────────────────┤
//!  │ bottom margin            │
//!  └──────────────────────────┘
//! ```

use crate::config::{MAX_ROWS, ROW_PADDING_PER_MILLE};

/// Vertical slice of the canvas owned by one transit row.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RowFrame {
    /// First pixel row.
    pub y_start: i16,
    /// Height in pixels.
    pub height: i16,
}

/// Result of splitting the canvas height into rows.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct VerticalLayout {
    /// Row frames; only the first `row_count` entries are meaningful.
    pub rows: [RowFrame; MAX_ROWS],
    /// Number of rows laid out (1..=`MAX_ROWS`).
    pub row_count: usize,
    /// Space above the first row.
    pub top_margin: i16,
    /// Space below the last row.
    pub bottom_margin: i16,
    /// Space between consecutive rows; only the first `row_count - 1` are used.
    pub gaps: [i16; MAX_ROWS],
}

/// Extra pixels slot `index` of `total` receives when `remainder` pixels are
/// spread across the slots.
///
/// `floor(R*(i+1)/N) - floor(R*i/N)`: the deltas for `i in 0..N` sum to exactly
/// `R` and each is either `floor(R/N)` or one more.
pub const fn distribute_extra(
    index: usize,
    total: usize,
    remainder: i32,
) -> i32 {
    if remainder <= 0 || total == 0 {
        return 0;
    }
    let prev = (remainder as i64 * index as i64) / total as i64;
    let next = (remainder as i64 * (index as i64 + 1)) / total as i64;
    (next - prev) as i32
}

impl VerticalLayout {
    /// Split `total_height` into `row_count` rows (clamped to `1..=MAX_ROWS`).
    pub fn compute(
        total_height: u16,
        row_count: usize,
    ) -> Self {
        let row_count = row_count.clamp(1, MAX_ROWS);
        let mut out = Self {
            row_count,
            ..Self::default()
        };

        if total_height == 0 {
            return out;
        }

        let total = i32::from(total_height);
        let rows = row_count as i32;

        // Padding budget, shrunk so every row keeps at least one pixel.
        let mut padding = (total * ROW_PADDING_PER_MILLE as i32) / 1000;
        padding = padding.min((total - rows).max(0));
        let usable = total - padding;

        let slots = row_count + 1;
        let pad_unit = padding / slots as i32;
        let pad_remainder = padding % slots as i32;
        let slot_size = |slot: usize| pad_unit + distribute_extra(slot, slots, pad_remainder);

        let base_row_height = usable / rows;
        let row_remainder = usable % rows;

        out.top_margin = slot_size(0) as i16;
        out.bottom_margin = slot_size(slots - 1) as i16;

        let mut y = slot_size(0);
        for i in 0..row_count {
            let height = base_row_height + distribute_extra(i, row_count, row_remainder);
            out.rows[i] = RowFrame {
                y_start: y as i16,
                height: height as i16,
            };
            y += height;
            if i + 1 < row_count {
                let gap = slot_size(i + 1);
                out.gaps[i] = gap as i16;
                y += gap;
            }
        }

        out
    }

    /// Frames of the laid-out rows.
    #[inline]
    pub fn frames(&self) -> &[RowFrame] { &self.rows[..self.row_count] }

    /// Gaps between the laid-out rows.
    #[inline]
    pub fn row_gaps(&self) -> &[i16] { &self.gaps[..self.row_count - 1] }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn covered_height(layout: &VerticalLayout) -> i32 {
        let rows: i32 = layout.frames().iter().map(|r| i32::from(r.height)).sum();
        let gaps: i32 = layout.row_gaps().iter().map(|g| i32::from(*g)).sum();
        i32::from(layout.top_margin) + gaps + i32::from(layout.bottom_margin) + rows
    }

    #[test]
    fn test_distribute_extra_sums_to_remainder() {
        for total in 1..8 {
            for remainder in 0..20 {
                let sum: i32 = (0..total).map(|i| distribute_extra(i, total, remainder)).sum();
                assert_eq!(sum, remainder, "total={total} remainder={remainder}");
            }
        }
    }

    #[test]
    fn test_distribute_extra_degenerate() {
        assert_eq!(distribute_extra(0, 0, 5), 0);
        assert_eq!(distribute_extra(0, 3, 0), 0);
        assert_eq!(distribute_extra(1, 3, -2), 0);
    }

    #[test]
    fn test_two_rows_on_32px() {
        let layout = VerticalLayout::compute(32, 2);
        assert_eq!(layout.row_count, 2);
        assert_eq!(layout.top_margin, 1);
        assert_eq!(layout.gaps[0], 1);
        assert_eq!(layout.bottom_margin, 1);
        assert_eq!(layout.rows[0], RowFrame { y_start: 1, height: 14 });
        assert_eq!(layout.rows[1], RowFrame { y_start: 16, height: 15 });
        assert_eq!(covered_height(&layout), 32);
    }

    #[test]
    fn test_single_row_on_32px() {
        let layout = VerticalLayout::compute(32, 1);
        assert_eq!(layout.row_count, 1);
        assert_eq!(layout.top_margin + layout.bottom_margin, 3);
        assert_eq!(layout.rows[0].height, 29);
        assert_eq!(layout.rows[0].y_start, layout.top_margin);
        assert!(layout.row_gaps().is_empty());
    }

    #[test]
    fn test_row_count_clamped() {
        assert_eq!(VerticalLayout::compute(64, 0).row_count, 1);
        assert_eq!(VerticalLayout::compute(64, 9).row_count, MAX_ROWS);
    }

    #[test]
    fn test_zero_height() {
        let layout = VerticalLayout::compute(0, 2);
        assert_eq!(layout.rows[0], RowFrame::default());
        assert_eq!(layout.top_margin, 0);
        assert_eq!(layout.bottom_margin, 0);
    }

    #[test]
    fn test_padding_shrinks_for_tiny_canvas() {
        let layout = VerticalLayout::compute(2, 2);
        assert_eq!(layout.rows[0].height, 1);
        assert_eq!(layout.rows[1].height, 1);
        assert_eq!(covered_height(&layout), 2);
    }

    #[test]
    fn test_rows_are_contiguous_with_gaps() {
        let layout = VerticalLayout::compute(64, 2);
        let first = layout.rows[0];
        let second = layout.rows[1];
        assert_eq!(second.y_start, first.y_start + first.height + layout.gaps[0]);
        assert_eq!(i32::from(second.y_start + second.height + layout.bottom_margin), 64);
    }

    proptest! {
        #[test]
        fn prop_distribution_is_exact(height in 1u16..=2048, rows in 1usize..=MAX_ROWS) {
            prop_assume!(usize::from(height) >= rows);
            let layout = VerticalLayout::compute(height, rows);
            prop_assert_eq!(covered_height(&layout), i32::from(height));
        }

        #[test]
        fn prop_slots_balanced(height in 1u16..=2048, rows in 1usize..=MAX_ROWS) {
            prop_assume!(usize::from(height) >= rows);
            let layout = VerticalLayout::compute(height, rows);

            let heights: Vec<i16> = layout.frames().iter().map(|r| r.height).collect();
            let max_h = *heights.iter().max().unwrap();
            let min_h = *heights.iter().min().unwrap();
            prop_assert!(max_h - min_h <= 1);
            prop_assert!(min_h >= 1);

            let mut pads = vec![layout.top_margin, layout.bottom_margin];
            pads.extend_from_slice(layout.row_gaps());
            let max_p = *pads.iter().max().unwrap();
            let min_p = *pads.iter().min().unwrap();
            prop_assert!(max_p - min_p <= 1);
        }
    }
}
