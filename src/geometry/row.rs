//! Horizontal layout of a single transit row.
//!
//! ```text
//!  │◀ OUTER ▶│◀ badge ▶│◀ GAP ▶│◀── destination ──▶│◀ GAP ▶│◀ ETA ▶│◀ OUTER ▶│
//! ```
//!
//! The badge is vertically centered in its row frame. Text is centered against
//! the badge rather than the frame, so labels line up with the badge at any
//! text size.

use super::vertical::RowFrame;
use crate::config::{GLYPH_HEIGHT, GLYPH_WIDTH, INNER_GAP, MIN_BADGE_DIAMETER, OUTER_MARGIN};

/// Boxes for one transit row, in logical canvas pixels.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RowLayout {
    pub badge_x: i16,
    pub badge_y: i16,
    /// Badge diameter; always odd and at least [`MIN_BADGE_DIAMETER`].
    pub badge_size: i16,
    pub destination_x: i16,
    /// Zero when the row is too narrow for a destination label.
    pub destination_width: i16,
    pub eta_x: i16,
    pub eta_width: i16,
    /// Top of the text cells shared by destination and ETA.
    pub text_y: i16,
}

/// Round a requested diameter down to an odd value, never below
/// [`MIN_BADGE_DIAMETER`].
#[inline]
pub const fn odd_diameter(requested: i16) -> i16 {
    let size = if requested < MIN_BADGE_DIAMETER { MIN_BADGE_DIAMETER } else { requested };
    if size % 2 == 0 { size - 1 } else { size }
}

/// Pixel width of `chars` glyph cells at `text_size`.
#[inline]
pub const fn text_width(
    chars: usize,
    text_size: u8,
) -> i16 {
    chars as i16 * GLYPH_WIDTH * text_size as i16
}

/// Place badge, destination and ETA boxes for one row.
///
/// `text_size` and `eta_chars` are raised to at least 1.
pub fn compute_row_layout(
    total_width: i16,
    frame: RowFrame,
    text_size: u8,
    eta_chars: u8,
) -> RowLayout {
    let text_size = text_size.max(1);
    let eta_chars = eta_chars.max(1);

    let badge_size = odd_diameter((i32::from(frame.height) * 3 / 4) as i16);
    let badge_x = OUTER_MARGIN;
    let badge_y = frame.y_start + (frame.height - badge_size) / 2;

    let eta_width = text_width(usize::from(eta_chars), text_size);
    let eta_x = total_width - OUTER_MARGIN - eta_width;

    let destination_x = badge_x + badge_size + INNER_GAP;
    let destination_width = (eta_x - destination_x - INNER_GAP).max(0);

    let text_height = GLYPH_HEIGHT * i16::from(text_size);
    let text_y = badge_y + (badge_size - text_height) / 2;

    RowLayout {
        badge_x,
        badge_y,
        badge_size,
        destination_x,
        destination_width,
        eta_x,
        eta_width,
        text_y,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const FRAME_14: RowFrame = RowFrame { y_start: 1, height: 14 };

    #[test]
    fn test_odd_diameter() {
        assert_eq!(odd_diameter(0), 5);
        assert_eq!(odd_diameter(5), 5);
        assert_eq!(odd_diameter(6), 5);
        assert_eq!(odd_diameter(10), 9);
        assert_eq!(odd_diameter(21), 21);
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width(3, 1), 18);
        assert_eq!(text_width(3, 2), 36);
        assert_eq!(text_width(0, 2), 0);
    }

    #[test]
    fn test_tall_frame_keeps_odd_badge() {
        let frame = RowFrame {
            y_start: 1966,
            height: 14417,
        };
        let layout = compute_row_layout(4, frame, 2, 3);
        assert_eq!(layout.badge_size, 10811);
        assert_eq!(layout.badge_y, 1966 + (14417 - 10811) / 2);
        assert_eq!(layout.destination_width, 0);
    }

    #[test]
    fn test_row_on_128_wide_canvas() {
        let layout = compute_row_layout(128, FRAME_14, 1, 3);
        assert_eq!(layout.badge_size, 9);
        assert_eq!(layout.badge_x, 2);
        assert_eq!(layout.badge_y, 3);
        assert_eq!(layout.destination_x, 13);
        assert_eq!(layout.eta_width, 18);
        assert_eq!(layout.eta_x, 108);
        assert_eq!(layout.destination_width, 93);
        assert_eq!(layout.text_y, 3);
    }

    #[test]
    fn test_eta_right_aligned_with_margin() {
        let layout = compute_row_layout(256, RowFrame { y_start: 0, height: 30 }, 2, 3);
        assert_eq!(layout.eta_x + layout.eta_width, 256 - OUTER_MARGIN);
    }

    #[test]
    fn test_destination_clamped_when_too_narrow() {
        let layout = compute_row_layout(30, FRAME_14, 2, 3);
        assert_eq!(layout.destination_width, 0);
    }

    #[test]
    fn test_text_centered_on_badge() {
        let layout = compute_row_layout(128, RowFrame { y_start: 10, height: 40 }, 2, 3);
        // badge 29px at y=15, text 16px tall
        assert_eq!(layout.badge_size, 29);
        assert_eq!(layout.badge_y, 15);
        assert_eq!(layout.text_y, 15 + (29 - 16) / 2);
    }

    #[test]
    fn test_zero_sizes_raised() {
        let a = compute_row_layout(128, FRAME_14, 0, 0);
        let b = compute_row_layout(128, FRAME_14, 1, 1);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_badge_diameter_odd(requested in -10i16..500) {
            let d = odd_diameter(requested);
            prop_assert_eq!(d % 2, 1);
            prop_assert!(d >= MIN_BADGE_DIAMETER);
            prop_assert!(requested < MIN_BADGE_DIAMETER || d <= requested);
        }

        #[test]
        fn prop_row_badge_odd(height in 0i16..200, width in 0i16..1024, size in 1u8..=3) {
            let layout = compute_row_layout(width, RowFrame { y_start: 0, height }, size, 3);
            prop_assert_eq!(layout.badge_size % 2, 1);
            prop_assert!(layout.badge_size >= MIN_BADGE_DIAMETER);
            prop_assert!(layout.destination_width >= 0);
        }
    }
}
