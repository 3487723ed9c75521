//! Layout, capacity and timing constants.
//!
//! Everything here is fixed at compile time. Panel dimensions are not: they come
//! from [`PanelConfig`](super::PanelConfig) at startup, so every position that
//! depends on the canvas size is computed per frame by [`crate::geometry`].

// =============================================================================
// Text Metrics
// =============================================================================

/// Horizontal glyph cell in pixels at text size 1 (5px glyph + 1px spacing).
pub const GLYPH_WIDTH: i16 = 6;

/// Vertical glyph cell in pixels at text size 1 (7px glyph + 1px descender row).
pub const GLYPH_HEIGHT: i16 = 8;

// =============================================================================
// Transit Row Layout
// =============================================================================

/// Maximum number of transit rows shown at once.
pub const MAX_ROWS: usize = 2;

/// Gap between the canvas edge and the badge (left) or ETA box (right).
pub const OUTER_MARGIN: i16 = 2;

/// Gap between the destination label and its neighbours.
pub const INNER_GAP: i16 = 2;

/// Number of glyph cells reserved for the ETA label.
pub const ETA_CHARS: u8 = 3;

/// Share of the canvas height reserved for margins and row gaps (per mille).
pub const ROW_PADDING_PER_MILLE: u32 = 120;

/// Smallest badge diameter. Odd, so the badge always has a center pixel.
pub const MIN_BADGE_DIAMETER: i16 = 5;

// =============================================================================
// Frame Buffers
// =============================================================================

/// Draw commands a single frame may emit before further commands are dropped.
pub const MAX_DRAW_COMMANDS: usize = 96;

/// Bytes of text a single frame may reference before further text is dropped.
pub const TEXT_ARENA_BYTES: usize = 512;

// =============================================================================
// Timing
// =============================================================================

/// Minimum time between two rendered frames (milliseconds).
pub const MIN_RENDER_GAP_MS: u32 = 40;

const _: () = assert!(MIN_BADGE_DIAMETER % 2 == 1);
const _: () = assert!(MAX_ROWS >= 1);
const _: () = assert!(ROW_PADDING_PER_MILLE < 1000);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_cell() {
        assert_eq!(GLYPH_WIDTH, 6);
        assert_eq!(GLYPH_HEIGHT, 8);
    }

    #[test]
    fn test_eta_box_fits_default_canvas() {
        let eta_width = i16::from(ETA_CHARS) * GLYPH_WIDTH * 2;
        assert!(eta_width + 2 * OUTER_MARGIN < 128);
    }

    #[test]
    fn test_buffers_nonzero() {
        assert!(MAX_DRAW_COMMANDS > 0);
        assert!(TEXT_ARENA_BYTES > 0);
    }
}
