//! Color constants for the transit matrix.
//!
//! All colors are `Rgb565` (5 bits red, 6 bits green, 5 bits blue), the 16-bit
//! format the HUB75 framebuffer stores natively. Standard colors come from the
//! `RgbColor` trait constants; the rest are tuned for LED panels, where low
//! channel values already read as bright.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait)
// =============================================================================

/// Pure black. Canvas background.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white. Destination labels, badge labels, status headline.
pub const WHITE: Rgb565 = Rgb565::WHITE;

/// Pure red. Urgent ETA (due or at most one minute).
pub const RED: Rgb565 = Rgb565::RED;

/// Pure green. Comfortable ETA (up to twelve minutes).
pub const GREEN: Rgb565 = Rgb565::GREEN;

// =============================================================================
// Custom Colors
// =============================================================================

/// Amber warning color (0xFD20). ETA within five minutes.
pub const AMBER: Rgb565 = Rgb565::new(31, 41, 0);

/// Mid gray (0x7BEF). Status detail line and unknown ETAs.
pub const GRAY: Rgb565 = Rgb565::new(15, 31, 15);

/// Soft cyan (0x5F1A). Status view title.
pub const CYAN: Rgb565 = Rgb565::new(11, 56, 26);

/// Badge fill used for every route. Provider-specific styling is supplied
/// from outside the core.
pub const BADGE_FILL: Rgb565 = Rgb565::new(0, 22, 24);

// =============================================================================
// Semantic Aliases
// =============================================================================

/// ETA at or below one minute.
pub const ETA_URGENT: Rgb565 = RED;

/// ETA at or below five minutes.
pub const ETA_WARNING: Rgb565 = AMBER;

/// ETA at or below twelve minutes.
pub const ETA_NORMAL: Rgb565 = GREEN;

/// ETA further away than twelve minutes.
pub const ETA_NEUTRAL: Rgb565 = WHITE;

/// Missing or non-numeric ETA.
pub const ETA_MUTED: Rgb565 = GRAY;

#[cfg(test)]
mod tests {
    use embedded_graphics::prelude::IntoStorage;

    use super::*;

    #[test]
    fn test_raw_values_match_panel_palette() {
        assert_eq!(AMBER.into_storage(), 0xFD20);
        assert_eq!(GRAY.into_storage(), 0x7BEF);
        assert_eq!(CYAN.into_storage(), 0x5F1A);
        assert_eq!(RED.into_storage(), 0xF800);
        assert_eq!(GREEN.into_storage(), 0x07E0);
    }

    #[test]
    fn test_eta_colors_distinct() {
        let colors = [ETA_URGENT, ETA_WARNING, ETA_NORMAL, ETA_NEUTRAL, ETA_MUTED];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
