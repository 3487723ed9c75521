//! Filled circular route badges.
//!
//! The disc is filled with the midpoint circle algorithm, one horizontal span
//! per scanline, so a badge of radius `r` costs `O(r)` span writes rather than
//! `O(r²)` pixel tests. The diameter is always odd, which gives every badge an
//! exact center pixel and a disc that is symmetric in both axes.
//!
//! # Aspect correction
//!
//! Panels with non-square pixel pitch can stretch the disc horizontally by an
//! [`AspectRatio`] in Q8.8 fixed point. [`AspectRatio::SQUARE`] leaves every
//! span unchanged.

use embedded_graphics::pixelcolor::Rgb565;
use heapless::String;

use crate::display::Canvas;
use crate::geometry::odd_diameter;

/// Route labels hold at most this many characters.
pub const LABEL_CHARS: usize = 2;

// =============================================================================
// Aspect Ratio
// =============================================================================

/// Horizontal vs vertical pixel scale, both in Q8.8 (`256` = 1.0).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AspectRatio {
    pub x_q8_8: u16,
    pub y_q8_8: u16,
}

impl AspectRatio {
    /// Square pixels.
    pub const SQUARE: Self = Self {
        x_q8_8: 256,
        y_q8_8: 256,
    };

    /// Scale a horizontal half-width, rounding to nearest.
    ///
    /// Non-positive values map to 0; a zero `x` scale disables correction.
    pub const fn correct(
        self,
        value: i16,
    ) -> i16 {
        if value <= 0 {
            return 0;
        }
        if self.x_q8_8 == 0 {
            return value;
        }
        let num = value as i32 * self.y_q8_8 as i32 + (self.x_q8_8 / 2) as i32;
        let out = num / self.x_q8_8 as i32;
        if out > i16::MAX as i32 { i16::MAX } else { out as i16 }
    }
}

impl Default for AspectRatio {
    fn default() -> Self { Self::SQUARE }
}

// =============================================================================
// Labels
// =============================================================================

/// Badge label for a route identifier.
///
/// Separators (space, `-`, `_`) and other non-alphanumerics are skipped; the
/// first two ASCII alphanumerics are kept, uppercased.
pub fn route_label(route: &str) -> String<LABEL_CHARS> {
    let mut label = String::new();
    for c in route.chars().filter(char::is_ascii_alphanumeric) {
        if label.push(c.to_ascii_uppercase()).is_err() {
            break;
        }
    }
    label
}

// =============================================================================
// Rasterizer
// =============================================================================

/// Draws route badges onto a [`Canvas`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BadgeRasterizer {
    aspect: AspectRatio,
}

impl BadgeRasterizer {
    /// Rasterizer for square pixels.
    pub const fn new() -> Self {
        Self {
            aspect: AspectRatio::SQUARE,
        }
    }

    pub const fn with_aspect(aspect: AspectRatio) -> Self { Self { aspect } }

    /// Fill a disc of `radius` around `(cx, cy)`.
    pub fn fill_disc<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        cx: i16,
        cy: i16,
        radius: i16,
        color: Rgb565,
    ) {
        if radius <= 0 {
            canvas.draw_pixel(cx, cy, color);
            return;
        }

        let mut x = radius;
        let mut y: i16 = 0;
        let mut d = 1 - i32::from(radius);

        while x >= y {
            let x_span = self.aspect.correct(x);
            let y_span = self.aspect.correct(y);
            let x_width = x_span.saturating_mul(2).saturating_add(1);
            let y_width = y_span.saturating_mul(2).saturating_add(1);
            canvas.draw_hline(cx.saturating_sub(x_span), cy.saturating_add(y), x_width, color);
            canvas.draw_hline(cx.saturating_sub(x_span), cy.saturating_sub(y), x_width, color);
            canvas.draw_hline(cx.saturating_sub(y_span), cy.saturating_add(x), y_width, color);
            canvas.draw_hline(cx.saturating_sub(y_span), cy.saturating_sub(x), y_width, color);

            y += 1;
            if d < 0 {
                d += 2 * i32::from(y) + 1;
            } else {
                x -= 1;
                d += 2 * i32::from(y - x) + 1;
            }
        }
    }

    /// Text size for `label` inside a badge of `diameter`.
    ///
    /// Starts from the nominal size for 60% of the diameter and shrinks until
    /// the measured glyph box fits that height and width, or size 1 is reached.
    pub fn label_size<C: Canvas + ?Sized>(
        canvas: &C,
        label: &str,
        diameter: i16,
    ) -> u8 {
        let max_glyph = (i32::from(diameter) * 3 / 5) as i16;
        let mut size = ((max_glyph + 4) / 8).clamp(1, i16::from(u8::MAX)) as u8;
        let mut metrics = canvas.measure_text(label, size);
        while size > 1 && (metrics.width > max_glyph || metrics.height > max_glyph) {
            size -= 1;
            metrics = canvas.measure_text(label, size);
        }
        size
    }

    /// Draw a badge whose bounding square starts at `(x, y)`.
    ///
    /// `size` is forced to an odd diameter of at least 5; non-positive sizes
    /// draw nothing. An empty label leaves just the disc; a two-glyph label
    /// wider than the disc at size 1 keeps only its first glyph.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_badge<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        x: i16,
        y: i16,
        size: i16,
        route: &str,
        fill: Rgb565,
        label_color: Rgb565,
    ) {
        if size <= 0 {
            return;
        }

        let diameter = odd_diameter(size);
        let radius = (diameter - 1) / 2;
        let cx = x + radius;
        let cy = y + radius;
        self.fill_disc(canvas, cx, cy, radius, fill);

        let mut label = route_label(route);
        if label.is_empty() {
            return;
        }

        let mut text_size = Self::label_size(canvas, &label, diameter);
        let mut metrics = canvas.measure_text(&label, text_size);
        if metrics.width > diameter && label.len() > 1 {
            // Two glyphs wider than the disc: keep the first one
            label.truncate(1);
            text_size = Self::label_size(canvas, &label, diameter);
            metrics = canvas.measure_text(&label, text_size);
        }
        let tx = cx - metrics.width / 2 - metrics.x_offset;
        let ty = cy - metrics.height / 2 - metrics.y_offset;
        canvas.draw_text(tx, ty, &label, label_color, text_size, None);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::vec::Vec;

    use embedded_graphics::pixelcolor::RgbColor;
    use proptest::prelude::*;

    use super::*;
    use crate::display::{TextMetrics, measure_text};

    /// Records every pixel covered by spans and text calls.
    #[derive(Default)]
    struct Recorder {
        pixels: HashSet<(i16, i16)>,
        spans: usize,
        texts: Vec<(i16, i16, std::string::String, u8)>,
    }

    impl Canvas for Recorder {
        fn fill_rect(
            &mut self,
            x: i16,
            y: i16,
            w: i16,
            h: i16,
            _color: Rgb565,
        ) {
            for yy in y..y + h {
                for xx in x..x + w {
                    self.pixels.insert((xx, yy));
                }
            }
        }

        fn draw_text(
            &mut self,
            x: i16,
            y: i16,
            text: &str,
            _color: Rgb565,
            size: u8,
            _background: Option<Rgb565>,
        ) {
            self.texts.push((x, y, text.into(), size));
        }

        fn draw_pixel(
            &mut self,
            x: i16,
            y: i16,
            _color: Rgb565,
        ) {
            self.pixels.insert((x, y));
        }

        fn draw_hline(
            &mut self,
            x: i16,
            y: i16,
            w: i16,
            color: Rgb565,
        ) {
            self.spans += 1;
            self.fill_rect(x, y, w, 1, color);
        }

        fn measure_text(
            &self,
            text: &str,
            size: u8,
        ) -> TextMetrics {
            measure_text(text, size)
        }
    }

    #[test]
    fn test_route_label() {
        assert_eq!(route_label("e-").as_str(), "E");
        assert_eq!(route_label("q_x").as_str(), "QX");
        assert_eq!(route_label(" 7 express").as_str(), "7E");
        assert_eq!(route_label("--").as_str(), "");
        assert_eq!(route_label("").as_str(), "");
        assert_eq!(route_label("SIR").as_str(), "SI");
    }

    #[test]
    fn test_aspect_square_is_identity() {
        for v in 0..50 {
            assert_eq!(AspectRatio::SQUARE.correct(v), v);
        }
        assert_eq!(AspectRatio::SQUARE.correct(-3), 0);
    }

    #[test]
    fn test_aspect_stretch() {
        // y/x = 1.5
        let aspect = AspectRatio {
            x_q8_8: 256,
            y_q8_8: 384,
        };
        assert_eq!(aspect.correct(4), 6);
        assert_eq!(aspect.correct(3), 5);
    }

    #[test]
    fn test_disc_is_symmetric_with_center() {
        let mut canvas = Recorder::default();
        BadgeRasterizer::new().fill_disc(&mut canvas, 10, 10, 4, Rgb565::RED);
        assert!(canvas.pixels.contains(&(10, 10)));
        for &(x, y) in &canvas.pixels {
            assert!(canvas.pixels.contains(&(20 - x, y)));
            assert!(canvas.pixels.contains(&(x, 20 - y)));
            assert!(canvas.pixels.contains(&(y, x)));
        }
        // Extremes touch the radius exactly
        assert!(canvas.pixels.contains(&(14, 10)));
        assert!(canvas.pixels.contains(&(10, 6)));
        assert!(!canvas.pixels.contains(&(15, 10)));
    }

    #[test]
    fn test_zero_radius_is_single_pixel() {
        let mut canvas = Recorder::default();
        BadgeRasterizer::new().fill_disc(&mut canvas, 3, 4, 0, Rgb565::RED);
        assert_eq!(canvas.pixels.len(), 1);
        assert!(canvas.pixels.contains(&(3, 4)));
    }

    #[test]
    fn test_badge_bounds_and_label() {
        let mut canvas = Recorder::default();
        BadgeRasterizer::new().draw_badge(&mut canvas, 2, 3, 10, "e-", Rgb565::BLUE, Rgb565::WHITE);
        // Even size 10 becomes 9: radius 4 around (6, 7)
        let min_x = canvas.pixels.iter().map(|p| p.0).min().unwrap();
        let max_x = canvas.pixels.iter().map(|p| p.0).max().unwrap();
        let min_y = canvas.pixels.iter().map(|p| p.1).min().unwrap();
        let max_y = canvas.pixels.iter().map(|p| p.1).max().unwrap();
        assert_eq!((min_x, max_x, min_y, max_y), (2, 10, 3, 11));

        assert_eq!(canvas.texts.len(), 1);
        let (tx, ty, ref text, size) = canvas.texts[0];
        assert_eq!(text, "E");
        assert_eq!(size, 1);
        let metrics = measure_text("E", 1);
        assert_eq!(tx, 6 - metrics.width / 2);
        assert_eq!(ty, 7 - metrics.height / 2);
    }

    #[test]
    fn test_badge_span_count_linear_in_radius() {
        let mut canvas = Recorder::default();
        BadgeRasterizer::new().draw_badge(&mut canvas, 0, 0, 41, "", Rgb565::BLUE, Rgb565::WHITE);
        // 4 spans per octant step, radius 20
        assert!(canvas.spans <= 4 * 21);
        assert!(canvas.texts.is_empty());
    }

    #[test]
    fn test_nonpositive_size_draws_nothing() {
        let mut canvas = Recorder::default();
        BadgeRasterizer::new().draw_badge(&mut canvas, 0, 0, 0, "A", Rgb565::BLUE, Rgb565::WHITE);
        BadgeRasterizer::new().draw_badge(&mut canvas, 0, 0, -4, "A", Rgb565::BLUE, Rgb565::WHITE);
        assert!(canvas.pixels.is_empty());
        assert!(canvas.texts.is_empty());
    }

    #[test]
    fn test_label_shrinks_to_fit() {
        let canvas = Recorder::default();
        // 21px badge: nominal size (12 + 4) / 8 = 2, "QX" at size 2 is too wide
        assert_eq!(BadgeRasterizer::label_size(&canvas, "QX", 21), 1);
        // 31px badge: nominal 2, "Q" at size 2 is 10x14 <= 18
        assert_eq!(BadgeRasterizer::label_size(&canvas, "Q", 31), 2);
        // Floor at 1
        assert_eq!(BadgeRasterizer::label_size(&canvas, "QX", 5), 1);
    }

    #[test]
    fn test_wide_label_keeps_first_glyph() {
        let mut canvas = Recorder::default();
        // "S8" is 11 px wide at size 1, the disc only 9
        BadgeRasterizer::new().draw_badge(&mut canvas, 2, 3, 9, "S8", Rgb565::BLUE, Rgb565::WHITE);
        assert_eq!(canvas.texts.len(), 1);
        assert_eq!(canvas.texts[0].2, "S");
        assert!(canvas.texts[0].0 >= 2);
    }

    #[test]
    fn test_two_glyphs_kept_when_they_fit() {
        let mut canvas = Recorder::default();
        BadgeRasterizer::new().draw_badge(&mut canvas, 0, 0, 21, "S8", Rgb565::BLUE, Rgb565::WHITE);
        assert_eq!(canvas.texts[0].2, "S8");
    }

    #[test]
    fn test_huge_badge_label_size() {
        let canvas = Recorder::default();
        let size = BadgeRasterizer::label_size(&canvas, "QX", 30001);
        assert!(size > 1);
    }

    proptest! {
        #[test]
        fn prop_badge_stays_in_odd_square(size in 1i16..80, x in -20i16..100, y in -20i16..100) {
            let mut canvas = Recorder::default();
            BadgeRasterizer::new().draw_badge(&mut canvas, x, y, size, "", Rgb565::BLUE, Rgb565::WHITE);
            let diameter = odd_diameter(size);
            prop_assert_eq!(diameter % 2, 1);
            for &(px, py) in &canvas.pixels {
                prop_assert!(px >= x && px < x + diameter);
                prop_assert!(py >= y && py < y + diameter);
            }
            let radius = (diameter - 1) / 2;
            prop_assert!(canvas.pixels.contains(&(x + radius, y + radius)));
        }
    }
}
