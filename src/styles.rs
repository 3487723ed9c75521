//! Text styles shared by the display engine and the host simulator.
//!
//! All text on the matrix uses one glyph cell: a 5x7 font advanced by 6 pixels,
//! scaled by an integer text size. Keeping the font in one place makes the
//! layout math (`GLYPH_WIDTH * size`) and the rendered result agree.

use embedded_graphics::mono_font::ascii::FONT_5X7;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::text::{Baseline, TextStyle, TextStyleBuilder};

use crate::config::GLYPH_WIDTH;

// =============================================================================
// Font
// =============================================================================

/// 5x7 glyphs on a 6px advance, matching [`GLYPH_WIDTH`].
pub const GLYPH_FONT: &MonoFont<'static> = &MonoFont {
    character_spacing: 1,
    ..FONT_5X7
};

const _: () = assert!(FONT_5X7.character_size.width + 1 == GLYPH_WIDTH as u32);

// =============================================================================
// Text Styles
// =============================================================================

/// Text positions are the top-left corner of the first glyph cell.
pub const TOP_LEFT: TextStyle = TextStyleBuilder::new().baseline(Baseline::Top).build();

/// Character style for a foreground color, optionally on an opaque background.
#[inline]
pub fn glyph_style(
    color: Rgb565,
    background: Option<Rgb565>,
) -> MonoTextStyle<'static, Rgb565> {
    let builder = MonoTextStyleBuilder::new().font(GLYPH_FONT).text_color(color);
    match background {
        Some(bg) => builder.background_color(bg).build(),
        None => builder.build(),
    }
}
