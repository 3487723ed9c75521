//! Frame compiler: render model in, draw list out.
//!
//! Every frame starts from an empty [`DrawList`] and a full-canvas background
//! fill. What follows depends on the model:
//!
//! ```text
//!  Status view                      Transit view (per row)
//!  ┌──────────────────────────┐     ┌──────────────────────────┐
//!  │ Commute Live             │     │ (E)  Jamaica Center   1m │
//!  │ NO WIFI                  │     │ (F)  Coney Island     5m │
//!  │ Trying reconnect         │     └──────────────────────────┘
//!  └──────────────────────────┘
//! ```
//!
//! The compiler never touches the display; it only needs the canvas size.

use embedded_graphics::pixelcolor::Rgb565;

use crate::colors::{
    BADGE_FILL, BLACK, CYAN, ETA_MUTED, ETA_NEUTRAL, ETA_NORMAL, ETA_URGENT, ETA_WARNING, GRAY, WHITE,
};
use crate::config::{DisplayGeometry, ETA_CHARS, GLYPH_WIDTH, MAX_ROWS, MIN_BADGE_DIAMETER, OUTER_MARGIN};
use crate::draw_list::DrawList;
use crate::geometry::{VerticalLayout, compute_row_layout, text_width};
use crate::model::{PLACEHOLDER, RenderModel, eta_minutes, is_due};

/// Title of the status view.
pub const STATUS_TITLE: &str = "Commute Live";

/// Headline used when the model has none.
pub const DEFAULT_HEADLINE: &str = "BOOTING";

/// Destination shown when a row has none.
pub const MISSING_DESTINATION: &str = "-";

/// Canvas height from which the status title is drawn at double size.
pub const LARGE_TITLE_MIN_HEIGHT: u16 = 64;

/// Largest text size used in transit rows.
pub const MAX_ROW_TEXT_SIZE: u8 = 2;

// =============================================================================
// Helpers
// =============================================================================

/// Color for an ETA label.
///
/// | Label                 | Color   |
/// |-----------------------|---------|
/// | empty, `--`, no digit | muted   |
/// | `DUE`, `NOW`, ≤ 1     | urgent  |
/// | ≤ 5                   | warning |
/// | ≤ 12                  | normal  |
/// | more                  | neutral |
pub fn eta_color(eta: &str) -> Rgb565 {
    if eta.is_empty() || eta == PLACEHOLDER {
        return ETA_MUTED;
    }
    if is_due(eta) {
        return ETA_URGENT;
    }
    match eta_minutes(eta) {
        None => ETA_MUTED,
        Some(0..=1) => ETA_URGENT,
        Some(2..=5) => ETA_WARNING,
        Some(6..=12) => ETA_NORMAL,
        Some(_) => ETA_NEUTRAL,
    }
}

/// First `chars` characters of `text`.
pub fn prefix_chars(
    text: &str,
    chars: usize,
) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Text size for transit rows, from the height of the first row.
pub fn row_text_size(first_row_height: i16) -> u8 {
    let badge = i32::from(first_row_height.saturating_sub(2 * OUTER_MARGIN).max(MIN_BADGE_DIAMETER));
    let target_height = (badge * 3) / 5;
    ((target_height + 4) / 8).clamp(1, i32::from(MAX_ROW_TEXT_SIZE)) as u8
}

// =============================================================================
// Frame Compiler
// =============================================================================

/// Compiles a [`RenderModel`] into a [`DrawList`] for a canvas.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FrameCompiler {
    width: u16,
    height: u16,
}

impl FrameCompiler {
    pub const fn new(geometry: DisplayGeometry) -> Self {
        Self {
            width: geometry.total_width,
            height: geometry.total_height,
        }
    }

    /// Resize the target canvas.
    pub fn set_viewport(
        &mut self,
        geometry: DisplayGeometry,
    ) {
        self.width = geometry.total_width;
        self.height = geometry.total_height;
    }

    /// Rebuild `out` from scratch for `model`.
    pub fn build(
        &self,
        model: &RenderModel,
        out: &mut DrawList,
    ) {
        out.reset();
        out.fill_rect(0, 0, self.width as i16, self.height as i16, BLACK);

        if model.shows_transit() {
            self.build_transit(model, out);
        } else {
            self.build_status(model, out);
        }

        if out.dropped_commands() > 0 || out.dropped_text() > 0 {
            log_debug!(
                "frame: dropped {} commands, {} texts",
                out.dropped_commands(),
                out.dropped_text()
            );
        }
    }

    fn build_status(
        &self,
        model: &RenderModel,
        out: &mut DrawList,
    ) {
        let height = self.height as i16;
        let title_size = if self.height >= LARGE_TITLE_MIN_HEIGHT { 2 } else { 1 };
        out.text(OUTER_MARGIN, OUTER_MARGIN, STATUS_TITLE, CYAN, Some(BLACK), title_size);

        let headline = if model.status_line.is_empty() { DEFAULT_HEADLINE } else { model.status_line.as_str() };
        out.text(OUTER_MARGIN, height / 2 - 4, headline, WHITE, Some(BLACK), 1);

        out.text(OUTER_MARGIN, height - 10, &model.status_detail, GRAY, Some(BLACK), 1);
    }

    fn build_transit(
        &self,
        model: &RenderModel,
        out: &mut DrawList,
    ) {
        let row_count = model.rows.len().clamp(1, MAX_ROWS);
        let vertical = VerticalLayout::compute(self.height, row_count);

        let first_height = match vertical.rows[0].height {
            h if h > 0 => h,
            _ => self.height as i16,
        };
        let text_size = row_text_size(first_height);
        let cell = GLYPH_WIDTH * i16::from(text_size);

        for (row, frame) in model.rows.iter().zip(vertical.frames()) {
            let layout = compute_row_layout(self.width as i16, *frame, text_size, ETA_CHARS);

            let route = if row.has_route() { prefix_chars(&row.route_id, 2) } else { PLACEHOLDER };
            out.badge(layout.badge_x, layout.badge_y, layout.badge_size, route, BADGE_FILL, WHITE);

            let eta = if row.eta.is_empty() { PLACEHOLDER } else { prefix_chars(&row.eta, usize::from(ETA_CHARS)) };
            // Nominal cell width, so the label keeps its trailing spacing column
            let eta_x = layout.eta_x + layout.eta_width - text_width(eta.chars().count(), text_size);
            out.text(eta_x, layout.text_y, eta, eta_color(&row.eta), Some(BLACK), text_size);

            let fit = if layout.destination_width > 0 { (layout.destination_width / cell) as usize } else { 0 };
            let destination = if row.destination.is_empty() { MISSING_DESTINATION } else { row.destination.as_str() };
            out.text(
                layout.destination_x,
                layout.text_y,
                prefix_chars(destination, fit),
                WHITE,
                Some(BLACK),
                text_size,
            );
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
