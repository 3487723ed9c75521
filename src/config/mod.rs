//! Application configuration.
//!
//! - `layout`: Fixed layout, capacity and timing constants
//! - `panel`: Runtime panel-chain configuration and derived display geometry

pub mod layout;
pub mod panel;

// Re-export layout constants at config level for convenience
pub use layout::{
    ETA_CHARS,
    GLYPH_HEIGHT,
    GLYPH_WIDTH,
    INNER_GAP,
    MAX_DRAW_COMMANDS,
    MAX_ROWS,
    MIN_BADGE_DIAMETER,
    MIN_RENDER_GAP_MS,
    OUTER_MARGIN,
    ROW_PADDING_PER_MILLE,
    TEXT_ARENA_BYTES,
};
pub use panel::{DisplayGeometry, GeometryError, MAX_CANVAS_EXTENT, PanelConfig};
