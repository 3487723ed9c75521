//! Logical pixel to physical panel mapping.
//!
//! Panels are addressed by their position in the cable chain. Two wirings are
//! supported:
//!
//! ```text
//!   Linear (2x3)             Serpentine (2x3)
//!   ┌───┬───┬───┐            ┌───┬───┬───┐
//!   │ 0 │ 1 │ 2 │            │ 0 │ 1 │ 2 │
//!   ├───┼───┼───┤            ├───┼───┼───┤
//!   │ 3 │ 4 │ 5 │            │ 5 │ 4 │ 3 │
//!   └───┴───┴───┘            └───┴───┴───┘
//! ```
//!
//! In serpentine chains only the panel index is mirrored on odd rows; the local
//! coordinates inside the panel stay those of the logical cell.

use crate::config::PanelConfig;

/// A pixel resolved to a panel in the chain.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct PhysicalPoint {
    /// Position of the panel in the chain.
    pub panel_index: u16,
    /// Column inside the panel.
    pub local_x: u16,
    /// Row inside the panel.
    pub local_y: u16,
}

/// Strategy for resolving logical pixels to chain positions.
pub trait PanelMapper {
    /// Resolve `(x, y)`; `None` when the pixel is off the canvas.
    fn map(
        &self,
        config: &PanelConfig,
        x: i32,
        y: i32,
    ) -> Option<PhysicalPoint>;
}

/// Grid cell of an on-canvas pixel: `(panel_row, panel_col, local_x, local_y)`.
#[inline]
fn panel_cell(
    config: &PanelConfig,
    x: i32,
    y: i32,
) -> Option<(u16, u16, u16, u16)> {
    let geometry = config.geometry().ok()?;
    if !geometry.contains(x, y) {
        return None;
    }
    let (x, y) = (x as u16, y as u16);
    let panel_col = x / config.panel_width;
    let panel_row = y / config.panel_height;
    Some((
        panel_row,
        panel_col,
        x - panel_col * config.panel_width,
        y - panel_row * config.panel_height,
    ))
}

/// Left-to-right, top-to-bottom chain.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LinearMapper;

impl PanelMapper for LinearMapper {
    fn map(
        &self,
        config: &PanelConfig,
        x: i32,
        y: i32,
    ) -> Option<PhysicalPoint> {
        let (panel_row, panel_col, local_x, local_y) = panel_cell(config, x, y)?;
        Some(PhysicalPoint {
            panel_index: panel_row * u16::from(config.cols) + panel_col,
            local_x,
            local_y,
        })
    }
}

/// Boustrophedon chain: odd panel rows run right-to-left.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SerpentineMapper;

impl PanelMapper for SerpentineMapper {
    fn map(
        &self,
        config: &PanelConfig,
        x: i32,
        y: i32,
    ) -> Option<PhysicalPoint> {
        let (panel_row, panel_col, local_x, local_y) = panel_cell(config, x, y)?;
        let physical_col = if panel_row % 2 == 1 {
            u16::from(config.cols) - 1 - panel_col
        } else {
            panel_col
        };
        Some(PhysicalPoint {
            panel_index: panel_row * u16::from(config.cols) + physical_col,
            local_x,
            local_y,
        })
    }
}

/// Wiring selected by [`PanelConfig::serpentine`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Wiring {
    #[default]
    Linear,
    Serpentine,
}

impl Wiring {
    /// Wiring for a configuration.
    #[inline]
    pub const fn for_config(config: &PanelConfig) -> Self {
        if config.serpentine { Self::Serpentine } else { Self::Linear }
    }

    /// Short name for logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Serpentine => "serpentine",
        }
    }
}

impl PanelMapper for Wiring {
    #[inline]
    fn map(
        &self,
        config: &PanelConfig,
        x: i32,
        y: i32,
    ) -> Option<PhysicalPoint> {
        match self {
            Self::Linear => LinearMapper.map(config, x, y),
            Self::Serpentine => SerpentineMapper.map(config, x, y),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
