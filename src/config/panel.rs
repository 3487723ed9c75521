//! Panel-chain configuration and derived display geometry.
//!
//! A matrix is a grid of identical HUB75 panels, `rows x cols`, each
//! `panel_width x panel_height` pixels. The logical canvas is the whole grid.
//! The canvas size must fit in 16 bits; configurations that don't are rejected
//! before any hardware is touched.

use core::fmt;

// =============================================================================
// Supported Ranges
// =============================================================================

/// Panel rows accepted by [`PanelConfig::sanitized`].
pub const PANEL_ROWS_RANGE: (u8, u8) = (1, 4);

/// Panel columns accepted by [`PanelConfig::sanitized`].
pub const PANEL_COLS_RANGE: (u8, u8) = (1, 8);

/// Single panel width in pixels accepted by [`PanelConfig::sanitized`].
pub const PANEL_WIDTH_RANGE: (u16, u16) = (32, 128);

/// Single panel height in pixels accepted by [`PanelConfig::sanitized`].
pub const PANEL_HEIGHT_RANGE: (u16, u16) = (16, 64);

/// Largest canvas width or height: draw coordinates are `i16`.
pub const MAX_CANVAS_EXTENT: u32 = i16::MAX as u32;

// =============================================================================
// Errors
// =============================================================================

/// Reasons a panel configuration has no valid geometry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum GeometryError {
    /// Rows, columns, panel width or panel height is zero.
    ZeroDimension,
    /// `cols * panel_width` does not fit in a `u16`.
    WidthOverflow,
    /// `rows * panel_height` does not fit in a `u16`.
    HeightOverflow,
    /// Total width or height is past [`MAX_CANVAS_EXTENT`].
    CoordinateOverflow,
}

impl fmt::Display for GeometryError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::ZeroDimension => f.write_str("panel dimension is zero"),
            Self::WidthOverflow => f.write_str("total width exceeds 65535"),
            Self::HeightOverflow => f.write_str("total height exceeds 65535"),
            Self::CoordinateOverflow => f.write_str("canvas exceeds 32767 pixels in a direction"),
        }
    }
}

// =============================================================================
// Display Geometry
// =============================================================================

/// Logical canvas size derived from a [`PanelConfig`].
///
/// Never stored on its own: the display engine recomputes it whenever its
/// configuration changes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct DisplayGeometry {
    pub total_width: u16,
    pub total_height: u16,
}

impl DisplayGeometry {
    /// Whether a logical pixel lies on the canvas.
    #[inline]
    pub const fn contains(
        &self,
        x: i32,
        y: i32,
    ) -> bool {
        x >= 0 && y >= 0 && x < self.total_width as i32 && y < self.total_height as i32
    }
}

// =============================================================================
// Panel Configuration
// =============================================================================

/// Physical panel chain as supplied at startup.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct PanelConfig {
    /// Panel rows in the grid.
    pub rows: u8,
    /// Panel columns in the grid.
    pub cols: u8,
    /// Width of one panel in pixels.
    pub panel_width: u16,
    /// Height of one panel in pixels.
    pub panel_height: u16,
    /// Output brightness (1-255).
    pub brightness: u8,
    /// Odd panel rows are cabled right-to-left.
    pub serpentine: bool,
    /// Render into a back buffer and swap on present.
    pub double_buffered: bool,
}

impl PanelConfig {
    /// Two 64x32 panels side by side, linear chain.
    pub const DEFAULT: Self = Self {
        rows: 1,
        cols: 2,
        panel_width: 64,
        panel_height: 32,
        brightness: 80,
        serpentine: false,
        double_buffered: false,
    };

    /// Validate the grid and compute the logical canvas size.
    ///
    /// Both totals must fit a `u16` and stay within [`MAX_CANVAS_EXTENT`].
    pub const fn geometry(&self) -> Result<DisplayGeometry, GeometryError> {
        if self.rows == 0 || self.cols == 0 || self.panel_width == 0 || self.panel_height == 0 {
            return Err(GeometryError::ZeroDimension);
        }

        let total_width = self.cols as u32 * self.panel_width as u32;
        let total_height = self.rows as u32 * self.panel_height as u32;

        if total_width > u16::MAX as u32 {
            return Err(GeometryError::WidthOverflow);
        }
        if total_height > u16::MAX as u32 {
            return Err(GeometryError::HeightOverflow);
        }
        if total_width > MAX_CANVAS_EXTENT || total_height > MAX_CANVAS_EXTENT {
            return Err(GeometryError::CoordinateOverflow);
        }

        Ok(DisplayGeometry {
            total_width: total_width as u16,
            total_height: total_height as u16,
        })
    }

    /// Number of panels in the chain.
    #[inline]
    pub const fn panel_count(&self) -> u16 { self.rows as u16 * self.cols as u16 }

    /// Clamp every field into the supported hardware range.
    ///
    /// Persisted configuration passes through here before it reaches the
    /// display engine.
    pub fn sanitized(mut self) -> Self {
        self.rows = self.rows.clamp(PANEL_ROWS_RANGE.0, PANEL_ROWS_RANGE.1);
        self.cols = self.cols.clamp(PANEL_COLS_RANGE.0, PANEL_COLS_RANGE.1);
        self.panel_width = self.panel_width.clamp(PANEL_WIDTH_RANGE.0, PANEL_WIDTH_RANGE.1);
        self.panel_height = self.panel_height.clamp(PANEL_HEIGHT_RANGE.0, PANEL_HEIGHT_RANGE.1);
        self.brightness = self.brightness.max(1);
        self
    }
}

impl Default for PanelConfig {
    fn default() -> Self { Self::DEFAULT }
}

// =============================================================================
// Unit Tests
// =============================================================================
