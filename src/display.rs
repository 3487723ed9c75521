//! Display engine: the only code that writes to the panel framebuffer.
//!
//! [`DisplayEngine`] owns the panel configuration and a [`MatrixBackend`]. It
//! exposes a logical canvas (the whole panel grid) through two interfaces:
//!
//! - `embedded_graphics::DrawTarget`, so any embedded-graphics primitive can be
//!   drawn directly
//! - [`Canvas`] / [`FrameTarget`], the small integer API the badge rasterizer
//!   and the orchestrator use
//!
//! Every logical pixel is routed through the configured [`Wiring`] and handed
//! to the backend as a (panel, local x, local y) address. Off-canvas pixels are
//! discarded. Nothing is drawn while the engine is not ready.

use core::convert::Infallible;
use core::fmt;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};

use crate::colors::BLACK;
use crate::config::{DisplayGeometry, GeometryError, PanelConfig};
use crate::geometry::{PanelMapper, PhysicalPoint, Wiring};
use crate::styles::{TOP_LEFT, glyph_style};

// =============================================================================
// Drawing Interfaces
// =============================================================================

/// Bounding box of rendered text relative to the drawing origin.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TextMetrics {
    pub x_offset: i16,
    pub y_offset: i16,
    pub width: i16,
    pub height: i16,
}

/// Integer drawing primitives on a logical canvas.
pub trait Canvas {
    fn fill_rect(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        color: Rgb565,
    );

    /// Draw `text` with its top-left glyph cell at `(x, y)`, scaled by `size`.
    /// `background: None` leaves unlit glyph pixels untouched.
    fn draw_text(
        &mut self,
        x: i16,
        y: i16,
        text: &str,
        color: Rgb565,
        size: u8,
        background: Option<Rgb565>,
    );

    fn draw_pixel(
        &mut self,
        x: i16,
        y: i16,
        color: Rgb565,
    );

    /// Horizontal span of `w` pixels starting at `(x, y)`.
    fn draw_hline(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        color: Rgb565,
    );

    fn measure_text(
        &self,
        text: &str,
        size: u8,
    ) -> TextMetrics;
}

/// A [`Canvas`] that renders whole frames.
pub trait FrameTarget: Canvas {
    /// Whether a frame can be drawn now.
    fn begin_frame(&mut self) -> bool;

    /// Hand the finished frame to the refresh path. Does not wait for it.
    fn present(&mut self);

    /// Logical canvas size.
    fn geometry(&self) -> DisplayGeometry;
}

/// Physical panel chain driver.
///
/// Backends receive pixels already resolved to chain addresses and never see
/// logical coordinates.
pub trait MatrixBackend {
    type Error;

    /// Acquire buffers and hardware for `config`. Only called with a config
    /// whose geometry is valid.
    fn init(
        &mut self,
        config: &PanelConfig,
    ) -> Result<(), Self::Error>;

    /// Give back everything `init` acquired. Safe to call when not initialized.
    fn release(&mut self);

    fn set_brightness(
        &mut self,
        brightness: u8,
    );

    fn write_pixel(
        &mut self,
        point: PhysicalPoint,
        color: Rgb565,
    );

    /// Make the drawn frame visible (buffer flip or no-op when single-buffered).
    fn swap_buffers(&mut self);
}

// =============================================================================
// Errors
// =============================================================================

/// Reasons [`DisplayEngine::begin`] refused to start.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum DisplayError {
    /// Configuration rejected before touching the backend.
    InvalidGeometry(GeometryError),
    /// Backend failed to initialize; it has been released again.
    Backend,
}

impl fmt::Display for DisplayError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::InvalidGeometry(err) => write!(f, "invalid geometry: {err}"),
            Self::Backend => f.write_str("matrix backend initialization failed"),
        }
    }
}

impl From<GeometryError> for DisplayError {
    fn from(err: GeometryError) -> Self { Self::InvalidGeometry(err) }
}

// =============================================================================
// Text Helpers
// =============================================================================

/// Measure `text` in the shared glyph font at `size`.
pub fn measure_text(
    text: &str,
    size: u8,
) -> TextMetrics {
    if text.is_empty() {
        return TextMetrics::default();
    }
    let size = i64::from(size.max(1));
    let bounds = glyph_style(BLACK, None).measure_string(text, Point::zero(), Baseline::Top).bounding_box;
    let scale = |v: i64| (v * size).clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16;
    TextMetrics {
        x_offset: scale(i64::from(bounds.top_left.x)),
        y_offset: scale(i64::from(bounds.top_left.y)),
        width: scale(i64::from(bounds.size.width)),
        height: scale(i64::from(bounds.size.height)),
    }
}

/// Draw `text` on any RGB565 target, each glyph pixel enlarged to a
/// `size x size` block.
pub fn draw_scaled_text<D>(
    target: &mut D,
    x: i16,
    y: i16,
    text: &str,
    color: Rgb565,
    size: u8,
    background: Option<Rgb565>,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let style = glyph_style(color, background);
    let origin = Point::new(i32::from(x), i32::from(y));
    if size <= 1 {
        Text::with_text_style(text, origin, style, TOP_LEFT).draw(target).ok();
        return;
    }
    let mut scaled = ScaledTarget {
        inner: target,
        origin,
        scale: u32::from(size),
    };
    Text::with_text_style(text, Point::zero(), style, TOP_LEFT).draw(&mut scaled).ok();
}

/// Enlarges every pixel drawn into it to a square block on `inner`.
struct ScaledTarget<'a, D> {
    inner: &'a mut D,
    origin: Point,
    scale: u32,
}

impl<D: DrawTarget<Color = Rgb565>> Dimensions for ScaledTarget<'_, D> {
    fn bounding_box(&self) -> Rectangle {
        let inner = self.inner.bounding_box();
        let scale = self.scale.max(1);
        Rectangle::new(
            Point::zero(),
            Size::new(inner.size.width / scale + 1, inner.size.height / scale + 1),
        )
    }
}

impl<D: DrawTarget<Color = Rgb565>> DrawTarget for ScaledTarget<'_, D> {
    type Color = Rgb565;
    type Error = D::Error;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale as i32;
        for Pixel(point, color) in pixels {
            let top_left = self.origin + point * scale;
            self.inner
                .fill_solid(&Rectangle::new(top_left, Size::new(self.scale, self.scale)), color)?;
        }
        Ok(())
    }
}

// =============================================================================
// Display Engine
// =============================================================================

/// Logical canvas over a chain of panels.
pub struct DisplayEngine<B> {
    backend: B,
    config: PanelConfig,
    geometry: DisplayGeometry,
    wiring: Wiring,
    ready: bool,
}

impl<B: MatrixBackend> DisplayEngine<B> {
    /// Engine with the default configuration; not ready until [`begin`](Self::begin).
    pub const fn new(backend: B) -> Self {
        let geometry = match PanelConfig::DEFAULT.geometry() {
            Ok(geometry) => geometry,
            Err(_) => DisplayGeometry {
                total_width: 0,
                total_height: 0,
            },
        };
        Self {
            backend,
            config: PanelConfig::DEFAULT,
            geometry,
            wiring: Wiring::Linear,
            ready: false,
        }
    }

    /// Validate `config`, then bring up the backend.
    ///
    /// Any previous session is released first. On error the engine stays not
    /// ready and the backend holds nothing.
    pub fn begin(
        &mut self,
        config: PanelConfig,
    ) -> Result<(), DisplayError> {
        self.end();

        let geometry = match config.geometry() {
            Ok(geometry) => geometry,
            Err(err) => {
                log_warn!("display: invalid geometry ({})", err);
                return Err(err.into());
            }
        };

        self.config = config;
        self.geometry = geometry;
        self.wiring = Wiring::for_config(&config);

        if self.backend.init(&config).is_err() {
            log_warn!("display: backend init failed");
            self.backend.release();
            return Err(DisplayError::Backend);
        }

        self.backend.set_brightness(config.brightness);
        self.ready = true;
        self.fill_rect(0, 0, geometry.total_width as i16, geometry.total_height as i16, BLACK);

        log_info!(
            "display: ready {}x{} ({}x{} panels, {})",
            geometry.total_width,
            geometry.total_height,
            config.cols,
            config.rows,
            self.wiring.label()
        );
        Ok(())
    }

    /// Release the backend. The engine stops drawing until the next `begin`.
    pub fn end(&mut self) {
        if self.ready {
            self.ready = false;
            self.backend.release();
        }
    }

    /// Change output brightness; applied live when ready.
    pub fn set_brightness(
        &mut self,
        brightness: u8,
    ) {
        self.config.brightness = brightness;
        if self.ready {
            self.backend.set_brightness(brightness);
        }
    }

    #[inline]
    pub const fn is_ready(&self) -> bool { self.ready }

    #[inline]
    pub const fn config(&self) -> &PanelConfig { &self.config }

    #[inline]
    pub const fn wiring(&self) -> Wiring { self.wiring }

    #[inline]
    pub const fn backend(&self) -> &B { &self.backend }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B { &mut self.backend }
}

impl<B: MatrixBackend> OriginDimensions for DisplayEngine<B> {
    fn size(&self) -> Size {
        Size::new(
            u32::from(self.geometry.total_width),
            u32::from(self.geometry.total_height),
        )
    }
}

impl<B: MatrixBackend> DrawTarget for DisplayEngine<B> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        if !self.ready {
            return Ok(());
        }
        for Pixel(point, color) in pixels {
            if let Some(physical) = self.wiring.map(&self.config, point.x, point.y) {
                self.backend.write_pixel(physical, color);
            }
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        self.draw_iter(clipped.points().map(|point| Pixel(point, color)))
    }
}

impl<B: MatrixBackend> Canvas for DisplayEngine<B> {
    fn fill_rect(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        color: Rgb565,
    ) {
        if w <= 0 || h <= 0 {
            return;
        }
        Rectangle::new(
            Point::new(i32::from(x), i32::from(y)),
            Size::new(w as u32, h as u32),
        )
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(self)
        .ok();
    }

    fn draw_text(
        &mut self,
        x: i16,
        y: i16,
        text: &str,
        color: Rgb565,
        size: u8,
        background: Option<Rgb565>,
    ) {
        if !self.ready || text.is_empty() {
            return;
        }
        draw_scaled_text(self, x, y, text, color, size, background);
    }

    fn draw_pixel(
        &mut self,
        x: i16,
        y: i16,
        color: Rgb565,
    ) {
        Pixel(Point::new(i32::from(x), i32::from(y)), color).draw(self).ok();
    }

    fn draw_hline(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        color: Rgb565,
    ) {
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

impl<B: MatrixBackend> FrameTarget for DisplayEngine<B> {
    #[inline]
    fn begin_frame(&mut self) -> bool { self.ready }

    fn present(&mut self) {
        if self.ready {
            self.backend.swap_buffers();
        }
    }

    #[inline]
    fn geometry(&self) -> DisplayGeometry { self.geometry }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{RED, WHITE};
    use crate::memory::MemoryBackend;

    type Engine = DisplayEngine<MemoryBackend<{ 128 * 32 }>>;

    fn ready_engine(config: PanelConfig) -> Engine {
        let mut engine = Engine::new(MemoryBackend::new());
        engine.begin(config).unwrap();
        engine
    }

    fn logical(
        engine: &Engine,
        x: i32,
        y: i32,
    ) -> Option<Rgb565> {
        let point = engine.wiring().map(engine.config(), x, y)?;
        engine.backend().pixel(point)
    }

    #[test]
    fn test_begin_rejects_invalid_geometry_without_touching_backend() {
        let mut engine = Engine::new(MemoryBackend::new());
        let config = PanelConfig {
            rows: 0,
            ..PanelConfig::DEFAULT
        };
        assert_eq!(
            engine.begin(config),
            Err(DisplayError::InvalidGeometry(GeometryError::ZeroDimension))
        );
        assert!(!engine.is_ready());
        assert_eq!(engine.backend().init_calls(), 0);
        assert!(!engine.begin_frame());
    }

    #[test]
    fn test_begin_rejects_canvas_past_coordinate_range() {
        let mut engine = Engine::new(MemoryBackend::new());
        let config = PanelConfig {
            rows: 1,
            cols: 2,
            panel_width: 16400,
            panel_height: 1,
            ..PanelConfig::DEFAULT
        };
        assert_eq!(
            engine.begin(config),
            Err(DisplayError::InvalidGeometry(GeometryError::CoordinateOverflow))
        );
        assert_eq!(engine.backend().init_calls(), 0);
    }

    #[test]
    fn test_begin_releases_failed_backend() {
        let mut backend = MemoryBackend::new();
        backend.fail_next_init();
        let mut engine = Engine::new(backend);
        assert_eq!(engine.begin(PanelConfig::DEFAULT), Err(DisplayError::Backend));
        assert!(!engine.is_ready());
        assert!(!engine.backend().is_initialized());
        assert_eq!(engine.backend().release_calls(), 1);
    }

    #[test]
    fn test_begin_ready_and_clear() {
        let engine = ready_engine(PanelConfig::DEFAULT);
        assert!(engine.is_ready());
        assert_eq!(engine.geometry().total_width, 128);
        assert_eq!(engine.backend().brightness(), 80);
        assert_eq!(logical(&engine, 5, 5), Some(BLACK));
    }

    #[test]
    fn test_drawing_ignored_when_not_ready() {
        let mut engine = Engine::new(MemoryBackend::new());
        engine.fill_rect(0, 0, 10, 10, WHITE);
        engine.draw_pixel(1, 1, WHITE);
        engine.draw_text(0, 0, "X", WHITE, 1, None);
        engine.present();
        assert_eq!(engine.backend().pixel_writes(), 0);
        assert_eq!(engine.backend().swap_count(), 0);
    }

    #[test]
    fn test_fill_rect_clipped_to_canvas() {
        let mut engine = ready_engine(PanelConfig::DEFAULT);
        let before = engine.backend().pixel_writes();
        engine.fill_rect(120, 28, 20, 20, RED);
        // 8 x 4 pixels are on the canvas
        assert_eq!(engine.backend().pixel_writes() - before, 32);
        assert_eq!(logical(&engine, 127, 31), Some(RED));
    }

    #[test]
    fn test_hline_and_pixel() {
        let mut engine = ready_engine(PanelConfig::DEFAULT);
        engine.draw_hline(60, 3, 8, WHITE);
        engine.draw_pixel(0, 31, RED);
        engine.draw_hline(0, 0, 0, WHITE);
        for x in 60..68 {
            assert_eq!(logical(&engine, x, 3), Some(WHITE));
        }
        assert_eq!(logical(&engine, 68, 3), Some(BLACK));
        assert_eq!(logical(&engine, 0, 31), Some(RED));
        assert_eq!(logical(&engine, 0, 0), Some(BLACK));
    }

    #[test]
    fn test_serpentine_pixels_land_on_mirrored_panel() {
        let config = PanelConfig {
            rows: 2,
            cols: 2,
            panel_width: 32,
            panel_height: 16,
            serpentine: true,
            ..PanelConfig::DEFAULT
        };
        let mut engine = ready_engine(config);
        engine.draw_pixel(1, 17, WHITE);
        let point = PhysicalPoint {
            panel_index: 3,
            local_x: 1,
            local_y: 1,
        };
        assert_eq!(engine.backend().pixel(point), Some(WHITE));
    }

    #[test]
    fn test_measure_text_scales() {
        let one = measure_text("12m", 1);
        let two = measure_text("12m", 2);
        assert_eq!(one.x_offset, 0);
        assert_eq!(one.y_offset, 0);
        assert!(one.width > 0 && one.height > 0);
        assert_eq!(two.width, one.width * 2);
        assert_eq!(two.height, one.height * 2);
        assert_eq!(measure_text("", 2), TextMetrics::default());

        // 64 cells at size 255 saturate instead of wrapping
        let long = measure_text("WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW", 255);
        assert_eq!(long.width, i16::MAX);
    }

    #[test]
    fn test_scaled_text_fills_blocks() {
        let mut engine = ready_engine(PanelConfig::DEFAULT);
        engine.draw_text(0, 0, "I", WHITE, 2, None);
        let mut lit = 0;
        for y in 0..16 {
            for x in 0..12 {
                if logical(&engine, x, y) == Some(WHITE) {
                    lit += 1;
                }
            }
        }
        // Every lit glyph pixel becomes a 2x2 block
        assert!(lit > 0);
        assert_eq!(lit % 4, 0);
    }

    #[test]
    fn test_opaque_text_paints_background() {
        let mut engine = ready_engine(PanelConfig::DEFAULT);
        engine.fill_rect(0, 0, 20, 10, RED);
        engine.draw_text(0, 0, "A", WHITE, 1, Some(BLACK));
        // Top-left cell of "A" is unlit and now black instead of red
        assert_eq!(logical(&engine, 0, 0), Some(BLACK));

        engine.fill_rect(0, 0, 20, 10, RED);
        engine.draw_text(0, 0, "A", WHITE, 1, None);
        assert_eq!(logical(&engine, 0, 0), Some(RED));
    }

    #[test]
    fn test_set_brightness_live() {
        let mut engine = ready_engine(PanelConfig::DEFAULT);
        engine.set_brightness(200);
        assert_eq!(engine.backend().brightness(), 200);
        assert_eq!(engine.config().brightness, 200);
    }

    #[test]
    fn test_present_swaps() {
        let mut engine = ready_engine(PanelConfig::DEFAULT);
        assert!(engine.begin_frame());
        engine.present();
        engine.present();
        assert_eq!(engine.backend().swap_count(), 2);
    }

    #[test]
    fn test_rebegin_releases_previous_session() {
        let mut engine = ready_engine(PanelConfig::DEFAULT);
        engine.begin(PanelConfig::DEFAULT).unwrap();
        assert_eq!(engine.backend().release_calls(), 1);
        assert_eq!(engine.backend().init_calls(), 2);
    }
}
