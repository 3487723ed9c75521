//! In-memory matrix backend.
//!
//! Stores the panel chain as plain RGB565 arrays in chain order: panel 0 first,
//! each panel row-major. Used by the host simulator and by tests that need to
//! look at what actually reached the "hardware".
//!
//! `N` is the pixel capacity of one buffer. A configuration with more pixels
//! fails to initialize, like a real controller that cannot allocate its DMA
//! buffers.

use core::fmt;

use embedded_graphics::pixelcolor::Rgb565;
use heapless::Vec;

use crate::colors::BLACK;
use crate::config::PanelConfig;
use crate::display::MatrixBackend;
use crate::geometry::PhysicalPoint;

/// Errors from [`MemoryBackend::init`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MemoryBackendError {
    /// Panel chain needs more pixels than the backend holds.
    TooLarge { required: usize, capacity: usize },
    /// Failure injected with [`MemoryBackend::fail_next_init`].
    Injected,
}

impl fmt::Display for MemoryBackendError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::TooLarge { required, capacity } => {
                write!(f, "chain needs {required} pixels, buffer holds {capacity}")
            }
            Self::Injected => f.write_str("injected init failure"),
        }
    }
}

/// Framebuffer-only backend with call counters.
pub struct MemoryBackend<const N: usize> {
    front: Vec<Rgb565, N>,
    back: Vec<Rgb565, N>,
    panel_width: u16,
    panel_height: u16,
    double_buffered: bool,
    initialized: bool,
    brightness: u8,
    fail_next_init: bool,
    init_calls: u32,
    release_calls: u32,
    swap_count: u32,
    pixel_writes: u32,
}

impl<const N: usize> MemoryBackend<N> {
    pub const fn new() -> Self {
        Self {
            front: Vec::new(),
            back: Vec::new(),
            panel_width: 0,
            panel_height: 0,
            double_buffered: false,
            initialized: false,
            brightness: 0,
            fail_next_init: false,
            init_calls: 0,
            release_calls: 0,
            swap_count: 0,
            pixel_writes: 0,
        }
    }

    /// Make the next `init` fail.
    pub fn fail_next_init(&mut self) { self.fail_next_init = true; }

    /// Buffer index of a chain address, if it lies inside the current chain.
    fn index(
        &self,
        point: PhysicalPoint,
    ) -> Option<usize> {
        if point.local_x >= self.panel_width || point.local_y >= self.panel_height {
            return None;
        }
        let panel_pixels = usize::from(self.panel_width) * usize::from(self.panel_height);
        let index = usize::from(point.panel_index) * panel_pixels
            + usize::from(point.local_y) * usize::from(self.panel_width)
            + usize::from(point.local_x);
        (index < self.front.len()).then_some(index)
    }

    /// Visible color at a chain address.
    pub fn pixel(
        &self,
        point: PhysicalPoint,
    ) -> Option<Rgb565> {
        self.index(point).map(|index| self.front[index])
    }

    /// Visible buffer in chain order.
    #[inline]
    pub fn front(&self) -> &[Rgb565] { &self.front }

    #[inline]
    pub const fn is_initialized(&self) -> bool { self.initialized }

    #[inline]
    pub const fn brightness(&self) -> u8 { self.brightness }

    #[inline]
    pub const fn init_calls(&self) -> u32 { self.init_calls }

    #[inline]
    pub const fn release_calls(&self) -> u32 { self.release_calls }

    #[inline]
    pub const fn swap_count(&self) -> u32 { self.swap_count }

    #[inline]
    pub const fn pixel_writes(&self) -> u32 { self.pixel_writes }
}

impl<const N: usize> Default for MemoryBackend<N> {
    fn default() -> Self { Self::new() }
}

impl<const N: usize> MatrixBackend for MemoryBackend<N> {
    type Error = MemoryBackendError;

    fn init(
        &mut self,
        config: &PanelConfig,
    ) -> Result<(), Self::Error> {
        self.init_calls += 1;
        if core::mem::take(&mut self.fail_next_init) {
            return Err(MemoryBackendError::Injected);
        }

        let required = usize::from(config.panel_count())
            * usize::from(config.panel_width)
            * usize::from(config.panel_height);
        if required > N {
            return Err(MemoryBackendError::TooLarge { required, capacity: N });
        }

        self.front.clear();
        self.back.clear();
        // Capacity checked above
        self.front.resize(required, BLACK).ok();
        if config.double_buffered {
            self.back.resize(required, BLACK).ok();
        }

        self.panel_width = config.panel_width;
        self.panel_height = config.panel_height;
        self.double_buffered = config.double_buffered;
        self.initialized = true;
        Ok(())
    }

    fn release(&mut self) {
        self.release_calls += 1;
        self.front.clear();
        self.back.clear();
        self.initialized = false;
    }

    fn set_brightness(
        &mut self,
        brightness: u8,
    ) {
        self.brightness = brightness;
    }

    fn write_pixel(
        &mut self,
        point: PhysicalPoint,
        color: Rgb565,
    ) {
        let Some(index) = self.index(point) else {
            return;
        };
        self.pixel_writes += 1;
        if self.double_buffered {
            self.back[index] = color;
        } else {
            self.front[index] = color;
        }
    }

    fn swap_buffers(&mut self) {
        self.swap_count += 1;
        if self.double_buffered {
            core::mem::swap(&mut self.front, &mut self.back);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
