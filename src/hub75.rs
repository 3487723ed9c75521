//! HUB75 panel-chain driver for embassy-rp.
//!
//! Pixels live in two static RGB565 framebuffers in chain order (panel 0
//! first, each panel row-major). The backend writes into one of them; the
//! refresh task shifts the other out to the panels.
//!
//! # Scan-out
//!
//! Each panel is driven as two halves scanned in parallel (`R1/G1/B1` for the
//! top half, `R2/G2/B2` for the bottom half), one scan row per address. Color
//! depth comes from binary-coded modulation: the top [`BCM_PLANES`] bits of
//! each channel are shown one plane at a time with on-times doubling per
//! plane. Brightness scales every on-time.
//!
//! Data shifted in first ends up in the last panel of the chain, so panels are
//! clocked out last to first.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicUsize, Ordering};

use defmt::info;
use embassy_rp::gpio::{Level, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use transit_matrix::config::PanelConfig;
use transit_matrix::display::MatrixBackend;
use transit_matrix::geometry::PhysicalPoint;

/// Largest chain the static framebuffers hold (four 64x32 panels).
pub const MAX_CHAIN_PIXELS: usize = 8192;

/// Scan rows reachable with address lines A-E.
const MAX_SCAN_ROWS: u16 = 32;

/// Bit planes shown per frame.
pub const BCM_PLANES: u32 = 4;

/// On-time of the least significant plane at full brightness.
const BASE_ON_TIME_US: u64 = 8;

/// Static framebuffer A (16 KiB).
pub static mut FRAMEBUFFER_A: [u16; MAX_CHAIN_PIXELS] = [0u16; MAX_CHAIN_PIXELS];
/// Static framebuffer B (16 KiB).
pub static mut FRAMEBUFFER_B: [u16; MAX_CHAIN_PIXELS] = [0u16; MAX_CHAIN_PIXELS];

// =============================================================================
// Refresh Synchronization
// =============================================================================

/// New front buffer index, raised on every swap and on (re)start.
static REFRESH_SIGNAL: Signal<CriticalSectionRawMutex, usize> = Signal::new();

/// Refresh task is allowed to drive the panels.
static ENABLED: AtomicBool = AtomicBool::new(false);

/// Panels in the chain.
static CHAIN_PANELS: AtomicUsize = AtomicUsize::new(0);
/// Width of one panel in pixels.
static PANEL_WIDTH: AtomicUsize = AtomicUsize::new(0);
/// Height of one panel in pixels.
static PANEL_HEIGHT: AtomicUsize = AtomicUsize::new(0);

/// Output brightness (0-255).
static BRIGHTNESS: AtomicU8 = AtomicU8::new(0);

/// Completed full refreshes of the chain (for profiling).
pub static REFRESH_COUNT: AtomicU32 = AtomicU32::new(0);

/// Duration of the last full refresh in microseconds (for profiling).
pub static LAST_REFRESH_TIME_US: AtomicU32 = AtomicU32::new(0);

// =============================================================================
// Errors
// =============================================================================

/// Configurations the HUB75 driver cannot scan.
#[derive(Clone, Copy, PartialEq, Eq, Debug, defmt::Format)]
pub enum Hub75Error {
    /// Chain needs more pixels than the static framebuffers hold.
    TooLarge { required: usize },
    /// Panel height is odd or needs more scan rows than address lines allow.
    UnsupportedScan { panel_height: u16 },
}

// =============================================================================
// Backend
// =============================================================================

/// [`MatrixBackend`] over the static framebuffers.
pub struct Hub75Backend {
    /// Buffer currently written by the renderer (0 or 1).
    render_idx: usize,
    panel_width: u16,
    panel_height: u16,
    pixels: usize,
    double_buffered: bool,
}

impl Hub75Backend {
    /// Create the backend.
    ///
    /// # Safety
    /// Must only be called once. The static framebuffers are owned by this instance.
    pub const unsafe fn new() -> Self {
        Self {
            render_idx: 0,
            panel_width: 0,
            panel_height: 0,
            pixels: 0,
            double_buffered: false,
        }
    }

    /// Buffer the renderer writes to.
    #[inline]
    fn render_buffer(&mut self) -> &'static mut [u16; MAX_CHAIN_PIXELS] {
        // SAFETY: In double-buffered mode the refresh task only reads the other
        // buffer. Single-buffered writes race with scan-out, which only tears.
        unsafe {
            if self.render_idx == 0 {
                &mut *core::ptr::addr_of_mut!(FRAMEBUFFER_A)
            } else {
                &mut *core::ptr::addr_of_mut!(FRAMEBUFFER_B)
            }
        }
    }
}

impl MatrixBackend for Hub75Backend {
    type Error = Hub75Error;

    fn init(
        &mut self,
        config: &PanelConfig,
    ) -> Result<(), Self::Error> {
        let pixels = usize::from(config.panel_count())
            * usize::from(config.panel_width)
            * usize::from(config.panel_height);
        if pixels > MAX_CHAIN_PIXELS {
            return Err(Hub75Error::TooLarge { required: pixels });
        }
        if config.panel_height % 2 != 0 || config.panel_height / 2 > MAX_SCAN_ROWS {
            return Err(Hub75Error::UnsupportedScan {
                panel_height: config.panel_height,
            });
        }

        ENABLED.store(false, Ordering::Release);
        // SAFETY: Scan-out is disabled, nothing else reads the buffers
        unsafe {
            (*core::ptr::addr_of_mut!(FRAMEBUFFER_A)).fill(0);
            (*core::ptr::addr_of_mut!(FRAMEBUFFER_B)).fill(0);
        }

        self.panel_width = config.panel_width;
        self.panel_height = config.panel_height;
        self.pixels = pixels;
        self.double_buffered = config.double_buffered;
        self.render_idx = usize::from(config.double_buffered);

        CHAIN_PANELS.store(usize::from(config.panel_count()), Ordering::Relaxed);
        PANEL_WIDTH.store(usize::from(config.panel_width), Ordering::Relaxed);
        PANEL_HEIGHT.store(usize::from(config.panel_height), Ordering::Relaxed);
        ENABLED.store(true, Ordering::Release);
        REFRESH_SIGNAL.signal(0);

        info!(
            "HUB75: {} panel(s) of {}x{}, {} scan rows",
            config.panel_count(),
            config.panel_width,
            config.panel_height,
            config.panel_height / 2
        );
        Ok(())
    }

    fn release(&mut self) {
        ENABLED.store(false, Ordering::Release);
        self.pixels = 0;
    }

    fn set_brightness(
        &mut self,
        brightness: u8,
    ) {
        BRIGHTNESS.store(brightness, Ordering::Relaxed);
    }

    fn write_pixel(
        &mut self,
        point: PhysicalPoint,
        color: Rgb565,
    ) {
        if point.local_x >= self.panel_width || point.local_y >= self.panel_height {
            return;
        }
        let panel_pixels = usize::from(self.panel_width) * usize::from(self.panel_height);
        let index = usize::from(point.panel_index) * panel_pixels
            + usize::from(point.local_y) * usize::from(self.panel_width)
            + usize::from(point.local_x);
        if index < self.pixels {
            self.render_buffer()[index] = RawU16::from(color).into_inner();
        }
    }

    fn swap_buffers(&mut self) {
        if !self.double_buffered {
            return;
        }
        let completed_idx = self.render_idx;
        self.render_idx = 1 - self.render_idx;
        REFRESH_SIGNAL.signal(completed_idx);
    }
}

// =============================================================================
// Scan-out
// =============================================================================

/// GPIO lines of one HUB75 connector.
pub struct Hub75Pins {
    /// R1, G1, B1, R2, G2, B2.
    pub rgb: [Output<'static>; 6],
    /// A, B, C, D, E.
    pub addr: [Output<'static>; 5],
    pub clk: Output<'static>,
    pub lat: Output<'static>,
    /// Output enable, active-low.
    pub oe: Output<'static>,
}

/// Bit `plane` of each channel, top half then bottom half.
#[inline]
fn plane_bits(
    raw: u16,
    plane: u32,
) -> [bool; 3] {
    let r = (raw >> 11) & 0x1F;
    let g = (raw >> 5) & 0x3F;
    let b = raw & 0x1F;
    let shift = 5 - BCM_PLANES + plane;
    [
        (r >> shift) & 1 != 0,
        (g >> (shift + 1)) & 1 != 0,
        (b >> shift) & 1 != 0,
    ]
}

#[inline]
const fn level(bit: bool) -> Level {
    if bit { Level::High } else { Level::Low }
}

/// Refresh task - shifts the front buffer out to the panels forever.
///
/// Sleeps until the backend is initialized. Each swap signals the buffer that
/// becomes visible; it is picked up at the next full refresh.
#[embassy_executor::task]
pub async fn refresh_task(mut pins: Hub75Pins) {
    info!("HUB75 refresh task started");

    pins.oe.set_high();
    let mut front_idx = REFRESH_SIGNAL.wait().await;

    loop {
        if !ENABLED.load(Ordering::Acquire) {
            pins.oe.set_high();
            front_idx = REFRESH_SIGNAL.wait().await;
            continue;
        }
        if let Some(idx) = REFRESH_SIGNAL.try_take() {
            front_idx = idx;
        }

        let refresh_start = Instant::now();

        // SAFETY: The renderer writes to the other buffer after a swap
        let buffer = unsafe {
            if front_idx == 0 {
                &*core::ptr::addr_of!(FRAMEBUFFER_A)
            } else {
                &*core::ptr::addr_of!(FRAMEBUFFER_B)
            }
        };

        let panels = CHAIN_PANELS.load(Ordering::Relaxed);
        let width = PANEL_WIDTH.load(Ordering::Relaxed);
        let height = PANEL_HEIGHT.load(Ordering::Relaxed);
        let scan_rows = height / 2;
        let brightness = u64::from(BRIGHTNESS.load(Ordering::Relaxed));

        for plane in 0..BCM_PLANES {
            let on_time_us = (BASE_ON_TIME_US << plane) * brightness / 255;

            for row in 0..scan_rows {
                for panel in (0..panels).rev() {
                    let base = panel * width * height;
                    let top = base + row * width;
                    let bottom = base + (row + scan_rows) * width;
                    for x in 0..width {
                        let [r1, g1, b1] = plane_bits(buffer[top + x], plane);
                        let [r2, g2, b2] = plane_bits(buffer[bottom + x], plane);
                        for (pin, bit) in pins.rgb.iter_mut().zip([r1, g1, b1, r2, g2, b2]) {
                            pin.set_level(level(bit));
                        }
                        pins.clk.set_high();
                        pins.clk.set_low();
                    }
                }

                pins.oe.set_high();
                for (bit, pin) in pins.addr.iter_mut().enumerate() {
                    pin.set_level(level((row >> bit) & 1 != 0));
                }
                pins.lat.set_high();
                pins.lat.set_low();

                if on_time_us > 0 {
                    pins.oe.set_low();
                    Timer::after_micros(on_time_us).await;
                    pins.oe.set_high();
                }
            }
        }

        REFRESH_COUNT.fetch_add(1, Ordering::Relaxed);
        LAST_REFRESH_TIME_US.store(refresh_start.elapsed().as_micros() as u32, Ordering::Relaxed);

        // Let other tasks run when the panels are dark
        if brightness == 0 {
            Timer::after_millis(10).await;
        }
    }
}
