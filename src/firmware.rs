//! RP2350 board bring-up and the render loop.
//!
//! # Tasks
//!
//! - Main task: samples connectivity, applies transit updates, ticks the
//!   orchestrator which renders into the HUB75 back buffer
//! - Refresh task: scans the front buffer out to the panel chain
//! - Demo task: publishes scripted connectivity and arrival boards

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::{DynSender, Watch};
use embassy_time::{Instant, Timer};
use transit_matrix::config::PanelConfig;
use transit_matrix::display::DisplayEngine;
use transit_matrix::model::TransitUpdate;
use transit_matrix::orchestrator::{Connectivity, Orchestrator, TickOutcome};

use crate::demo;
use crate::hub75::{self, Hub75Backend, Hub75Pins};

// =============================================================================
// Board Configuration
// =============================================================================

/// Panel chain wired to the HUB75 connector.
const BOARD_PANELS: PanelConfig = PanelConfig {
    rows: 1,
    cols: 2,
    panel_width: 64,
    panel_height: 32,
    brightness: 80,
    serpentine: false,
    double_buffered: true,
};

/// Main loop period.
const TICK_MS: u64 = 10;

/// Frames between statistics log lines.
const STATS_EVERY_FRAMES: u32 = 50;

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"transit-matrix"),
    embassy_rp::binary_info::rp_program_description!(c"Transit arrivals on chained HUB75 LED panels"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

// =============================================================================
// Demo Feed (generated by separate async task)
// =============================================================================

/// Latest connectivity signals. The demo task writes, the main task reads.
static CONNECTIVITY: Watch<CriticalSectionRawMutex, Connectivity, 2> = Watch::new();

/// Latest arrival board. Each new value is applied once.
static TRANSIT: Watch<CriticalSectionRawMutex, TransitUpdate, 2> = Watch::new();

/// Demo feed task - stands in for the Wi-Fi and MQTT stack.
#[embassy_executor::task]
async fn demo_feed_task(
    connectivity: DynSender<'static, Connectivity>,
    transit: DynSender<'static, TransitUpdate>,
    start_time: Instant,
) {
    info!("Demo feed task started");

    let mut next_update_ms = demo::first_update_ms();
    let mut step = 0;
    let mut last_signals = None;

    loop {
        let elapsed_ms = start_time.elapsed().as_millis() as u32;

        // Publish transitions only
        let signals = demo::connectivity_at(elapsed_ms);
        if last_signals != Some(signals) {
            connectivity.send(signals);
            last_signals = Some(signals);
        }

        if elapsed_ms >= next_update_ms {
            transit.send(demo::transit_update(step));
            step += 1;
            next_update_ms += demo::UPDATE_INTERVAL_MS;
        }

        Timer::after_millis(100).await;
    }
}

// =============================================================================
// Entry
// =============================================================================

pub async fn run(spawner: Spawner) -> ! {
    info!("Transit matrix starting...");

    let p = embassy_rp::init(Default::default());

    // Heartbeat LED (Pico 2 on-board LED)
    let mut led = Output::new(p.PIN_25, Level::Low);

    // HUB75 connector: data on GPIO 0-5, address on 6-10, control on 11-13
    let pins = Hub75Pins {
        rgb: [
            Output::new(p.PIN_0, Level::Low),
            Output::new(p.PIN_1, Level::Low),
            Output::new(p.PIN_2, Level::Low),
            Output::new(p.PIN_3, Level::Low),
            Output::new(p.PIN_4, Level::Low),
            Output::new(p.PIN_5, Level::Low),
        ],
        addr: [
            Output::new(p.PIN_6, Level::Low),
            Output::new(p.PIN_7, Level::Low),
            Output::new(p.PIN_8, Level::Low),
            Output::new(p.PIN_9, Level::Low),
            Output::new(p.PIN_10, Level::Low),
        ],
        clk: Output::new(p.PIN_11, Level::Low),
        lat: Output::new(p.PIN_12, Level::Low),
        oe: Output::new(p.PIN_13, Level::High),
    };
    spawner.spawn(hub75::refresh_task(pins)).unwrap();
    info!("HUB75 refresh task spawned");

    // SAFETY: Only one Hub75Backend instance exists
    let mut display = DisplayEngine::new(unsafe { Hub75Backend::new() });
    if let Err(e) = display.begin(BOARD_PANELS.sanitized()) {
        // Keep running: the orchestrator defers frames until a display is up
        error!("Display start failed: {}", e);
    }
    info!("Panel wiring: {}", display.wiring().label());

    let mut orchestrator = Orchestrator::new(display);

    let mut connectivity_rx = CONNECTIVITY.dyn_receiver().unwrap();
    let mut transit_rx = TRANSIT.dyn_receiver().unwrap();
    let start_time = Instant::now();
    spawner
        .spawn(demo_feed_task(CONNECTIVITY.dyn_sender(), TRANSIT.dyn_sender(), start_time))
        .unwrap();
    info!("Demo feed task spawned");

    let mut signals = Connectivity::default();

    loop {
        let now_ms = start_time.elapsed().as_millis() as u32;

        if let Some(latest) = connectivity_rx.try_changed() {
            signals = latest;
        }
        if let Some(update) = transit_rx.try_changed() {
            orchestrator.apply_transit_update(update, now_ms);
        }

        if orchestrator.tick(now_ms, signals) == TickOutcome::Rendered {
            led.toggle();
            let stats = orchestrator.stats();
            if stats.frames_rendered % STATS_EVERY_FRAMES == 0 {
                info!(
                    "{} | refreshes={} last={}us",
                    stats,
                    hub75::REFRESH_COUNT.load(core::sync::atomic::Ordering::Relaxed),
                    hub75::LAST_REFRESH_TIME_US.load(core::sync::atomic::Ordering::Relaxed)
                );
            }
        }

        Timer::after_millis(TICK_MS).await;
    }
}
