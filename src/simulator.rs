//! Headless host simulator.
//!
//! Drives the orchestrator against an in-memory panel chain on a virtual
//! clock and prints every presented frame as ASCII art, read back through the
//! same panel mapping the hardware uses.
//!
//! Flags: `--serpentine` (2x2 grid, odd rows reversed), `--double-buffered`,
//! `--brightness <1-255>`.

use std::env;

use embedded_graphics::pixelcolor::Rgb565;
use transit_matrix::colors::{AMBER, BADGE_FILL, BLACK, CYAN, GRAY, GREEN, RED, WHITE};
use transit_matrix::config::PanelConfig;
use transit_matrix::display::{DisplayEngine, FrameTarget};
use transit_matrix::geometry::PanelMapper;
use transit_matrix::memory::MemoryBackend;
use transit_matrix::orchestrator::{Orchestrator, TickOutcome};

use crate::demo;

/// Pixel capacity of the simulated chain (four 64x32 panels).
const SIM_PIXELS: usize = 4 * 64 * 32;

/// Virtual time advanced per tick.
const TICK_MS: u32 = 10;

/// Virtual run length.
const RUN_MS: u32 = 25_000;

type SimDisplay = DisplayEngine<MemoryBackend<SIM_PIXELS>>;

fn config_from_args() -> PanelConfig {
    let mut config = PanelConfig::DEFAULT;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--serpentine" => {
                config.rows = 2;
                config.cols = 2;
                config.serpentine = true;
            }
            "--double-buffered" => config.double_buffered = true,
            "--brightness" => {
                if let Some(value) = args.next().and_then(|v| v.parse().ok()) {
                    config.brightness = value;
                }
            }
            other => eprintln!("ignoring unknown argument {other}"),
        }
    }
    config.sanitized()
}

/// Character for a pixel color.
fn glyph(color: Rgb565) -> char {
    match color {
        c if c == BLACK => ' ',
        c if c == WHITE => '#',
        c if c == RED => 'r',
        c if c == GREEN => 'g',
        c if c == AMBER => 'a',
        c if c == CYAN => 'c',
        c if c == GRAY => '.',
        c if c == BADGE_FILL => 'o',
        _ => '*',
    }
}

fn print_frame(
    display: &SimDisplay,
    now_ms: u32,
    label: &str,
) {
    let geometry = display.geometry();
    let config = display.config();
    let wiring = display.wiring();
    let border: String = "-".repeat(usize::from(geometry.total_width));

    println!("t={now_ms}ms state={label}");
    println!("+{border}+");
    for y in 0..i32::from(geometry.total_height) {
        let line: String = (0..i32::from(geometry.total_width))
            .map(|x| {
                wiring
                    .map(config, x, y)
                    .and_then(|point| display.backend().pixel(point))
                    .map_or('?', glyph)
            })
            .collect();
        println!("|{line}|");
    }
    println!("+{border}+");
}

pub fn run() {
    let config = config_from_args();

    let mut display = SimDisplay::new(MemoryBackend::new());
    if let Err(e) = display.begin(config) {
        eprintln!("display start failed: {e}");
        return;
    }
    println!(
        "{}x{} panels of {}x{}, {} wiring, brightness {}",
        config.rows,
        config.cols,
        config.panel_width,
        config.panel_height,
        display.wiring().label(),
        display.backend().brightness()
    );

    let mut orchestrator = Orchestrator::new(display);
    let mut next_update_ms = demo::first_update_ms();
    let mut step = 0;

    for now_ms in (0..RUN_MS).step_by(TICK_MS as usize) {
        if now_ms >= next_update_ms {
            orchestrator.apply_transit_update(demo::transit_update(step), now_ms);
            step += 1;
            next_update_ms += demo::UPDATE_INTERVAL_MS;
        }

        if orchestrator.tick(now_ms, demo::connectivity_at(now_ms)) == TickOutcome::Rendered {
            let label = orchestrator.render_model().ui_state.label();
            print_frame(orchestrator.display(), now_ms, label);
        }
    }

    let stats = orchestrator.stats();
    println!(
        "frames={} throttled={} not_ready={} dropped_commands={} dropped_text={} swaps={}",
        stats.frames_rendered,
        stats.throttled,
        stats.not_ready,
        stats.dropped_commands,
        stats.dropped_text,
        orchestrator.display().backend().swap_count()
    );
}
