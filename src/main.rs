//! Transit Matrix firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Shows the next transit arrivals on a chain of HUB75 LED matrix panels.
//!
//! # Architecture
//!
//! All rendering lives in the `transit_matrix` library. This binary adds:
//! - On ARM: board bring-up, the HUB75 scan-out driver and a demo feed
//! - Elsewhere: a headless simulator that prints frames as ASCII art
//!
//! Uses double buffering on hardware: the main task renders into the back
//! buffer while the refresh task scans the front buffer out.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod demo;

#[cfg(target_arch = "arm")]
mod firmware;
#[cfg(target_arch = "arm")]
mod hub75;
#[cfg(not(target_arch = "arm"))]
mod simulator;

#[cfg(target_arch = "arm")]
use {defmt_rtt as _, panic_probe as _};

#[cfg(target_arch = "arm")]
#[embassy_executor::main]
async fn main(spawner: embassy_executor::Spawner) { firmware::run(spawner).await }

#[cfg(not(target_arch = "arm"))]
fn main() { simulator::run(); }
