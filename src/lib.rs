//! Transit matrix library - rendering and orchestration core for the LED matrix.
//!
//! This library contains everything between "what should be shown" and "which
//! pixel of which panel gets lit". The binary (`main.rs`) adds the RP2350 and
//! HUB75 specific code on ARM, or a headless simulator on the host.
//!
//! # Pipeline (one tick)
//!
//! ```text
//! connectivity / transit update
//!         │
//!         ▼
//!   Orchestrator ── RenderModel ──▶ FrameCompiler ──▶ DrawList
//!                                                        │
//!                                                        ▼
//!                     DisplayEngine ◀── BadgeRasterizer / text / fills
//!                          │
//!                          ▼
//!                 panel mapping ──▶ MatrixBackend ──▶ present()
//! ```
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test --lib --target x86_64-unknown-linux-gnu
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

#[macro_use]
mod log;

// Configuration
pub mod config;

// Rendering
pub mod badge;
pub mod colors;
pub mod display;
pub mod draw_list;
pub mod geometry;
pub mod layout;
pub mod memory;
pub mod styles;

// State
pub mod model;
pub mod orchestrator;

pub use config::{DisplayGeometry, GeometryError, PanelConfig};
pub use display::{Canvas, DisplayEngine, DisplayError, FrameTarget, MatrixBackend};
pub use model::{RenderModel, TransitRow, TransitUpdate, UiState};
pub use orchestrator::{Connectivity, Orchestrator, RenderStats};
