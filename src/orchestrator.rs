//! Device orchestrator: decides what to show and when to redraw.
//!
//! The orchestrator owns the [`RenderModel`] and drives the pipeline once per
//! tick:
//!
//! 1. Re-derive the UI state from the connectivity signals. The redraw flag is
//!    raised only when the state or its status text actually changed.
//! 2. If a redraw is pending and at least [`MIN_RENDER_GAP_MS`] passed since
//!    the last rendered frame, compile the model into a draw list, execute it
//!    on the display and present.
//!
//! A pending redraw is never dropped: a throttled or not-ready tick leaves the
//! flag set for the next one.

use crate::badge::BadgeRasterizer;
use crate::config::MIN_RENDER_GAP_MS;
use crate::display::FrameTarget;
use crate::draw_list::{DrawCommand, DrawList};
use crate::layout::FrameCompiler;
use crate::model::{RenderModel, TransitUpdate, UiState, bounded};

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// Connectivity signals sampled before each UI-state evaluation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Connectivity {
    pub wifi_connected: bool,
    pub mqtt_connected: bool,
    pub setup_mode_active: bool,
}

impl Connectivity {
    /// Wi-Fi and MQTT both up.
    pub const ONLINE: Self = Self {
        wifi_connected: true,
        mqtt_connected: true,
        setup_mode_active: false,
    };
}

/// What a call to [`Orchestrator::tick`] did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum TickOutcome {
    /// Nothing changed since the last frame.
    Idle,
    /// Redraw pending but the minimum frame gap has not elapsed.
    Throttled,
    /// Redraw pending but the display cannot take a frame.
    NotReady,
    /// A frame was drawn and presented.
    Rendered,
}

/// Counters for telemetry.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct RenderStats {
    pub frames_rendered: u32,
    pub throttled: u32,
    pub not_ready: u32,
    /// Draw commands lost to a full draw list, all frames.
    pub dropped_commands: u32,
    /// Texts lost to a full text arena, all frames.
    pub dropped_text: u32,
}

impl RenderStats {
    /// Count one presented frame and what its draw list dropped.
    pub fn record_frame(
        &mut self,
        list: &DrawList,
    ) {
        self.frames_rendered = self.frames_rendered.saturating_add(1);
        self.dropped_commands = self.dropped_commands.saturating_add(list.dropped_commands());
        self.dropped_text = self.dropped_text.saturating_add(list.dropped_text());
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Owns the render model and the frame buffers of the pipeline.
pub struct Orchestrator<D> {
    display: D,
    model: RenderModel,
    compiler: FrameCompiler,
    rasterizer: BadgeRasterizer,
    draw_list: DrawList,
    redraw_pending: bool,
    last_render_ms: Option<u32>,
    stats: RenderStats,
}

impl<D: FrameTarget> Orchestrator<D> {
    /// Orchestrator over a display that has already been started.
    ///
    /// Starts in [`UiState::Booting`] with a redraw pending.
    pub fn new(display: D) -> Self {
        let compiler = FrameCompiler::new(display.geometry());
        Self {
            display,
            model: RenderModel::booting(),
            compiler,
            rasterizer: BadgeRasterizer::new(),
            draw_list: DrawList::new(),
            redraw_pending: true,
            last_render_ms: None,
            stats: RenderStats::default(),
        }
    }

    /// Use a custom badge rasterizer (e.g. with aspect correction).
    pub fn with_rasterizer(
        mut self,
        rasterizer: BadgeRasterizer,
    ) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Store new transit rows, soonest first, and schedule a redraw.
    ///
    /// The UI state itself only changes on the next evaluation.
    pub fn apply_transit_update(
        &mut self,
        update: TransitUpdate,
        now_ms: u32,
    ) {
        self.model.rows = update.into_sorted_rows();
        self.model.has_data = true;
        self.model.updated_at_ms = Some(now_ms);
        self.redraw_pending = true;
        log_info!("transit: {} row(s) applied", self.model.rows.len());
    }

    /// Re-derive the UI state. Returns whether anything visible changed.
    pub fn update_ui_state(
        &mut self,
        signals: Connectivity,
    ) -> bool {
        let state = UiState::derive(
            self.model.has_data,
            signals.wifi_connected,
            signals.mqtt_connected,
            signals.setup_mode_active,
        );
        let (line, detail) = state.status_text();

        let changed = state != self.model.ui_state
            || self.model.status_line != line
            || self.model.status_detail != detail;
        if !changed {
            return false;
        }

        if state != self.model.ui_state {
            log_info!("ui: {} -> {}", self.model.ui_state.label(), state.label());
        }
        self.model.ui_state = state;
        self.model.status_line = bounded(line);
        self.model.status_detail = bounded(detail);
        self.redraw_pending = true;
        true
    }

    /// Evaluate the UI state and render if a frame is due.
    pub fn tick(
        &mut self,
        now_ms: u32,
        signals: Connectivity,
    ) -> TickOutcome {
        self.update_ui_state(signals);
        self.render(now_ms)
    }

    /// Render the model if a redraw is pending and allowed.
    pub fn render(
        &mut self,
        now_ms: u32,
    ) -> TickOutcome {
        if !self.redraw_pending {
            return TickOutcome::Idle;
        }

        if self
            .last_render_ms
            .is_some_and(|last| now_ms.wrapping_sub(last) < MIN_RENDER_GAP_MS)
        {
            self.stats.throttled = self.stats.throttled.saturating_add(1);
            return TickOutcome::Throttled;
        }

        if !self.display.begin_frame() {
            self.stats.not_ready = self.stats.not_ready.saturating_add(1);
            return TickOutcome::NotReady;
        }

        self.compiler.set_viewport(self.display.geometry());
        self.compiler.build(&self.model, &mut self.draw_list);
        self.execute();
        self.display.present();

        self.stats.record_frame(&self.draw_list);
        self.redraw_pending = false;
        self.last_render_ms = Some(now_ms);
        TickOutcome::Rendered
    }

    /// Run the compiled draw list against the display.
    fn execute(&mut self) {
        for command in self.draw_list.commands() {
            match *command {
                DrawCommand::FillRect { x, y, w, h, color } => {
                    self.display.fill_rect(x, y, w, h, color);
                }
                DrawCommand::Text {
                    x,
                    y,
                    color,
                    background,
                    size,
                    text,
                } => {
                    let text = self.draw_list.text_of(text);
                    self.display.draw_text(x, y, text, color, size, background);
                }
                DrawCommand::Badge {
                    x,
                    y,
                    diameter,
                    fill,
                    label_color,
                    text,
                } => {
                    let route = self.draw_list.text_of(text);
                    self.rasterizer
                        .draw_badge(&mut self.display, x, y, diameter, route, fill, label_color);
                }
            }
        }
    }

    /// Current model, for publishing what is shown.
    #[inline]
    pub fn render_model(&self) -> &RenderModel { &self.model }

    #[inline]
    pub fn redraw_pending(&self) -> bool { self.redraw_pending }

    /// Force a redraw on the next allowed tick.
    #[inline]
    pub fn request_redraw(&mut self) { self.redraw_pending = true; }

    #[inline]
    pub fn stats(&self) -> RenderStats { self.stats }

    #[inline]
    pub fn last_render_ms(&self) -> Option<u32> { self.last_render_ms }

    /// Draw list of the last compiled frame.
    #[inline]
    pub fn draw_list(&self) -> &DrawList { &self.draw_list }

    #[inline]
    pub fn display(&self) -> &D { &self.display }

    #[inline]
    pub fn display_mut(&mut self) -> &mut D { &mut self.display }
}

// =============================================================================
// Unit Tests
// =============================================================================
