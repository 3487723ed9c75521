//! Bounded per-frame draw commands and their text arena.
//!
//! A frame is described as an append-only list of [`DrawCommand`]s. Text is not
//! stored in the commands themselves: each string is copied once into a
//! [`TextArena`] and the command carries a [`TextRef`] (offset + length) into
//! it. Both containers have a fixed capacity and are reset in bulk at the start
//! of every frame build.
//!
//! When either container is full the offending command is dropped and counted;
//! nothing is overwritten and nothing panics.

use embedded_graphics::pixelcolor::Rgb565;
use heapless::Vec;

use crate::config::{MAX_DRAW_COMMANDS, TEXT_ARENA_BYTES};

// =============================================================================
// Text Arena
// =============================================================================

/// Handle to a string stored in a [`TextArena`].
///
/// Offsets rather than references, so the arena can be reset or moved without
/// leaving commands with dangling pointers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TextRef {
    start: u16,
    len: u16,
}

impl TextRef {
    /// Length of the referenced text in bytes.
    #[inline]
    pub const fn len(self) -> usize { self.len as usize }

    #[inline]
    pub const fn is_empty(self) -> bool { self.len == 0 }
}

/// Bump allocator for frame text.
pub struct TextArena<const N: usize> {
    bytes: [u8; N],
    used: usize,
}

impl<const N: usize> TextArena<N> {
    /// Empty arena.
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            used: 0,
        }
    }

    /// Forget every stored string.
    #[inline]
    pub fn reset(&mut self) { self.used = 0; }

    /// Bytes in use.
    #[inline]
    pub const fn used(&self) -> usize { self.used }

    /// Bytes still free.
    #[inline]
    pub const fn remaining(&self) -> usize { N - self.used }

    /// Copy `text` into the arena.
    ///
    /// Returns `None` (and stores nothing) when the text does not fit.
    pub fn alloc(
        &mut self,
        text: &str,
    ) -> Option<TextRef> {
        let len = text.len();
        if len > self.remaining() || self.used + len > usize::from(u16::MAX) {
            return None;
        }
        let start = self.used;
        self.bytes[start..start + len].copy_from_slice(text.as_bytes());
        self.used += len;
        Some(TextRef {
            start: start as u16,
            len: len as u16,
        })
    }

    /// Resolve a handle. Stale or foreign handles resolve to `""`.
    pub fn get(
        &self,
        text: TextRef,
    ) -> &str {
        let start = usize::from(text.start);
        let end = start + usize::from(text.len);
        if end > self.used {
            return "";
        }
        core::str::from_utf8(&self.bytes[start..end]).unwrap_or("")
    }
}

impl<const N: usize> Default for TextArena<N> {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Draw Commands
// =============================================================================

/// One drawing primitive of a compiled frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DrawCommand {
    /// Solid rectangle.
    FillRect {
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        color: Rgb565,
    },
    /// Text at a top-left position, optionally on an opaque background.
    Text {
        x: i16,
        y: i16,
        color: Rgb565,
        background: Option<Rgb565>,
        size: u8,
        text: TextRef,
    },
    /// Filled circular route badge with a short label.
    Badge {
        x: i16,
        y: i16,
        diameter: i16,
        fill: Rgb565,
        label_color: Rgb565,
        text: TextRef,
    },
}

/// Draw commands and text for one frame.
pub struct DrawList {
    commands: Vec<DrawCommand, MAX_DRAW_COMMANDS>,
    arena: TextArena<TEXT_ARENA_BYTES>,
    dropped_commands: u32,
    dropped_text: u32,
}

impl DrawList {
    /// Empty list.
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
            arena: TextArena::new(),
            dropped_commands: 0,
            dropped_text: 0,
        }
    }

    /// Start a new frame: clears commands, text and drop counters.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.arena.reset();
        self.dropped_commands = 0;
        self.dropped_text = 0;
    }

    /// Append a command; dropped and counted when the list is full.
    pub fn push(
        &mut self,
        command: DrawCommand,
    ) -> bool {
        if self.commands.push(command).is_err() {
            self.dropped_commands += 1;
            return false;
        }
        true
    }

    /// Copy text into the arena; `None` (counted) when it is full.
    pub fn intern(
        &mut self,
        text: &str,
    ) -> Option<TextRef> {
        let interned = self.arena.alloc(text);
        if interned.is_none() {
            self.dropped_text += 1;
        }
        interned
    }

    /// Append a solid rectangle.
    pub fn fill_rect(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        color: Rgb565,
    ) -> bool {
        self.push(DrawCommand::FillRect { x, y, w, h, color })
    }

    /// Append text, opaque when `background` is set. Empty text emits nothing.
    pub fn text(
        &mut self,
        x: i16,
        y: i16,
        text: &str,
        color: Rgb565,
        background: Option<Rgb565>,
        size: u8,
    ) -> bool {
        if text.is_empty() {
            return false;
        }
        // Full list: don't consume arena space for a command that can't land
        if self.commands.is_full() {
            self.dropped_commands += 1;
            return false;
        }
        let Some(text) = self.intern(text) else {
            return false;
        };
        self.push(DrawCommand::Text {
            x,
            y,
            color,
            background,
            size,
            text,
        })
    }

    /// Append a labeled badge.
    pub fn badge(
        &mut self,
        x: i16,
        y: i16,
        diameter: i16,
        label: &str,
        fill: Rgb565,
        label_color: Rgb565,
    ) -> bool {
        if self.commands.is_full() {
            self.dropped_commands += 1;
            return false;
        }
        let Some(text) = self.intern(label) else {
            return false;
        };
        self.push(DrawCommand::Badge {
            x,
            y,
            diameter,
            fill,
            label_color,
            text,
        })
    }

    /// Commands in emission order.
    #[inline]
    pub fn commands(&self) -> &[DrawCommand] { &self.commands }

    /// Text referenced by a command.
    #[inline]
    pub fn text_of(
        &self,
        text: TextRef,
    ) -> &str {
        self.arena.get(text)
    }

    /// Arena bytes used by the current frame.
    #[inline]
    pub const fn text_bytes(&self) -> usize { self.arena.used() }

    /// Commands dropped this frame because the list was full.
    #[inline]
    pub const fn dropped_commands(&self) -> u32 { self.dropped_commands }

    /// Texts dropped this frame because the arena was full.
    #[inline]
    pub const fn dropped_text(&self) -> u32 { self.dropped_text }

    #[inline]
    pub fn len(&self) -> usize { self.commands.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.commands.is_empty() }
}

impl Default for DrawList {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================
