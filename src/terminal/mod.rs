use std::{fmt::Write, sync::Mutex};

use tracing::{debug, trace};

use crate::{
    buffer::{RingBuffer, ScrollController},
    traits::{ByteSource, DrawSurface},
};

mod layout;
pub use layout::{FRAME_PADDING, Layout, SCROLLBAR_WIDTH};
mod render;
pub use render::Renderer;


/// How retained bytes are turned into glyphs.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::VariantArray,
    strum::FromRepr,
)]
#[repr(u8)]
pub enum DisplayMode {
    #[default]
    Auto = 0,
    Hex = 1,
    Binary = 2,
}

impl DisplayMode {
    /// Converts a raw mode value coming from outside the crate.
    ///
    /// **Panics** on anything but a defined variant, there is no sane way to keep drawing.
    pub fn from_raw(raw: u8) -> Self {
        Self::from_repr(raw).unwrap_or_else(|| panic!("Bad display mode: {raw}"))
    }

    /// Glyph columns one byte occupies, separator included.
    pub const fn units_per_byte(self) -> usize {
        match self {
            // Hex and Auto have no formatter of their own yet and share the binary one.
            DisplayMode::Auto | DisplayMode::Hex | DisplayMode::Binary => 9,
        }
    }

    /// Appends the glyphs for `byte` (without separator) to `out`.
    pub fn format_byte(self, byte: u8, out: &mut String) {
        match self {
            DisplayMode::Auto | DisplayMode::Hex | DisplayMode::Binary => {
                for bit in (0..8).rev() {
                    out.push(if byte & (1 << bit) != 0 { '1' } else { '0' });
                }
            }
        }
    }

    /// The variant after this one, wrapping around.
    pub fn next(self) -> Self {
        use strum::VariantArray;
        let index = Self::VARIANTS
            .iter()
            .position(|m| *m == self)
            .unwrap_or_default();
        Self::VARIANTS[(index + 1) % Self::VARIANTS.len()]
    }
}

/// Everything a redraw or an ingest needs, kept behind one lock.
#[derive(Debug)]
struct TerminalModel {
    buffer: RingBuffer,
    scroll: ScrollController,
    display_mode: DisplayMode,
    renderer: Renderer,
}

/// The scrollable byte terminal: retained stream data plus how it's viewed.
///
/// Safe to share between the thread feeding bytes in and the one drawing;
/// every access is serialised through a single mutex.
#[derive(Debug)]
pub struct TerminalView {
    model: Mutex<TerminalModel>,
}

impl TerminalView {
    pub fn new(capacity: usize) -> Self {
        debug!("Creating terminal view with {capacity} byte buffer");
        Self {
            model: Mutex::new(TerminalModel {
                buffer: RingBuffer::new(capacity),
                scroll: ScrollController::new(),
                display_mode: DisplayMode::default(),
                renderer: Renderer::new(),
            }),
        }
    }

    /// Runs `f` with exclusive access to the model.
    ///
    /// The lock is released when `f` returns, on any path.
    fn with_model<R>(&self, f: impl FnOnce(&mut TerminalModel) -> R) -> R {
        let mut model = self.model.lock().expect("terminal model lock poisoned");
        f(&mut model)
    }

    /// Drops all retained bytes and scrolls back to the start.
    pub fn reset(&self) {
        self.with_model(|model| {
            model.buffer.reset();
            model.scroll.clamp(model.buffer.len());
        });
        debug!("Terminal view reset");
    }

    pub fn set_display_mode(&self, mode: DisplayMode) {
        self.with_model(|model| {
            model.display_mode = mode;
            model.scroll.clamp(model.buffer.len());
        });
        debug!("Display mode set to {mode}");
    }

    /// Like [`TerminalView::set_display_mode`], from an unchecked value.
    ///
    /// **Panics** if `raw` isn't a defined [`DisplayMode`].
    pub fn set_display_mode_raw(&self, raw: u8) {
        self.set_display_mode(DisplayMode::from_raw(raw));
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.with_model(|model| model.display_mode)
    }

    /// Takes everything `source` has ready right now, without blocking.
    ///
    /// Only the newest `capacity` bytes survive, so a backlog larger than the
    /// buffer is passed through storage and overwritten rather than left queued.
    /// Returns `true` if any bytes were consumed, i.e. a redraw is warranted.
    pub fn ingest<S: ByteSource + ?Sized>(&self, source: &mut S) -> bool {
        self.with_model(|model| {
            let mut total = 0;

            // Receiving straight into storage only offers the run up to the
            // physical end, so keep going until the source comes up short.
            loop {
                let mut offered = 0;
                let received = model.buffer.append_with(|run| {
                    offered = run.len();
                    source.try_receive(run)
                });
                total += received;
                if received < offered {
                    break;
                }
            }

            if total == 0 {
                return false;
            }
            model.scroll.clamp(model.buffer.len());
            trace!(total, retained = model.buffer.len(), "Ingested stream bytes");
            true
        })
    }

    /// Draws the current window onto `surface`.
    pub fn render<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        self.with_model(|model| {
            let TerminalModel {
                buffer,
                scroll,
                display_mode,
                renderer,
            } = model;
            renderer.render(surface, buffer, scroll.current_offset(), *display_mode);
        });
    }

    /// Scrolls by `delta` bytes. Returns `true` if the offset moved.
    pub fn scroll_by(&self, delta: isize) -> bool {
        self.with_model(|model| {
            let before = model.scroll.current_offset();
            model.scroll.scroll_by(delta, model.buffer.len());
            before != model.scroll.current_offset()
        })
    }

    pub fn scroll_to_start(&self) -> bool {
        self.with_model(|model| {
            let before = model.scroll.current_offset();
            model.scroll.set_offset(0, model.buffer.len());
            before != 0
        })
    }

    /// Scrolls so the newest `window` bytes are the ones shown.
    pub fn scroll_to_end(&self, window: usize) -> bool {
        self.with_model(|model| {
            let before = model.scroll.current_offset();
            let len = model.buffer.len();
            model.scroll.set_offset(len.saturating_sub(window), len);
            before != model.scroll.current_offset()
        })
    }

    pub fn scroll_offset(&self) -> usize {
        self.with_model(|model| model.scroll.current_offset())
    }

    pub fn len(&self) -> usize {
        self.with_model(|model| model.buffer.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.with_model(|model| model.buffer.capacity())
    }

    /// Copy of up to `count` retained bytes starting `offset` bytes in.
    pub fn snapshot(&self, offset: usize, count: usize) -> Vec<u8> {
        self.with_model(|model| model.buffer.read_window(offset, count))
    }

    /// Lists every storage slot, stale ones included, for debugging.
    ///
    /// One line per slot as `index: HEX`, with alphanumeric bytes also shown as text.
    pub fn dump_buffer(&self) -> String {
        let dump = self.with_model(|model| {
            let storage = model.buffer.storage();
            let mut dump = String::with_capacity(storage.len() * 12);
            for (index, byte) in storage.iter().enumerate() {
                _ = write!(dump, "\n{index:3}: {byte:02X}");
                if byte.is_ascii_alphanumeric() {
                    _ = write!(dump, " ({})", *byte as char);
                }
            }
            dump
        });
        debug!("Buffer dump:{dump}");
        dump
    }
}
