use crate::{buffer::RingBuffer, traits::DrawSurface};

use super::{DisplayMode, Layout};

/// Enough for a full row of binary groups on the small panels this targets.
const ROW_RESERVE: usize = 64;

/// Turns a window of the buffer into rows of text on a [`DrawSurface`].
///
/// Holds nothing between calls except a scratch row string, which is
/// cleared rather than reallocated for every row.
#[derive(Debug)]
pub struct Renderer {
    pub(super) row: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            row: String::with_capacity(ROW_RESERVE),
        }
    }

    /// Draws frame, scrollbar, and as many bytes from `scroll_offset` on as fit.
    ///
    /// Returns the number of text rows emitted.
    pub fn render<S: DrawSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        buffer: &RingBuffer,
        scroll_offset: usize,
        mode: DisplayMode,
    ) -> usize {
        let layout = Layout::for_surface(surface, mode);

        surface.clear();
        surface.draw_scrollbar(scroll_offset, buffer.len());
        surface.draw_frame(0, 0, layout.frame_width, layout.frame_height);

        let to_draw = buffer.len().min(layout.bytes_on_screen);
        if to_draw == 0 {
            return 0;
        }

        self.row.clear();
        let mut current_row = 0;
        let mut in_row = 0;

        for byte in buffer.window_iter(scroll_offset, to_draw) {
            mode.format_byte(byte, &mut self.row);
            self.row.push(' ');

            in_row += 1;
            if in_row >= layout.bytes_per_row {
                self.flush_row(surface, &layout, current_row);
                in_row = 0;
                current_row += 1;
            }
        }

        if in_row > 0 {
            self.flush_row(surface, &layout, current_row);
            current_row += 1;
        }

        current_row
    }

    fn flush_row<S: DrawSurface + ?Sized>(&mut self, surface: &mut S, layout: &Layout, row: usize) {
        let (x, y) = layout.row_origin(row);
        surface.draw_text(x, y, &self.row);
        self.row.clear();
    }
}
