use crate::traits::DrawSurface;

use super::DisplayMode;

/// Space between the surface edge and the text body: 2px of padding plus the 1px frame line.
pub const FRAME_PADDING: usize = 2 + 1;
/// Horizontal room reserved for the scrollbar: 3px bar plus 1px gap.
pub const SCROLLBAR_WIDTH: usize = 3 + 1;

/// Where things go on a given surface for a given mode.
///
/// Purely derived, recomputed on every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    pub frame_width: usize,
    pub frame_height: usize,
    pub body_width: usize,
    pub body_height: usize,
    pub glyph_height: usize,
    pub rows: usize,
    pub columns: usize,
    pub bytes_per_row: usize,
    pub bytes_on_screen: usize,
}

impl Layout {
    pub fn compute(
        surface_width: usize,
        surface_height: usize,
        glyph_width: usize,
        glyph_height: usize,
        mode: DisplayMode,
    ) -> Self {
        let frame_width = surface_width.saturating_sub(SCROLLBAR_WIDTH);
        let frame_height = surface_height;
        let body_width = frame_width.saturating_sub(FRAME_PADDING * 2);
        let body_height = frame_height.saturating_sub(FRAME_PADDING * 2);

        let rows = body_height.checked_div(glyph_height).unwrap_or(0);
        let columns = body_width.checked_div(glyph_width).unwrap_or(0);
        let bytes_per_row = columns / mode.units_per_byte();

        Self {
            frame_width,
            frame_height,
            body_width,
            body_height,
            glyph_height,
            rows,
            columns,
            bytes_per_row,
            bytes_on_screen: bytes_per_row * rows,
        }
    }

    pub fn for_surface<S: DrawSurface + ?Sized>(surface: &S, mode: DisplayMode) -> Self {
        Self::compute(
            surface.surface_width(),
            surface.surface_height(),
            surface.glyph_width(),
            surface.glyph_height(),
            mode,
        )
    }

    /// Baseline `(x, y)` of the text in `row`.
    pub fn row_origin(&self, row: usize) -> (usize, usize) {
        // Strings are drawn upwards from their baseline.
        (FRAME_PADDING, FRAME_PADDING + self.glyph_height * (row + 1))
    }
}
