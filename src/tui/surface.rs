use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Style, Stylize},
    widgets::{
        Block, BorderType, Clear, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget,
    },
};

use crate::traits::DrawSurface;

/// Pixel size of one virtual glyph; a terminal cell stands in for one glyph.
pub const GLYPH_WIDTH: usize = 6;
pub const GLYPH_HEIGHT: usize = 10;

/// Presents a region of a ratatui [`Buffer`] as a small pixel display.
///
/// Pixel coordinates are snapped to the next cell boundary, so sub-glyph
/// padding collapses into the cell next to it.
pub struct CellSurface<'a> {
    area: Rect,
    buf: &'a mut Buffer,
    /// Inside of the last frame drawn, text gets clipped to it.
    frame_inner: Option<Rect>,
}

impl<'a> CellSurface<'a> {
    pub fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self {
            area,
            buf,
            frame_inner: None,
        }
    }

    fn to_cells(x: usize, y: usize) -> (u16, u16) {
        let col = x.div_ceil(GLYPH_WIDTH);
        let row = y.div_ceil(GLYPH_HEIGHT);
        (
            u16::try_from(col).unwrap_or(u16::MAX),
            u16::try_from(row).unwrap_or(u16::MAX),
        )
    }
}

impl DrawSurface for CellSurface<'_> {
    fn surface_width(&self) -> usize {
        self.area.width as usize * GLYPH_WIDTH
    }
    fn surface_height(&self) -> usize {
        self.area.height as usize * GLYPH_HEIGHT
    }
    fn glyph_width(&self) -> usize {
        GLYPH_WIDTH
    }
    fn glyph_height(&self) -> usize {
        GLYPH_HEIGHT
    }

    fn clear(&mut self) {
        Clear.render(self.area, self.buf);
        self.frame_inner = None;
    }

    fn draw_text(&mut self, x: usize, y: usize, text: &str) {
        // `y` is the baseline, the glyph's top edge is one glyph height up.
        let (col, row) = Self::to_cells(x, y.saturating_sub(GLYPH_HEIGHT));
        let x = self.area.x.saturating_add(col);
        let y = self.area.y.saturating_add(row);

        let bounds = self.frame_inner.unwrap_or(self.area);
        if x < bounds.left() || x >= bounds.right() || y < bounds.top() || y >= bounds.bottom() {
            return;
        }
        let max_width = (bounds.right() - x) as usize;
        self.buf.set_stringn(x, y, text, max_width, Style::default());
    }

    fn draw_frame(&mut self, x: usize, y: usize, width: usize, height: usize) {
        let (col, row) = Self::to_cells(x, y);
        let frame = Rect {
            x: self.area.x.saturating_add(col),
            y: self.area.y.saturating_add(row),
            width: u16::try_from(width / GLYPH_WIDTH).unwrap_or(u16::MAX),
            height: u16::try_from(height / GLYPH_HEIGHT).unwrap_or(u16::MAX),
        }
        .intersection(self.area);

        let block = Block::bordered().border_type(BorderType::Rounded);
        self.frame_inner = Some(block.inner(frame));
        block.render(frame, self.buf);
    }

    fn draw_scrollbar(&mut self, position: usize, total: usize) {
        if self.area.width == 0 || self.area.height == 0 {
            return;
        }
        let track = Rect {
            x: self.area.right() - 1,
            y: self.area.y,
            width: 1,
            height: self.area.height,
        };
        let mut state = ScrollbarState::new(total).position(position);
        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .thumb_style(Style::new().bold())
            .render(track, self.buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::TerminalView;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_owned())
            .collect()
    }

    #[test]
    fn test_cell_surface_metrics() {
        let area = Rect::new(0, 0, 22, 7);
        let mut buf = Buffer::empty(area);
        let surface = CellSurface::new(area, &mut buf);
        assert_eq!(surface.surface_width(), 132);
        assert_eq!(surface.surface_height(), 70);
    }

    #[test]
    fn test_view_renders_into_cells() {
        let area = Rect::new(0, 0, 22, 7);
        let mut buf = Buffer::empty(area);
        let view = TerminalView::new(64);
        let mut source: std::collections::VecDeque<u8> = b"ab".iter().copied().collect();
        assert!(view.ingest(&mut source));
        assert!(source.is_empty());

        let mut surface = CellSurface::new(area, &mut buf);
        view.render(&mut surface);

        // Frame on row 0, first text row right under it, one cell in.
        assert!(row_text(&buf, 0).starts_with('╭'));
        assert!(row_text(&buf, 1).starts_with("│01100001 01100010"));
    }
}
