//! Seams between the terminal core and the things it talks to.

use std::collections::VecDeque;

/// A pixel-addressed drawing target with a single active font.
///
/// Text is positioned by its baseline, so `y` is the *bottom* of the glyphs.
pub trait DrawSurface {
    fn surface_width(&self) -> usize;
    fn surface_height(&self) -> usize;
    fn glyph_width(&self) -> usize;
    fn glyph_height(&self) -> usize;

    /// Wipes everything drawn so far.
    fn clear(&mut self) {}
    fn draw_text(&mut self, x: usize, y: usize, text: &str);
    fn draw_frame(&mut self, x: usize, y: usize, width: usize, height: usize);
    /// Draws a scrollbar along the right edge with the thumb at `position` out of `total`.
    fn draw_scrollbar(&mut self, position: usize, total: usize);
}

/// Non-blocking supplier of stream bytes.
pub trait ByteSource {
    /// Moves whatever is available right now (up to `buf.len()`) into `buf`.
    ///
    /// Returns the count written, `0` meaning nothing is pending. Must never block.
    fn try_receive(&mut self, buf: &mut [u8]) -> usize;
}

impl ByteSource for VecDeque<u8> {
    fn try_receive(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len().min(self.len());
        for (slot, byte) in buf.iter_mut().zip(self.drain(..count)) {
            *slot = byte;
        }
        count
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn try_receive(&mut self, buf: &mut [u8]) -> usize {
        (**self).try_receive(buf)
    }
}
