/// Scroll position into the logical (oldest to newest) view of a
/// [`RingBuffer`](super::RingBuffer), in bytes.
///
/// The controller doesn't hold a reference to the buffer, so every mutation
/// takes the buffer's current length to clamp against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollController {
    offset: usize,
}

impl ScrollController {
    pub const fn new() -> Self {
        Self { offset: 0 }
    }

    pub fn current_offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, new_offset: usize, len: usize) {
        self.offset = new_offset.min(len);
    }

    /// Moves by `delta` bytes, negative being towards the oldest data.
    pub fn scroll_by(&mut self, delta: isize, len: usize) {
        let target = if delta.is_negative() {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta.unsigned_abs())
        };
        self.set_offset(target, len);
    }

    /// Pulls the offset back into `[0, len]` after the valid range changed.
    ///
    /// Returns `true` if the offset had to move.
    pub fn clamp(&mut self, len: usize) -> bool {
        let before = self.offset;
        self.offset = self.offset.min(len);
        before != self.offset
    }
}
