//! Fixed-capacity byte retention for the incoming stream.
//!
//! All positions are plain indices reduced `mod capacity`; nothing outside
//! of [`RingBuffer`] ever sees a physical storage offset.

mod scroll;
pub use scroll::ScrollController;


/// Byte store that overwrites the oldest data once it is full.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    storage: Box<[u8]>,
    /// Index of the next byte to be written, always in `[0, capacity)`.
    tail: usize,
    /// Count of logically valid bytes, saturates at `capacity`.
    size: usize,
}

impl RingBuffer {
    /// Creates an empty buffer holding at most `capacity` bytes.
    ///
    /// **Panics** if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            storage: vec![0; capacity].into_boxed_slice(),
            tail: 0,
            size: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    /// Copies `data` in at the tail, evicting the oldest bytes as needed.
    ///
    /// Returns `false` (and leaves the buffer untouched) if `data` is empty.
    pub fn append(&mut self, data: &[u8]) -> bool {
        if data.is_empty() {
            return false;
        }
        let capacity = self.capacity();

        // Anything before the last `capacity` bytes would be overwritten
        // within this same call anyway.
        let skipped = data.len().saturating_sub(capacity);
        let mut write_at = (self.tail + skipped) % capacity;
        let mut remaining = &data[skipped..];

        while !remaining.is_empty() {
            let run = remaining.len().min(capacity - write_at);
            self.storage[write_at..write_at + run].copy_from_slice(&remaining[..run]);
            write_at = (write_at + run) % capacity;
            remaining = &remaining[run..];
        }

        self.advance(data.len());
        true
    }

    /// Lets `fill` write directly into the contiguous free run starting at
    /// the tail (up to the physical end of storage).
    ///
    /// `fill` returns how many bytes it wrote; values larger than the slice
    /// it was handed are clamped. Returns the accepted count, zero meaning
    /// nothing changed.
    pub fn append_with<F>(&mut self, fill: F) -> usize
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        let run = &mut self.storage[self.tail..];
        let written = fill(run).min(run.len());
        if written > 0 {
            self.advance(written);
        }
        written
    }

    fn advance(&mut self, written: usize) {
        let capacity = self.capacity();
        self.tail = (self.tail + written % capacity) % capacity;
        self.size = self.size.saturating_add(written).min(capacity);
    }

    /// Storage index of the oldest retained byte.
    pub fn logical_start_index(&self) -> usize {
        if self.is_full() { self.tail } else { 0 }
    }

    /// Iterates over up to `count` bytes, starting `offset` bytes after the
    /// oldest retained one, never past the newest.
    pub fn window_iter(&self, offset: usize, count: usize) -> impl Iterator<Item = u8> + '_ {
        let capacity = self.capacity();
        let start = self.logical_start_index();
        let available = self.size.saturating_sub(offset);
        let count = count.min(available);

        (0..count).map(move |i| {
            // `offset + i < size <= capacity`, so this never overflows twice.
            self.storage[(start + offset + i) % capacity]
        })
    }

    /// Owned copy of [`RingBuffer::window_iter`].
    pub fn read_window(&self, offset: usize, count: usize) -> Vec<u8> {
        self.window_iter(offset, count).collect()
    }

    /// Forgets all retained bytes. Storage contents are left as-is.
    pub fn reset(&mut self) {
        self.tail = 0;
        self.size = 0;
    }

    /// Raw storage, stale slots included. Only meant for diagnostics.
    pub(crate) fn storage(&self) -> &[u8] {
        &self.storage
    }

    #[cfg(test)]
    pub(crate) fn tail(&self) -> usize {
        self.tail
    }
}
