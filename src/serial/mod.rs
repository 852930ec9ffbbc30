//! Where stream bytes come from on a host machine.
//!
//! Reader threads push chunks into a channel; the terminal drains that
//! channel through [`ChannelSource`] without ever blocking.

use crossbeam::channel::{Receiver, TryRecvError};

use crate::traits::ByteSource;

mod errors;
pub use errors::SourceError;

pub mod worker;

pub type SourceResult<T> = Result<T, SourceError>;

/// [`ByteSource`] over chunks arriving on a channel.
///
/// A chunk that doesn't fit into one receive is kept and handed out first next time.
#[derive(Debug)]
pub struct ChannelSource {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    pending_at: usize,
    disconnected: bool,
}

impl ChannelSource {
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: Vec::new(),
            pending_at: 0,
            disconnected: false,
        }
    }

    /// `true` once the sending side is gone and every byte has been handed out.
    pub fn is_finished(&self) -> bool {
        self.disconnected && self.pending_at >= self.pending.len()
    }
}

impl ByteSource for ChannelSource {
    fn try_receive(&mut self, buf: &mut [u8]) -> usize {
        let mut written = 0;
        while written < buf.len() {
            if self.pending_at >= self.pending.len() {
                match self.rx.try_recv() {
                    Ok(chunk) => {
                        self.pending = chunk;
                        self.pending_at = 0;
                        continue;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.disconnected = true;
                        break;
                    }
                }
            }

            let remaining = &self.pending[self.pending_at..];
            let count = remaining.len().min(buf.len() - written);
            buf[written..written + count].copy_from_slice(&remaining[..count]);
            written += count;
            self.pending_at += count;
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use crossbeam::channel::unbounded;

    use super::*;

    #[test]
    fn test_channel_source_splits_chunks() {
        let (tx, rx) = unbounded();
        let mut source = ChannelSource::new(rx);
        tx.send(vec![1, 2, 3, 4, 5]).unwrap();
        tx.send(vec![]).unwrap();
        tx.send(vec![6, 7]).unwrap();

        let mut buf = [0; 3];
        assert_eq!(source.try_receive(&mut buf), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(source.try_receive(&mut buf), 3);
        assert_eq!(buf, [4, 5, 6]);
        assert_eq!(source.try_receive(&mut buf), 1);
        assert_eq!(buf[0], 7);
        assert_eq!(source.try_receive(&mut buf), 0);
        assert!(!source.is_finished());
    }

    #[test]
    fn test_channel_source_finishes_after_drain() {
        let (tx, rx) = unbounded();
        let mut source = ChannelSource::new(rx);
        tx.send(vec![9; 10]).unwrap();
        drop(tx);

        let mut buf = [0; 4];
        assert_eq!(source.try_receive(&mut buf), 4);
        assert!(!source.is_finished());
        let mut big = [0; 64];
        assert_eq!(source.try_receive(&mut big), 6);
        assert!(source.is_finished());
        assert_eq!(source.try_receive(&mut big), 0);
    }

    #[test]
    fn test_channel_source_feeds_view() {
        let (tx, rx) = unbounded();
        let mut source = ChannelSource::new(rx);
        let view = crate::terminal::TerminalView::new(10);

        assert!(!view.ingest(&mut source));
        tx.send(vec![1, 2, 3]).unwrap();
        tx.send((4..=12).collect()).unwrap();
        assert!(view.ingest(&mut source));
        assert_eq!(view.snapshot(0, 10), [3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        assert!(!view.ingest(&mut source));
    }

    #[test]
    fn test_view_keeps_up_with_fast_stream() {
        let (tx, rx) = unbounded();
        let mut source = ChannelSource::new(rx);
        let view = crate::terminal::TerminalView::new(1024);

        let mut next = 0u8;
        for tick in 0..100 {
            // More than a full buffer arrives between two ticks.
            let chunk: Vec<u8> = (0..1152)
                .map(|_| {
                    next = next.wrapping_add(1);
                    next
                })
                .collect();
            tx.send(chunk).unwrap();

            assert!(view.ingest(&mut source));
            assert!(tx.is_empty(), "tick {tick}: chunks left queued");
            assert_eq!(view.len(), 1024);
            assert_eq!(view.snapshot(1023, 1), [next], "tick {tick}");
        }
        assert!(!view.ingest(&mut source));
    }
}
