use bytes::{Bytes, BytesMut};

use crate::codec::{take_frame, DEFAULT_BUFFER_CAPACITY};

/// Bounded accumulation buffer for inbound wire bytes.
///
/// Never holds more than `capacity` bytes. Callers append at most
/// [`room`](FrameBuffer::room) bytes and drain frames with
/// [`next_frame`](FrameBuffer::next_frame); when the buffer is full and
/// still holds no terminator it has to be cleared.
#[derive(Debug)]
pub struct FrameBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl FrameBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of buffered bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes that can still be appended.
    pub fn room(&self) -> usize {
        self.capacity.saturating_sub(self.buf.len())
    }

    /// True when no more bytes fit.
    pub fn is_full(&self) -> bool {
        self.room() == 0
    }

    /// Append bytes, truncating to the remaining room.
    ///
    /// Returns how many bytes were taken.
    pub fn extend(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.room());
        self.buf.extend_from_slice(&data[..n]);
        n
    }

    /// Pop the next verified frame body, discarding invalid segments.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        take_frame(&mut self.buf)
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Remove and return everything currently buffered.
    pub fn take(&mut self) -> BytesMut {
        self.buf.split()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_frame;

    #[test]
    fn extend_respects_capacity() {
        let mut buffer = FrameBuffer::new(4);
        assert_eq!(buffer.extend(&[1, 2, 3]), 3);
        assert_eq!(buffer.room(), 1);
        assert_eq!(buffer.extend(&[4, 5, 6]), 1);
        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn frames_split_across_appends() {
        let mut wire = BytesMut::new();
        encode_frame(b"\xFF\x01", &mut wire);
        encode_frame(b"\xFE\x06\x01", &mut wire);

        let mut buffer = FrameBuffer::default();
        for byte in wire.iter() {
            buffer.extend(&[*byte]);
        }

        assert_eq!(buffer.next_frame().unwrap().as_ref(), b"\xFF\x01");
        assert_eq!(buffer.next_frame().unwrap().as_ref(), b"\xFE\x06\x01");
        assert!(buffer.next_frame().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn take_returns_partial_tail() {
        let mut buffer = FrameBuffer::new(16);
        buffer.extend(&[0x03, 0x41]);
        let tail = buffer.take();
        assert_eq!(&tail[..], &[0x03, 0x41]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.room(), 16);
    }
}
