use std::io::ErrorKind;

use bytes::{Bytes, BytesMut};
use daisylink_channel::Channel;
use tracing::warn;

use crate::buffer::FrameBuffer;
use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};

/// Pulls frames out of a [`Channel`] without ever blocking.
///
/// Handles partial reads and corrupted segments internally; callers only see
/// verified frame bodies.
pub struct FrameReader<C> {
    channel: C,
    buffer: FrameBuffer,
    scratch: Vec<u8>,
    config: FrameConfig,
}

impl<C: Channel> FrameReader<C> {
    /// Create a new frame reader with default configuration.
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(channel: C, config: FrameConfig) -> Self {
        Self {
            channel,
            buffer: FrameBuffer::new(config.buffer_capacity),
            scratch: vec![0u8; config.read_chunk_size.max(1)],
            config,
        }
    }

    /// Return the next complete frame body if one is available.
    ///
    /// Frames already buffered are returned before the channel is read
    /// again. `Ok(None)` means the channel has nothing more right now.
    /// [`FrameError::BufferOverflow`] is returned once when the buffer fills
    /// without a terminator; the buffer has been cleared by then and the
    /// reader stays usable.
    pub fn poll_frame(&mut self) -> Result<Option<Bytes>> {
        loop {
            if let Some(body) = self.buffer.next_frame() {
                return Ok(Some(body));
            }

            if self.buffer.is_full() {
                let capacity = self.buffer.capacity();
                self.buffer.clear();
                warn!(capacity, "frame buffer overflow, discarding buffered bytes");
                return Err(FrameError::BufferOverflow { capacity });
            }

            if self.channel.bytes_available() == 0 {
                return Ok(None);
            }

            let want = self.buffer.room().min(self.scratch.len());
            let read = match self.channel.read_into(&mut self.scratch[..want]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(err) => return Err(FrameError::Io(err)),
            };
            if read == 0 {
                return Ok(None);
            }

            self.buffer.extend(&self.scratch[..read]);
        }
    }

    /// Drop buffered bytes and any input still held by the channel.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.channel.reset_input();
    }

    /// Remove and return buffered bytes that have not formed a frame yet.
    pub fn take_buffered(&mut self) -> BytesMut {
        self.buffer.take()
    }

    /// Number of bytes waiting for a terminator.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &C {
        &self.channel
    }

    /// Consume the reader and return the channel.
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
