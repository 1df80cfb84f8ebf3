use std::io::ErrorKind;

use daisylink_channel::Channel;

use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};

/// Writes already-framed bytes to a [`Channel`] without blocking.
///
/// The owner of a `FrameWriter` is expected to be the only code writing to
/// its channel; two writers on one channel can interleave frame bytes.
/// Callers drive partial writes themselves, yielding whenever
/// [`try_write`](FrameWriter::try_write) reports the channel is full.
pub struct FrameWriter<C> {
    channel: C,
    config: FrameConfig,
}

impl<C: Channel> FrameWriter<C> {
    /// Create a new frame writer with default configuration.
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(channel: C, config: FrameConfig) -> Self {
        Self { channel, config }
    }

    /// Make one write attempt.
    ///
    /// Returns `Ok(None)` when the channel cannot take bytes right now.
    pub fn try_write(&mut self, data: &[u8]) -> Result<Option<usize>> {
        loop {
            match self.channel.write(data) {
                Ok(0) if !data.is_empty() => return Err(FrameError::ConnectionClosed),
                Ok(n) => return Ok(Some(n)),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Flush the underlying channel.
    ///
    /// A channel that cannot flush right now counts as flushed; its bytes
    /// have already been accepted by `write`.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.channel.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &C {
        &self.channel
    }

    /// Consume the writer and return the channel.
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
