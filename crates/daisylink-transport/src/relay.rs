use std::io::ErrorKind;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use daisylink_channel::Channel;
use daisylink_frame::TERMINATOR;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use crate::config::TransportConfig;
use crate::writer::WriterHandle;

/// Callback run on every relay loop iteration.
pub type Heartbeat = Box<dyn FnMut() + Send + 'static>;

/// Copies raw inbound bytes from one channel into another transport's
/// writer queue without decoding them.
pub struct RelayBridge<S> {
    source: S,
    sink: WriterHandle,
    pending: BytesMut,
    chunk: Vec<u8>,
    poll_interval: Duration,
    frame_aligned: bool,
    max_pending: usize,
    heartbeat: Option<Heartbeat>,
}

impl<S: Channel> RelayBridge<S> {
    pub fn new(source: S, sink: WriterHandle, config: &TransportConfig) -> Self {
        Self {
            source,
            sink,
            pending: BytesMut::new(),
            chunk: vec![0u8; config.relay_chunk_size.max(1)],
            poll_interval: config.poll_interval,
            frame_aligned: config.relay_frame_aligned,
            max_pending: config.relay_max_pending,
            heartbeat: None,
        }
    }

    /// Run `heartbeat` on every loop iteration.
    pub fn with_heartbeat(mut self, heartbeat: Heartbeat) -> Self {
        self.heartbeat = Some(heartbeat);
        self
    }

    /// Bytes received on the source before the bridge took over.
    pub fn with_backlog(mut self, backlog: BytesMut) -> Self {
        self.pending = backlog;
        self
    }

    /// Relay until `cancel` fires or the sink closes.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(frame_aligned = self.frame_aligned, "relay task started");
        if !self.pending.is_empty() && !self.flush_pending(&cancel).await {
            info!("relay task stopped");
            return;
        }

        while !cancel.is_cancelled() {
            if let Some(heartbeat) = self.heartbeat.as_mut() {
                heartbeat();
            }

            let read = match self.poll_source() {
                Ok(n) => n,
                Err(err) => {
                    warn!(error = %err, "relay source read failed");
                    0
                }
            };
            if read == 0 {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.poll_interval) => continue,
                }
            }

            trace!(len = read, "relaying chunk");
            self.pending.extend_from_slice(&self.chunk[..read]);
            if !self.flush_pending(&cancel).await {
                break;
            }
        }
        info!("relay task stopped");
    }

    fn poll_source(&mut self) -> std::io::Result<usize> {
        let available = self.source.bytes_available();
        if available == 0 {
            return Ok(0);
        }
        let want = available.min(self.chunk.len());
        loop {
            match self.source.read_into(&mut self.chunk[..want]) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(0),
                Err(err) => return Err(err),
            }
        }
    }

    /// Hand pending bytes to the sink.
    ///
    /// Frame-aligned bridges only release data up to the last terminator
    /// unless more than `max_pending` bytes are held. Returns false when the
    /// relay should stop.
    async fn flush_pending(&mut self, cancel: &CancellationToken) -> bool {
        let ready = if !self.frame_aligned {
            self.pending.split().freeze()
        } else if let Some(end) = self.pending.iter().rposition(|&b| b == TERMINATOR) {
            self.pending.split_to(end + 1).freeze()
        } else if self.pending.len() > self.max_pending {
            warn!(
                len = self.pending.len(),
                "relay data without terminator, forwarding unaligned"
            );
            self.pending.split().freeze()
        } else {
            return true;
        };

        forward(&self.sink, ready, cancel).await
    }
}

async fn forward(sink: &WriterHandle, data: Bytes, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = sink.enqueue(data) => match sent {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "relay sink closed");
                false
            }
        },
    }
}
