use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use daisylink_channel::Channel;
use daisylink_frame::{encode_frame, max_wire_len, FrameError, FrameReader, FrameWriter};
use daisylink_protocol::{DecodeError, EncodeError, Message, ProtocolConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::relay::{Heartbeat, RelayBridge};
use crate::writer::{SerializedWriter, WriterHandle};

/// Encodes messages and queues them on a transport's writer.
///
/// Cheap to clone; every producer task can hold its own.
#[derive(Debug, Clone)]
pub struct MessageSender {
    writer: WriterHandle,
    protocol: Arc<ProtocolConfig>,
    max_frame_size: usize,
}

impl MessageSender {
    /// Encode `message` into a complete wire frame.
    pub fn encode(&self, message: &Message) -> std::result::Result<Bytes, EncodeError> {
        let mut body = BytesMut::new();
        message.encode_body(&self.protocol, &mut body)?;

        let mut frame = BytesMut::with_capacity(max_wire_len(body.len()));
        let size = encode_frame(&body, &mut frame);
        if size > self.max_frame_size {
            return Err(EncodeError::FrameTooLarge {
                size,
                max: self.max_frame_size,
            });
        }
        Ok(frame.freeze())
    }

    /// Encode and queue `message`, waiting for queue space.
    ///
    /// Only encoding problems are reported. A message sent after the
    /// transport stopped is dropped with a warning.
    pub async fn send(&self, message: &Message) -> std::result::Result<(), EncodeError> {
        let frame = self.encode(message)?;
        if self.writer.enqueue(frame).await.is_err() {
            warn!(command = %message.command, "transport stopped, dropping message");
        }
        Ok(())
    }

    /// Encode and queue `message` without waiting.
    pub fn try_send(&self, message: &Message) -> Result<()> {
        let frame = self.encode(message)?;
        self.writer.try_enqueue(frame)
    }

    /// Protocol tables used for encoding.
    pub fn protocol(&self) -> &Arc<ProtocolConfig> {
        &self.protocol
    }
}

/// Message-level façade over one duplex [`Channel`].
///
/// Owns the channel's single reader and its serialized writer. Dropping the
/// transport stops the writer and every relay attached to it.
pub struct Transport<C: Channel> {
    reader: FrameReader<Arc<C>>,
    writer: SerializedWriter,
    sender: MessageSender,
    config: TransportConfig,
    relays: Vec<JoinHandle<()>>,
    relayed: bool,
    cancel: CancellationToken,
}

impl<C: Channel> Transport<C> {
    /// Create a transport with default settings.
    ///
    /// Must be called inside a tokio runtime; the writer task is spawned
    /// immediately.
    pub fn new(channel: C, protocol: Arc<ProtocolConfig>) -> Self {
        Self::with_config(channel, protocol, TransportConfig::default())
    }

    /// Create a transport with explicit settings.
    pub fn with_config(channel: C, protocol: Arc<ProtocolConfig>, config: TransportConfig) -> Self {
        let channel = Arc::new(channel);
        let cancel = CancellationToken::new();

        let reader = FrameReader::with_config(Arc::clone(&channel), config.frame.clone());
        let writer = SerializedWriter::spawn(
            FrameWriter::with_config(channel, config.frame.clone()),
            config.queue_depth,
            cancel.child_token(),
        );
        let sender = MessageSender {
            writer: writer.handle(),
            protocol,
            max_frame_size: config.frame.max_frame_size,
        };

        Self {
            reader,
            writer,
            sender,
            config,
            relays: Vec::new(),
            relayed: false,
            cancel,
        }
    }

    /// Encode `message` and queue it for transmission.
    ///
    /// Fails only when the message cannot be encoded for its command.
    pub async fn send(&self, message: &Message) -> std::result::Result<(), EncodeError> {
        self.sender.send(message).await
    }

    /// Queue `message` without waiting for queue space.
    pub fn try_send(&self, message: &Message) -> Result<()> {
        self.sender.try_send(message)
    }

    /// A cloneable handle for other producer tasks.
    pub fn sender(&self) -> MessageSender {
        self.sender.clone()
    }

    /// Return the next valid inbound message, if any.
    ///
    /// Never blocks. Corrupted frames, unknown commands and undecodable
    /// payloads are skipped; a buffer overflow is logged and reported as
    /// `None`.
    pub fn receive(&mut self) -> Option<Message> {
        match self.try_receive() {
            Ok(message) => message,
            Err(TransportError::Frame(FrameError::BufferOverflow { .. })) => None,
            Err(err) => {
                warn!(error = %err, "receive failed");
                None
            }
        }
    }

    /// Like [`receive`](Transport::receive) but reports buffer overflow and
    /// channel read errors.
    pub fn try_receive(&mut self) -> Result<Option<Message>> {
        if self.relayed {
            return Ok(None);
        }

        while let Some(body) = self.reader.poll_frame()? {
            match Message::decode_body(&body, self.sender.protocol()) {
                Ok(message) => return Ok(Some(message)),
                Err(DecodeError::UnknownCommand(code)) => {
                    warn!("dropping frame with unknown command {code:#04x}");
                }
                Err(err) => warn!(error = %err, len = body.len(), "dropping undecodable frame"),
            }
        }
        Ok(None)
    }

    /// Wait for the next message, polling the channel at the configured
    /// interval. Returns `None` once the transport is stopped.
    pub async fn recv(&mut self) -> Option<Message> {
        loop {
            if let Some(message) = self.receive() {
                return Some(message);
            }
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// Discard buffered inbound bytes and reset the channel's input, to
    /// resynchronise after a desynchronisation.
    pub fn clear_buffer(&mut self) {
        debug!(discarded = self.reader.buffered_len(), "clearing receive buffer");
        self.reader.clear();
    }

    /// Forward everything `source` receives into this transport's writer.
    ///
    /// From then on `source` no longer yields messages from
    /// [`receive`](Transport::receive); it can still send.
    pub fn attach_relay<S: Channel>(&mut self, source: &mut Transport<S>) {
        self.spawn_relay(source, None);
    }

    /// Like [`attach_relay`](Transport::attach_relay), calling `heartbeat`
    /// on every relay loop iteration.
    pub fn attach_relay_with_heartbeat<S, F>(&mut self, source: &mut Transport<S>, heartbeat: F)
    where
        S: Channel,
        F: FnMut() + Send + 'static,
    {
        self.spawn_relay(source, Some(Box::new(heartbeat)));
    }

    fn spawn_relay<S: Channel>(&mut self, source: &mut Transport<S>, heartbeat: Option<Heartbeat>) {
        if source.relayed {
            warn!("source transport is already relayed");
        }
        source.relayed = true;

        let mut bridge = RelayBridge::new(
            Arc::clone(source.reader.get_ref()),
            self.writer.handle(),
            &self.config,
        )
        .with_backlog(source.reader.take_buffered());
        if let Some(heartbeat) = heartbeat {
            bridge = bridge.with_heartbeat(heartbeat);
        }

        self.relays.retain(|task| !task.is_finished());
        self.relays
            .push(tokio::spawn(bridge.run(self.cancel.child_token())));
    }

    /// True when this transport's input is forwarded by a relay.
    pub fn is_relayed(&self) -> bool {
        self.relayed
    }

    /// Borrow the underlying channel.
    pub fn channel(&self) -> &C {
        self.reader.get_ref()
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Stop the writer and relay tasks. Queued frames are dropped.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop and wait for every task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in self.relays.drain(..) {
            if let Err(err) = task.await {
                warn!(error = %err, "relay task panicked");
            }
        }
        self.writer.wait().await;
    }
}

impl<C: Channel> Drop for Transport<C> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
