//! Message transport over a daisy-chained serial link.
//!
//! A [`Transport`] owns one duplex [`Channel`](daisylink_channel::Channel):
//! - inbound bytes are reassembled into frames and decoded into messages
//! - outbound messages are encoded and handed to a single writer task
//! - an attached [`RelayBridge`] forwards another channel's raw input into
//!   the same writer, so local and relayed frames never interleave
//!
//! Everything runs on tokio; the writer and relay tasks are spawned on the
//! current runtime.

pub mod config;
pub mod error;
pub mod relay;
pub mod transport;
pub mod writer;

pub use config::{
    TransportConfig, DEFAULT_QUEUE_DEPTH, DEFAULT_RELAY_CHUNK, DEFAULT_RELAY_POLL_INTERVAL,
};
pub use error::{Result, TransportError};
pub use relay::{Heartbeat, RelayBridge};
pub use transport::{MessageSender, Transport};
pub use writer::{SerializedWriter, WriterHandle};
