use std::time::Duration;

use daisylink_frame::FrameConfig;

/// Default number of frames waiting for the writer task.
pub const DEFAULT_QUEUE_DEPTH: usize = 32;

/// Default bytes moved per relay read.
pub const DEFAULT_RELAY_CHUNK: usize = 64;

/// Default sleep between relay polls of an idle channel.
pub const DEFAULT_RELAY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Transport-level settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Framing and accumulation buffer settings.
    pub frame: FrameConfig,
    /// Capacity of the serialized writer queue. Default: 32.
    pub queue_depth: usize,
    /// Bytes read from a relay source per poll. Default: 64.
    pub relay_chunk_size: usize,
    /// Idle sleep of relay tasks and [`Transport::recv`](crate::Transport::recv).
    /// Default: 1 ms.
    pub poll_interval: Duration,
    /// Cut relayed data at frame terminators before enqueueing, so relayed
    /// and local frames never splice on the wire. Default: true.
    pub relay_frame_aligned: bool,
    /// Unterminated relay bytes held before they are forwarded as-is.
    /// Default: the frame buffer capacity.
    pub relay_max_pending: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        let frame = FrameConfig::default();
        Self {
            relay_max_pending: frame.buffer_capacity,
            frame,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            relay_chunk_size: DEFAULT_RELAY_CHUNK,
            poll_interval: DEFAULT_RELAY_POLL_INTERVAL,
            relay_frame_aligned: true,
        }
    }
}
