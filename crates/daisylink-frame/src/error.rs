/// Errors that can occur while framing or de-framing bytes.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The trailing CRC-8 byte does not match the frame contents.
    #[error("checksum mismatch (computed {computed:#04x}, received {received:#04x})")]
    ChecksumMismatch { computed: u8, received: u8 },

    /// A frame had no bytes at all, so there is no checksum to verify.
    #[error("empty frame")]
    EmptyFrame,

    /// The COBS-encoded data is malformed.
    #[error("malformed COBS data: {0}")]
    Framing(&'static str),

    /// The accumulation buffer filled up without seeing a terminator.
    #[error("receive buffer overflow ({capacity} bytes without a frame terminator)")]
    BufferOverflow { capacity: usize },

    /// An encoded frame would exceed the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// An I/O error occurred on the underlying channel.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel refused further bytes while a frame was being written.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
