use daisylink_frame::FrameError;
use daisylink_protocol::EncodeError;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Framing or channel I/O failure on the inbound side.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// A message could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The writer task has stopped; nothing more can be sent.
    #[error("writer queue closed")]
    QueueClosed,

    /// The writer queue has no free slot.
    #[error("writer queue full")]
    QueueFull,
}

pub type Result<T> = std::result::Result<T, TransportError>;
