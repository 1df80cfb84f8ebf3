use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::cobs;
use crate::crc;
use crate::error::{FrameError, Result};

/// Byte that ends every frame on the wire.
pub const TERMINATOR: u8 = 0x00;

/// Default accumulation buffer capacity in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Default number of bytes pulled from a channel per read.
pub const DEFAULT_READ_CHUNK: usize = 64;

/// Configuration for frame encoding and the inbound accumulation buffer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum bytes held while waiting for a terminator. Default: 1 KiB.
    pub buffer_capacity: usize,
    /// Bytes read from the channel per poll. Default: 64.
    pub read_chunk_size: usize,
    /// Largest encoded frame, terminator included, that may be sent.
    /// Default: the buffer capacity, so a peer with the same settings can
    /// always hold a whole frame.
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            read_chunk_size: DEFAULT_READ_CHUNK,
            max_frame_size: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Upper bound on the wire size of a frame carrying `body_len` bytes.
pub const fn max_wire_len(body_len: usize) -> usize {
    cobs::max_encoded_len(body_len + 1) + 1
}

/// Append one complete frame for `body` to `dst`.
///
/// Wire format:
/// ```text
/// COBS( body ‖ CRC-8(body) ) ‖ 0x00
/// ```
///
/// Returns the number of bytes appended.
pub fn encode_frame(body: &[u8], dst: &mut BytesMut) -> usize {
    let start = dst.len();
    let mut raw = BytesMut::with_capacity(body.len() + 1);
    raw.put_slice(body);
    raw.put_u8(crc::compute(body));

    cobs::encode_into(&raw, dst);
    dst.put_u8(TERMINATOR);
    dst.len() - start
}

/// Encode `body` as a standalone frame, rejecting frames above `max`.
pub fn encode_frame_bounded(body: &[u8], max: usize) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(max_wire_len(body.len()));
    let size = encode_frame(body, &mut dst);
    if size > max {
        return Err(FrameError::FrameTooLarge { size, max });
    }
    Ok(dst.freeze())
}

/// Recover the verified body from one encoded segment (terminator excluded).
pub fn decode_frame(encoded: &[u8]) -> Result<Bytes> {
    let mut raw = cobs::decode(encoded)?;
    let body_len = crc::verify(&raw)?.len();
    raw.truncate(body_len);
    Ok(Bytes::from(raw))
}

/// Take the next valid frame body out of `src`.
///
/// Consumes every terminated segment up to and including the first one that
/// decodes and verifies. Segments failing COBS or CRC are dropped. Bytes
/// after the last terminator stay in `src` for the next call.
pub fn take_frame(src: &mut BytesMut) -> Option<Bytes> {
    while let Some(pos) = src.iter().position(|&b| b == TERMINATOR) {
        let segment = src.split_to(pos + 1);
        let encoded = &segment[..pos];
        if encoded.is_empty() {
            continue;
        }

        match decode_frame(encoded) {
            Ok(body) => return Some(body),
            Err(err) => debug!(error = %err, len = encoded.len(), "discarding invalid frame"),
        }
    }
    None
}

#[cfg(feature = "async")]
pub use self::async_codec::FrameCodec;

#[cfg(feature = "async")]
mod async_codec {
    use bytes::{Bytes, BytesMut};
    use tokio_util::codec::{Decoder, Encoder};
    use tracing::warn;

    use super::{encode_frame, take_frame, FrameConfig};
    use crate::error::FrameError;

    /// `tokio_util` codec yielding verified frame bodies.
    ///
    /// Invalid segments are skipped silently. Filling the buffer capacity
    /// without a terminator clears the buffer and yields
    /// [`FrameError::BufferOverflow`].
    #[derive(Debug, Clone, Default)]
    pub struct FrameCodec {
        config: FrameConfig,
    }

    impl FrameCodec {
        pub fn new(config: FrameConfig) -> Self {
            Self { config }
        }

        pub fn config(&self) -> &FrameConfig {
            &self.config
        }
    }

    impl Decoder for FrameCodec {
        type Item = Bytes;
        type Error = FrameError;

        fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, FrameError> {
            if let Some(body) = take_frame(src) {
                return Ok(Some(body));
            }
            if !src.is_empty() && src.len() >= self.config.buffer_capacity {
                let capacity = self.config.buffer_capacity;
                src.clear();
                warn!(capacity, "frame buffer overflow, discarding buffered bytes");
                return Err(FrameError::BufferOverflow { capacity });
            }
            Ok(None)
        }
    }

    impl Encoder<Bytes> for FrameCodec {
        type Error = FrameError;

        fn encode(&mut self, body: Bytes, dst: &mut BytesMut) -> Result<(), FrameError> {
            let start = dst.len();
            let size = encode_frame(&body, dst);
            let max = self.config.max_frame_size;
            if size > max {
                dst.truncate(start);
                return Err(FrameError::FrameTooLarge { size, max });
            }
            Ok(())
        }
    }
}
