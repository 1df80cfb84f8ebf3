//! Zero-delimited framing for byte-stream links.
//!
//! Every frame on the wire is:
//! - the frame body followed by a CRC-8 of that body
//! - passed through COBS so it contains no `0x00` byte
//! - terminated by a single `0x00`
//!
//! Inbound bytes accumulate in a bounded buffer; corrupted segments are
//! dropped and the scan resumes at the next terminator.

pub mod buffer;
pub mod cobs;
pub mod codec;
pub mod crc;
pub mod error;
pub mod reader;
pub mod writer;

pub use buffer::FrameBuffer;
#[cfg(feature = "async")]
pub use codec::FrameCodec;
pub use codec::{
    decode_frame, encode_frame, encode_frame_bounded, max_wire_len, take_frame, FrameConfig,
    DEFAULT_BUFFER_CAPACITY, DEFAULT_READ_CHUNK, TERMINATOR,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
