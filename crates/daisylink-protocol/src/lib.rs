//! Message model for the daisylink chain protocol.
//!
//! A frame body is `DEST ‖ CMD ‖ PAYLOAD`:
//! - `DEST` is one byte for broadcast and class addresses, two for a device
//! - `CMD` is one byte looked up in a [`CommandTable`]
//! - `PAYLOAD` is laid out according to the command's [`Schema`], or by a
//!   lossy heuristic when the command has none
//!
//! Framing and integrity checks live in `daisylink-frame`.

pub mod address;
pub mod command;
pub mod config;
pub mod error;
pub mod message;
pub mod payload;
pub mod schema;

pub use address::{Address, BROADCAST, DRIVERS, MAX_INDEX_VALUE, SATELLITES};
pub use command::{names, CommandTable, STANDARD_COMMANDS};
pub use config::ProtocolConfig;
pub use error::{ConfigError, DecodeError, EncodeError};
pub use message::Message;
pub use payload::{decode_payload, encode_payload, PayloadValue};
pub use schema::{EncodingKind, Schema, SchemaTable};
