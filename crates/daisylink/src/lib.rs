//! COBS-framed messaging for daisy-chained serial devices.
//!
//! daisylink carries small addressed commands over byte-stream links such
//! as UART chains, where each node may forward traffic from the next one.
//!
//! # Crate Structure
//!
//! - [`channel`]: the duplex byte channel a transport runs over
//! - [`frame`]: CRC-8 and COBS framing, accumulation buffer
//! - [`protocol`]: addresses, command and schema tables, message bodies
//! - [`transport`]: serialized writer, relay bridge, transport façade
//!
//! The most common types are re-exported at the crate root.

/// Re-export channel types.
pub mod channel {
    pub use daisylink_channel::*;
}

/// Re-export frame types.
pub mod frame {
    pub use daisylink_frame::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use daisylink_protocol::*;
}

/// Re-export transport types.
pub mod transport {
    pub use daisylink_transport::*;
}

#[cfg(feature = "logging")]
pub mod logging;

pub use daisylink_channel::{Channel, MemoryChannel};
pub use daisylink_protocol::{names, Address, Message, PayloadValue, ProtocolConfig};
pub use daisylink_transport::{MessageSender, Transport, TransportConfig};
