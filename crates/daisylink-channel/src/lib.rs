//! Byte-stream duplex channel abstraction.
//!
//! This is the lowest layer of daisylink. A [`Channel`] is one physical link
//! to a neighbouring unit (typically a UART). Everything above it only needs
//! four non-blocking operations: query pending bytes, read, write, and reset
//! the inbound side.
//!
//! Host-side implementations are provided for tests and emulation:
//! - [`MemoryChannel`]: an in-process pipe pair
//! - [`UnixChannel`]: a non-blocking Unix socket pair (Unix only)

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{ChannelError, Result};
pub use memory::MemoryChannel;
pub use traits::Channel;

#[cfg(unix)]
pub use uds::UnixChannel;
