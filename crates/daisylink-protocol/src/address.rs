use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};

use crate::error::{DecodeError, EncodeError};

/// First-byte values at or above this are single-byte class addresses;
/// smaller values begin a two-byte device address.
pub const MAX_INDEX_VALUE: u8 = 100;

/// Wire value addressing every unit on the chain.
pub const BROADCAST: u8 = 0xFF;

/// Wire value addressing every satellite.
pub const SATELLITES: u8 = 0xFE;

/// Wire value addressing every driver unit.
pub const DRIVERS: u8 = 0xFD;

/// Destination of a message.
///
/// Textual forms: `ALL`, `SAT`, `DRIV`, `C<hex>` for other classes, and
/// four decimal digits `TTII` (type, index) for a single device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// Every unit.
    Broadcast,
    /// Every unit of one hardware class. Holds the wire byte, which must be
    /// at least [`MAX_INDEX_VALUE`] and below [`BROADCAST`].
    BroadcastClass(u8),
    /// One unit, by hardware type and position index. Both below
    /// [`MAX_INDEX_VALUE`].
    Device { type_id: u8, index: u8 },
}

impl Address {
    /// The master unit.
    pub const CORE: Address = Address::Device {
        type_id: 0,
        index: 0,
    };

    /// All satellites.
    pub const SAT: Address = Address::BroadcastClass(SATELLITES);

    /// All drivers.
    pub const DRIV: Address = Address::BroadcastClass(DRIVERS);

    /// Build a device address, checking both parts fit the textual form.
    pub fn device(type_id: u8, index: u8) -> Result<Self, EncodeError> {
        let address = Address::Device { type_id, index };
        address.validate()?;
        Ok(address)
    }

    /// Build a class address from its wire byte.
    pub fn class(code: u8) -> Result<Self, EncodeError> {
        let address = if code == BROADCAST {
            Address::Broadcast
        } else {
            Address::BroadcastClass(code)
        };
        address.validate()?;
        Ok(address)
    }

    /// Check the address can be put on the wire unambiguously.
    pub fn validate(&self) -> Result<(), EncodeError> {
        match *self {
            Address::Broadcast => Ok(()),
            Address::BroadcastClass(code) if (MAX_INDEX_VALUE..BROADCAST).contains(&code) => Ok(()),
            Address::BroadcastClass(code) => Err(EncodeError::InvalidAddress(format!(
                "class code {code:#04x} outside {MAX_INDEX_VALUE}..{BROADCAST}"
            ))),
            Address::Device { type_id, index }
                if type_id < MAX_INDEX_VALUE && index < MAX_INDEX_VALUE =>
            {
                Ok(())
            }
            Address::Device { type_id, index } => Err(EncodeError::InvalidAddress(format!(
                "device {type_id}/{index} exceeds {}",
                MAX_INDEX_VALUE - 1
            ))),
        }
    }

    /// Number of bytes this address occupies on the wire.
    pub fn wire_len(&self) -> usize {
        match self {
            Address::Broadcast | Address::BroadcastClass(_) => 1,
            Address::Device { .. } => 2,
        }
    }

    /// True when the address targets more than one unit.
    pub fn is_broadcast(&self) -> bool {
        !matches!(self, Address::Device { .. })
    }

    /// Append the wire form to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<(), EncodeError> {
        self.validate()?;
        match *self {
            Address::Broadcast => dst.put_u8(BROADCAST),
            Address::BroadcastClass(code) => dst.put_u8(code),
            Address::Device { type_id, index } => {
                dst.put_u8(type_id);
                dst.put_u8(index);
            }
        }
        Ok(())
    }

    /// Wire form as a standalone buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut dst = BytesMut::with_capacity(2);
        self.encode(&mut dst)?;
        Ok(dst.to_vec())
    }

    /// Read an address from the front of `src`.
    ///
    /// Returns the address and the number of bytes it used.
    pub fn decode(src: &[u8]) -> Result<(Self, usize), DecodeError> {
        match src {
            [] => Err(DecodeError::TruncatedAddress),
            [BROADCAST, ..] => Ok((Address::Broadcast, 1)),
            [code, ..] if *code >= MAX_INDEX_VALUE => Ok((Address::BroadcastClass(*code), 1)),
            [_] => Err(DecodeError::TruncatedAddress),
            [type_id, index, ..] => Ok((
                Address::Device {
                    type_id: *type_id,
                    index: *index,
                },
                2,
            )),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Address::Broadcast => f.write_str("ALL"),
            Address::BroadcastClass(SATELLITES) => f.write_str("SAT"),
            Address::BroadcastClass(DRIVERS) => f.write_str("DRIV"),
            Address::BroadcastClass(code) => write!(f, "C{code:02X}"),
            Address::Device { type_id, index } => write!(f, "{type_id:02}{index:02}"),
        }
    }
}

impl FromStr for Address {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => return Ok(Address::Broadcast),
            "SAT" => return Ok(Address::SAT),
            "DRIV" => return Ok(Address::DRIV),
            "CORE" => return Ok(Address::CORE),
            _ => {}
        }

        if let Some(hex) = s.strip_prefix('C') {
            if hex.len() == 2 {
                if let Ok(code) = u8::from_str_radix(hex, 16) {
                    return Address::class(code);
                }
            }
        }

        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
            let (type_id, index) = s.split_at(2);
            let type_id = type_id.parse::<u8>().map_err(|_| invalid(s))?;
            let index = index.parse::<u8>().map_err(|_| invalid(s))?;
            return Address::device(type_id, index);
        }

        Err(invalid(s))
    }
}

fn invalid(s: &str) -> EncodeError {
    EncodeError::InvalidAddress(format!("unrecognized destination {s:?}"))
}
