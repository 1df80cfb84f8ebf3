use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::address::Address;
use crate::config::ProtocolConfig;
use crate::error::{DecodeError, EncodeError};
use crate::payload::{decode_payload, encode_payload, PayloadValue};

/// One logical command exchanged with application code.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub destination: Address,
    pub command: String,
    pub payload: PayloadValue,
}

impl Message {
    pub fn new(
        destination: Address,
        command: impl Into<String>,
        payload: impl Into<PayloadValue>,
    ) -> Self {
        Self {
            destination,
            command: command.into(),
            payload: payload.into(),
        }
    }

    /// Append the frame body `DEST ‖ CMD ‖ PAYLOAD` to `dst`.
    ///
    /// On error `dst` is left as it was.
    pub fn encode_body(&self, config: &ProtocolConfig, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let code = config
            .commands()
            .code(&self.command)
            .ok_or_else(|| EncodeError::UnknownCommand(self.command.clone()))?;

        let start = dst.len();
        let result = self
            .destination
            .encode(dst)
            .and_then(|()| {
                dst.put_u8(code);
                encode_payload(&self.command, &self.payload, config.schema(&self.command), dst)
            });
        if result.is_err() {
            dst.truncate(start);
        }
        result
    }

    /// Frame body as a standalone buffer.
    pub fn to_body(&self, config: &ProtocolConfig) -> Result<Bytes, EncodeError> {
        let mut dst = BytesMut::new();
        self.encode_body(config, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Interpret a verified frame body.
    pub fn decode_body(body: &Bytes, config: &ProtocolConfig) -> Result<Self, DecodeError> {
        let (destination, used) = Address::decode(body)?;
        let code = *body.get(used).ok_or(DecodeError::MissingCommand)?;
        let command = config
            .commands()
            .name(code)
            .ok_or(DecodeError::UnknownCommand(code))?;

        let payload_bytes = body.slice(used + 1..);
        let payload = decode_payload(&payload_bytes, config.schema(command))?;

        Ok(Self {
            destination,
            command: command.to_owned(),
            payload,
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|", self.destination, self.command)?;
        match &self.payload {
            PayloadValue::Text(text) => f.write_str(text),
            PayloadValue::Numbers(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
            PayloadValue::Raw(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}
