//! Payload encoding.
//!
//! With a [`Schema`] the payload layout is fixed by its [`EncodingKind`].
//! Without one a heuristic applies:
//!
//! - encode: `Text` made only of comma-separated decimal groups, each at
//!   most 255, is packed one byte per group; other text is sent as UTF-8.
//!   `Numbers` use the byte layout and `Raw` is sent verbatim.
//! - decode: printable ASCII becomes `Text`, anything else `Numbers` with
//!   one value per byte.
//!
//! The heuristic is lossy. `Text("01")` is sent as the single byte `0x01`
//! and comes back as `Numbers([1.0])`. Commands carrying identifier-like
//! text must be given a `text` schema.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{DecodeError, EncodeError};
use crate::schema::{EncodingKind, Schema};

/// Logical payload of a message.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Text(String),
    Numbers(Vec<f64>),
    Raw(Bytes),
}

impl PayloadValue {
    /// An empty text payload.
    pub fn empty() -> Self {
        PayloadValue::Text(String::new())
    }

    /// Variant name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PayloadValue::Text(_) => "text",
            PayloadValue::Numbers(_) => "numbers",
            PayloadValue::Raw(_) => "raw",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PayloadValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            PayloadValue::Numbers(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            PayloadValue::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<&str> for PayloadValue {
    fn from(text: &str) -> Self {
        PayloadValue::Text(text.to_owned())
    }
}

impl From<String> for PayloadValue {
    fn from(text: String) -> Self {
        PayloadValue::Text(text)
    }
}

impl From<Vec<f64>> for PayloadValue {
    fn from(values: Vec<f64>) -> Self {
        PayloadValue::Numbers(values)
    }
}

impl From<Bytes> for PayloadValue {
    fn from(bytes: Bytes) -> Self {
        PayloadValue::Raw(bytes)
    }
}

/// Append the encoded `value` for `command` to `dst`.
pub fn encode_payload(
    command: &str,
    value: &PayloadValue,
    schema: Option<&Schema>,
    dst: &mut BytesMut,
) -> Result<(), EncodeError> {
    let Some(schema) = schema else {
        return encode_heuristic(value, dst);
    };

    match (schema.kind, value) {
        (EncodingKind::RawText, PayloadValue::Text(text)) => {
            dst.put_slice(text.as_bytes());
            Ok(())
        }
        (EncodingKind::RawBytes, PayloadValue::Raw(bytes)) => {
            dst.put_slice(bytes);
            Ok(())
        }
        (kind, PayloadValue::Numbers(values)) if kind.width().is_some() => {
            if let Some(expected) = schema.count {
                if values.len() != expected {
                    return Err(EncodeError::SchemaCountMismatch {
                        command: command.to_owned(),
                        expected,
                        actual: values.len(),
                    });
                }
            }
            encode_numbers(kind, values, dst)
        }
        (kind, other) => Err(EncodeError::EncodeType {
            command: command.to_owned(),
            expected: expected_variant(kind),
            actual: other.kind_name(),
        }),
    }
}

/// Decode `bytes` into a payload value.
pub fn decode_payload(bytes: &Bytes, schema: Option<&Schema>) -> Result<PayloadValue, DecodeError> {
    let Some(schema) = schema else {
        return Ok(decode_heuristic(bytes));
    };

    match schema.kind {
        EncodingKind::RawText => Ok(PayloadValue::Text(std::str::from_utf8(bytes)?.to_owned())),
        EncodingKind::RawBytes => Ok(PayloadValue::Raw(bytes.clone())),
        EncodingKind::NumericBytes => Ok(PayloadValue::Numbers(
            bytes.iter().map(|&b| f64::from(b)).collect(),
        )),
        EncodingKind::NumericWords => {
            let chunks = exact_chunks::<2>(bytes)?;
            Ok(PayloadValue::Numbers(
                chunks
                    .map(|word| f64::from(i16::from_le_bytes(word)))
                    .collect(),
            ))
        }
        EncodingKind::Floats => {
            let chunks = exact_chunks::<4>(bytes)?;
            Ok(PayloadValue::Numbers(
                chunks
                    .map(|word| f64::from(f32::from_le_bytes(word)))
                    .collect(),
            ))
        }
    }
}

fn expected_variant(kind: EncodingKind) -> &'static str {
    match kind {
        EncodingKind::RawText => "text",
        EncodingKind::RawBytes => "raw",
        EncodingKind::NumericBytes | EncodingKind::NumericWords | EncodingKind::Floats => {
            "numbers"
        }
    }
}

fn exact_chunks<const N: usize>(
    bytes: &[u8],
) -> Result<impl Iterator<Item = [u8; N]> + '_, DecodeError> {
    if bytes.len() % N != 0 {
        return Err(DecodeError::MisalignedPayload {
            len: bytes.len(),
            width: N,
        });
    }
    Ok(bytes.chunks_exact(N).map(|chunk| {
        let mut word = [0u8; N];
        word.copy_from_slice(chunk);
        word
    }))
}

fn encode_numbers(
    kind: EncodingKind,
    values: &[f64],
    dst: &mut BytesMut,
) -> Result<(), EncodeError> {
    let width = kind.width().unwrap_or(1);
    dst.reserve(values.len() * width);

    for &value in values {
        match kind {
            EncodingKind::NumericWords => dst.put_i16_le(to_word(value)?),
            EncodingKind::Floats => dst.put_f32_le(to_float(value)?),
            _ => dst.put_u8(to_byte(value)?),
        }
    }
    Ok(())
}

fn to_byte(value: f64) -> Result<u8, EncodeError> {
    let truncated = value.trunc();
    if !(0.0..=255.0).contains(&truncated) {
        return Err(EncodeError::ValueOutOfRange {
            value,
            kind: EncodingKind::NumericBytes.as_str(),
        });
    }
    Ok(truncated as u8)
}

fn to_word(value: f64) -> Result<i16, EncodeError> {
    let truncated = value.trunc();
    if !(f64::from(i16::MIN)..=f64::from(i16::MAX)).contains(&truncated) {
        return Err(EncodeError::ValueOutOfRange {
            value,
            kind: EncodingKind::NumericWords.as_str(),
        });
    }
    Ok(truncated as i16)
}

fn to_float(value: f64) -> Result<f32, EncodeError> {
    let narrowed = value as f32;
    if !narrowed.is_finite() {
        return Err(EncodeError::ValueOutOfRange {
            value,
            kind: EncodingKind::Floats.as_str(),
        });
    }
    Ok(narrowed)
}

fn encode_heuristic(value: &PayloadValue, dst: &mut BytesMut) -> Result<(), EncodeError> {
    match value {
        PayloadValue::Text(text) => {
            match parse_byte_list(text) {
                Some(bytes) => dst.put_slice(&bytes),
                None => dst.put_slice(text.as_bytes()),
            }
            Ok(())
        }
        PayloadValue::Numbers(values) => encode_numbers(EncodingKind::NumericBytes, values, dst),
        PayloadValue::Raw(bytes) => {
            dst.put_slice(bytes);
            Ok(())
        }
    }
}

/// `"10,20,255"` to `[10, 20, 255]`; `None` unless every group is a
/// decimal number that fits a byte.
fn parse_byte_list(text: &str) -> Option<Vec<u8>> {
    if text.is_empty() {
        return None;
    }
    text.split(',')
        .map(|group| {
            if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            group.parse::<u8>().ok()
        })
        .collect()
}

fn decode_heuristic(bytes: &Bytes) -> PayloadValue {
    let printable = bytes.iter().all(|&b| (0x20..=0x7E).contains(&b));
    if printable {
        let text = bytes.iter().map(|&b| char::from(b)).collect();
        return PayloadValue::Text(text);
    }
    PayloadValue::Numbers(bytes.iter().map(|&b| f64::from(b)).collect())
}
