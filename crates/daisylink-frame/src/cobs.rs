//! Consistent Overhead Byte Stuffing.
//!
//! The encoded form never contains `0x00`, which frees that value to act as
//! the frame terminator on the wire. Each block starts with a code byte `n`
//! followed by `n - 1` data bytes; a code below `0xFF` implies a zero after
//! its block unless the block ends the buffer.

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Largest code byte; a block carrying 254 data bytes and no implied zero.
const MAX_CODE: u8 = 0xFF;

/// Worst-case encoded length for `len` input bytes.
pub const fn max_encoded_len(len: usize) -> usize {
    len + len / 254 + 1
}

/// Encode `data` into a new buffer.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = BytesMut::with_capacity(max_encoded_len(data.len()));
    encode_into(data, &mut out);
    out.to_vec()
}

/// Encode `data`, appending the result to `dst`.
///
/// The empty input encodes to the single code byte `0x01`.
pub fn encode_into(data: &[u8], dst: &mut BytesMut) {
    dst.reserve(max_encoded_len(data.len()));

    let mut code_idx = dst.len();
    let mut code: u8 = 0x01;
    dst.put_u8(0);

    for &byte in data {
        if byte == 0 {
            dst[code_idx] = code;
            code_idx = dst.len();
            dst.put_u8(0);
            code = 0x01;
            continue;
        }

        dst.put_u8(byte);
        code += 1;
        if code == MAX_CODE {
            dst[code_idx] = code;
            code_idx = dst.len();
            dst.put_u8(0);
            code = 0x01;
        }
    }

    dst[code_idx] = code;
}

/// Decode one COBS block chain (without its terminator).
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    decode_into(data, &mut out)?;
    Ok(out)
}

/// Decode `data`, appending the recovered bytes to `dst`.
///
/// On error `dst` may hold a partial result.
pub fn decode_into(data: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    if data.is_empty() {
        return Err(FrameError::Framing("empty input"));
    }
    if data.contains(&0) {
        return Err(FrameError::Framing("unexpected 0x00 inside encoded data"));
    }

    let mut idx = 0;
    while idx < data.len() {
        let code = data[idx];
        idx += 1;

        let end = idx + usize::from(code) - 1;
        if end > data.len() {
            return Err(FrameError::Framing("code byte points past end of data"));
        }
        dst.extend_from_slice(&data[idx..end]);
        idx = end;

        if code < MAX_CODE && idx < data.len() {
            dst.push(0);
        }
    }

    Ok(())
}
