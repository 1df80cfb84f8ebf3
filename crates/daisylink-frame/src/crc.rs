//! CRC-8 (polynomial 0x07, init 0x00, MSB first, no final XOR).

use crate::error::{FrameError, Result};

/// Generator polynomial, x^8 + x^2 + x + 1.
pub const POLYNOMIAL: u8 = 0x07;

const INITIAL: u8 = 0x00;

static TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the checksum of `data`.
pub fn compute(data: &[u8]) -> u8 {
    data.iter()
        .fold(INITIAL, |crc, &byte| TABLE[usize::from(crc ^ byte)])
}

/// Check the trailing checksum byte of `data`.
///
/// Returns the bytes preceding the checksum when it matches.
pub fn verify(data: &[u8]) -> Result<&[u8]> {
    let Some((&received, body)) = data.split_last() else {
        return Err(FrameError::EmptyFrame);
    };
    let computed = compute(body);
    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }
    Ok(body)
}
