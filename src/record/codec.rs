//! Record codec
//!
//! Encoding and decoding functions for the on-disk record framing.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, SegKvError};

/// Byte terminating every encoded record
pub const DELIMITER: u8 = 0x00;

/// A decoded record, borrowing its value from the frame it was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// The record key
    pub key: i64,

    /// The record value (everything after the first comma)
    pub value: &'a [u8],
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a key-value pair into its on-disk frame
///
/// Format: `<decimal key> ',' <value> <0x00>`
///
/// Policy: a value containing the delimiter byte is rejected with
/// `DelimiterInValue` rather than escaped — escaping would change the byte
/// span of the stored record and break offset/size bookkeeping.
pub fn encode(key: i64, value: &[u8]) -> Result<Bytes> {
    if value.contains(&DELIMITER) {
        return Err(SegKvError::DelimiterInValue);
    }

    let key_str = key.to_string();

    let mut frame = BytesMut::with_capacity(key_str.len() + 1 + value.len() + 1);
    frame.put_slice(key_str.as_bytes());
    frame.put_u8(b',');
    frame.put_slice(value);
    frame.put_u8(DELIMITER);

    Ok(frame.freeze())
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a record from a frame (delimiter already stripped)
///
/// Splits at the FIRST comma; the prefix must parse as a signed decimal
/// integer. Returns `CorruptRecord` on a missing comma or non-numeric key.
pub fn decode(frame: &[u8]) -> Result<Record<'_>> {
    let comma = frame
        .iter()
        .position(|&b| b == b',')
        .ok_or_else(|| SegKvError::CorruptRecord("missing key/value separator".to_string()))?;

    let key_bytes = &frame[..comma];
    let key_str = std::str::from_utf8(key_bytes).map_err(|_| {
        SegKvError::CorruptRecord(format!("non-UTF-8 key prefix: {:?}", key_bytes))
    })?;

    let key: i64 = key_str.parse().map_err(|_| {
        SegKvError::CorruptRecord(format!("non-numeric key prefix: {:?}", key_str))
    })?;

    Ok(Record {
        key,
        value: &frame[comma + 1..],
    })
}
