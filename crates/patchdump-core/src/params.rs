//! Scalar parameter codecs.
//!
//! Every per-field conversion in the system funnels through this module so
//! sign handling is decided in exactly one place. The offset-64 form is the
//! classic trap: raw 64 means value 0, not -64 as a two's-complement
//! reading would suggest, and historically each call site converting by
//! hand is how garbled parameters shipped. Encode validates against the
//! declared range and fails; it never wraps or truncates.

use thiserror::Error;

/// A value rejected by an encode-side range check.
///
/// The schema mapper wraps this with the field's section and name before
/// surfacing it to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value {value} outside declared range {min}..={max}")]
pub struct RangeError {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

fn check(value: i64, min: i64, max: i64) -> Result<(), RangeError> {
    if value < min || value > max {
        return Err(RangeError { value, min, max });
    }
    Ok(())
}

/// Decode a plain unsigned byte.
pub fn decode_unsigned(raw: u8) -> i64 {
    i64::from(raw)
}

/// Encode a plain unsigned byte, validating `0..=max`.
pub fn encode_unsigned(value: i64, max: u8) -> Result<u8, RangeError> {
    check(value, 0, i64::from(max))?;
    Ok(value as u8)
}

/// Decode a center-biased signed byte: raw 64 is value 0.
///
/// Decode is total over the 7-bit range; stored values outside a field's
/// documented range occur in hardware dumps and are surfaced as-is.
///
/// # Examples
/// ```
/// use patchdump_core::decode_offset64;
///
/// assert_eq!(decode_offset64(0), -64);
/// assert_eq!(decode_offset64(64), 0);
/// assert_eq!(decode_offset64(127), 63);
/// ```
pub fn decode_offset64(raw: u8) -> i64 {
    i64::from(raw & 0x7F) - 64
}

/// Encode a center-biased signed byte: value 0 becomes raw 64.
///
/// # Examples
/// ```
/// use patchdump_core::encode_offset64;
///
/// assert_eq!(encode_offset64(0, -64, 63), Ok(64));
/// assert_eq!(encode_offset64(12, -24, 24), Ok(76));
/// ```
pub fn encode_offset64(value: i64, min: i64, max: i64) -> Result<u8, RangeError> {
    check(value, min, max)?;
    Ok((value + 64) as u8)
}

/// Read a bit group: `(byte >> shift) & mask`.
pub fn read_bits(byte: u8, shift: u8, mask: u8) -> u8 {
    (byte >> shift) & mask
}

/// Write a bit group, preserving every bit outside `mask << shift`.
///
/// Co-located fields share a byte, so writes must be read-modify-write;
/// a blind store would clobber the neighbouring field.
pub fn write_bits(byte: &mut u8, shift: u8, mask: u8, value: u8) {
    *byte = (*byte & !(mask << shift)) | ((value & mask) << shift);
}

/// Compose a 16-bit big-endian value from two bytes.
pub fn decode_be16(msb: u8, lsb: u8) -> i64 {
    (i64::from(msb) << 8) | i64::from(lsb)
}

/// Split a 16-bit big-endian value into two bytes, validating `0..=max`.
pub fn encode_be16(value: i64, max: u16) -> Result<[u8; 2], RangeError> {
    check(value, 0, i64::from(max))?;
    Ok([(value >> 8) as u8, value as u8])
}
