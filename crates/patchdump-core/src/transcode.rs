//! Reversible 7-bit packing for the SysEx transport.
//!
//! Devices squeeze 8-bit patch data through the 7-bit-clean body of a
//! SysEx message: every group of 7 raw bytes becomes 8 transport bytes,
//! one byte collecting the stripped high bits followed by the 7 low-7-bit
//! remainders. A final partial group of n bytes emits 1 + n transport
//! bytes; it is never zero-padded, since padding would change the decoded
//! length.

/// Where the high bit of raw byte `j` lands inside the high-bits byte.
///
/// Mismatching the variant corrupts every value with the top bit set
/// without any framing error, so it is part of the device profile rather
/// than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// High bit of byte `j` stored in bit `6 - j` (Korg MS2000 banks).
    Descending,
    /// High bit of byte `j` stored in bit `j`.
    Ascending,
}

impl BitOrder {
    fn bit_for(self, index: usize) -> u8 {
        match self {
            BitOrder::Descending => (6 - index) as u8,
            BitOrder::Ascending => index as u8,
        }
    }
}

/// Pack full-width bytes into the 7-bit-clean transport form.
///
/// # Examples
/// ```
/// use patchdump_core::{BitOrder, pack_7bit, unpack_7bit};
///
/// let raw = vec![0x80, 0x01, 0xFF];
/// let packed = pack_7bit(&raw, BitOrder::Descending);
/// assert!(packed.iter().all(|b| b & 0x80 == 0));
/// assert_eq!(unpack_7bit(&packed, BitOrder::Descending), raw);
/// ```
pub fn pack_7bit(data: &[u8], order: BitOrder) -> Vec<u8> {
    let mut packed = Vec::with_capacity(data.len() + data.len().div_ceil(7));
    for group in data.chunks(7) {
        let mut high_bits = 0u8;
        for (j, byte) in group.iter().enumerate() {
            if byte & 0x80 != 0 {
                high_bits |= 1 << order.bit_for(j);
            }
        }
        packed.push(high_bits);
        packed.extend(group.iter().map(|byte| byte & 0x7F));
    }
    packed
}

/// Unpack the 7-bit-clean transport form back into full-width bytes.
///
/// The algebraic inverse of [`pack_7bit`]: each byte is rebuilt as
/// `(high_bit << 7) | low_7_bits`. A trailing group shorter than 8
/// transport bytes decodes to exactly its remainder count.
pub fn unpack_7bit(data: &[u8], order: BitOrder) -> Vec<u8> {
    let mut unpacked = Vec::with_capacity(data.len().saturating_sub(data.len() / 8));
    for group in data.chunks(8) {
        let Some((&high_bits, rest)) = group.split_first() else {
            continue;
        };
        for (j, byte) in rest.iter().enumerate() {
            let high = (high_bits >> order.bit_for(j)) & 0x01;
            unpacked.push((high << 7) | (byte & 0x7F));
        }
    }
    unpacked
}
