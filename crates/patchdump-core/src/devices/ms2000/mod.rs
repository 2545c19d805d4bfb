//! Korg MS2000 program dump codec.
//!
//! Wire shape: `F0 42 3n 58 fn body F7`, no checksum, body 7-bit packed
//! with the high bit of source byte `j` stored at bit `6 - j` of the
//! group's high-bits byte. Function 0x40 carries the current program,
//! 0x4C the whole 128-slot bank as one message.

use std::sync::OnceLock;

use log::{debug, info};

use crate::framing::{FramingError, MessageHeader, build_korg, parse_korg, split_messages};
use crate::schema::{Encoding, PatchSchema, SchemaError, ValidationError};
use crate::transcode::{BitOrder, pack_7bit, unpack_7bit};
use crate::{Bank, CodecError, DecodedPatch};

pub mod layout;
mod schema;

pub use layout::{BANK_CAPACITY, DEVICE_ID, PATCH_SIZE, voice_mode_name};

/// The shared MS2000 program schema.
pub fn schema() -> &'static PatchSchema {
    static SCHEMA: OnceLock<PatchSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        PatchSchema::new("ms2000", layout::PATCH_SIZE, schema::specs())
            .expect("ms2000 parameter table is consistent")
    })
}

/// Decode a SysEx byte stream into a bank of programs.
///
/// Accepts current-program dumps (one record each) and bank dumps (128
/// records in one message); a trailing partial record after unpacking is
/// transport padding and is dropped.
pub fn decode_sysex(stream: &[u8]) -> Result<Bank, CodecError> {
    let mut patches = Vec::new();
    for message in split_messages(stream)? {
        let parsed = parse_korg(message, layout::DEVICE_ID)?;
        let MessageHeader::Korg { function, .. } = parsed.header else {
            continue;
        };
        if function != layout::FUNC_CURRENT_PROGRAM && function != layout::FUNC_PROGRAM_DATA {
            return Err(FramingError::HeaderMismatch {
                field: "function id",
                offset: 4,
                expected: layout::FUNC_PROGRAM_DATA,
                actual: function,
            }
            .into());
        }

        let unpacked = unpack_7bit(&parsed.body, BitOrder::Descending);
        let records = unpacked.chunks_exact(layout::PATCH_SIZE);
        if !records.remainder().is_empty() {
            debug!(
                "ms2000: dropping {}-byte partial trailing record",
                records.remainder().len()
            );
        }
        for record in records {
            patches.push(schema().decode(record)?);
        }
    }
    Ok(Bank {
        device: "ms2000".to_string(),
        patches,
    })
}

/// Encode a bank as a single program data dump message.
///
/// Banks shorter than 128 slots are padded with init programs so the
/// message always carries the full capacity.
pub fn encode_bank(bank: &Bank, channel: u8) -> Result<Vec<u8>, CodecError> {
    if bank.patches.len() > layout::BANK_CAPACITY {
        return Err(ValidationError::BankCapacity {
            capacity: layout::BANK_CAPACITY,
            actual: bank.patches.len(),
        }
        .into());
    }

    let mut raw = Vec::with_capacity(layout::BANK_CAPACITY * layout::PATCH_SIZE);
    for patch in &bank.patches {
        raw.extend_from_slice(&schema().encode(patch)?);
    }
    let missing = layout::BANK_CAPACITY - bank.patches.len();
    if missing > 0 {
        info!("ms2000: padding bank with {missing} init programs");
        let init = init_record();
        for _ in 0..missing {
            raw.extend_from_slice(&init);
        }
    }

    let body = pack_7bit(&raw, BitOrder::Descending);
    Ok(build_korg(
        channel,
        layout::DEVICE_ID,
        layout::FUNC_PROGRAM_DATA,
        &body,
    ))
}

/// Encode one patch as a current program data dump message.
pub fn encode_program(patch: &DecodedPatch, channel: u8) -> Result<Vec<u8>, CodecError> {
    let record = schema().encode(patch)?;
    let body = pack_7bit(&record, BitOrder::Descending);
    Ok(build_korg(
        channel,
        layout::DEVICE_ID,
        layout::FUNC_CURRENT_PROGRAM,
        &body,
    ))
}

/// The init program record. Not all-zeros: center-biased fields sit at
/// their raw midpoint of 64 (a zero byte there would decode to -64,
/// outside narrow ranges like the +/-24 semitone field, leaving a record
/// that cannot re-encode) and text fields at their space padding, so the
/// record is a fixed point of decode-then-encode.
fn init_record() -> Vec<u8> {
    let mut record = vec![0u8; layout::PATCH_SIZE];
    for spec in schema().specs() {
        match spec.encoding {
            Encoding::Offset64 { .. } => record[spec.offset] = 64,
            Encoding::Ascii { len } => record[spec.offset..spec.offset + len].fill(b' '),
            _ => {}
        }
    }
    record
}

/// An init program: the init record, decoded.
pub fn blank_patch() -> Result<DecodedPatch, SchemaError> {
    schema().decode(&init_record())
}

/// Bank slot label for a 1-based position: `A01` through `H16`.
pub fn slot_name(position: usize) -> Option<String> {
    if !(1..=layout::BANK_CAPACITY).contains(&position) {
        return None;
    }
    let slot = position - 1;
    let bank = char::from(b'A' + (slot / 16) as u8);
    Some(format!("{bank}{:02}", slot % 16 + 1))
}
