//! Roland JP-8080 patch dump codec.
//!
//! Wire shape: `F0 41 dev 00 06 12 addr[4] body sum F7` (DT1). Bodies are
//! already 7-bit clean, so there is no packing stage; instead one patch
//! usually arrives as two messages, 242 bytes at the patch base address
//! and a 6-byte tail at base + 242. JP-8000 dumps carry 239-byte records
//! in the same envelope and are padded up on decode.

use std::sync::OnceLock;

use log::debug;

use crate::bulk::{reassemble, split_record};
use crate::framing::{MessageHeader, build_roland, parse_roland, split_messages};
use crate::schema::{PatchSchema, SchemaError};
use crate::{Bank, CodecError, DecodedPatch};

pub mod layout;
mod schema;

pub use layout::{
    BANK_CAPACITY, DEFAULT_DEVICE_ID, MODEL_ID, PATCH_SIZE, USER_PATCH_BASE, user_patch_address,
};

/// The shared JP-8080 patch schema.
pub fn schema() -> &'static PatchSchema {
    static SCHEMA: OnceLock<PatchSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        PatchSchema::new("jp8080", layout::PATCH_SIZE, schema::specs())
            .expect("jp8080 parameter table is consistent")
    })
}

/// Decode a SysEx byte stream into a bank of patches.
///
/// Messages are grouped by address continuity: a message whose address is
/// exactly where the previous group left off continues that group, any
/// other address starts a new patch. Each complete group is reassembled
/// into one record and mapped through the schema.
pub fn decode_sysex(stream: &[u8]) -> Result<Bank, CodecError> {
    let mut patches = Vec::new();
    let mut group: Vec<Vec<u8>> = Vec::new();
    let mut group_base = 0u32;
    let mut group_len = 0u32;

    let mut flush = |group: &mut Vec<Vec<u8>>| -> Result<(), CodecError> {
        if group.is_empty() {
            return Ok(());
        }
        let bodies: Vec<&[u8]> = group.iter().map(Vec::as_slice).collect();
        let record = reassemble(&bodies, &layout::TRANSFER)?;
        patches.push(schema().decode(&record)?);
        group.clear();
        Ok(())
    };

    for message in split_messages(stream)? {
        let parsed = parse_roland(message, layout::MODEL_ID)?;
        let MessageHeader::Roland { address, .. } = parsed.header else {
            continue;
        };
        if group.is_empty() || address != group_base + group_len {
            flush(&mut group)?;
            group_base = address;
            group_len = 0;
            debug!("jp8080: patch group at address {address:07X}");
        }
        group_len += parsed.body.len() as u32;
        group.push(parsed.body);
    }
    flush(&mut group)?;

    Ok(Bank {
        device: "jp8080".to_string(),
        patches,
    })
}

/// Encode a patch as one DT1 message at the given decoded address.
pub fn encode_patch(
    patch: &DecodedPatch,
    device_id: u8,
    address: u32,
) -> Result<Vec<u8>, CodecError> {
    let record = schema().encode(patch)?;
    Ok(build_roland(
        device_id,
        layout::MODEL_ID,
        layout::CMD_DT1,
        address,
        &record,
    ))
}

/// Encode a patch the way the hardware dumps it: a main message and a
/// short tail at the documented split offset.
pub fn encode_patch_split(
    patch: &DecodedPatch,
    device_id: u8,
    address: u32,
) -> Result<Vec<Vec<u8>>, CodecError> {
    let record = schema().encode(patch)?;
    let segments = split_record(&record, &layout::TRANSFER)?;
    Ok(segments
        .into_iter()
        .map(|(offset, body)| {
            build_roland(
                device_id,
                layout::MODEL_ID,
                layout::CMD_DT1,
                address + offset as u32,
                body,
            )
        })
        .collect())
}

/// An init patch: the all-zeros record, decoded.
pub fn blank_patch() -> Result<DecodedPatch, SchemaError> {
    schema().decode(&vec![0u8; layout::PATCH_SIZE])
}

/// User patch label for a 1-based position: `A11` through `B88`.
///
/// The front panel addresses patches as bank letter, row 1-8, column 1-8.
pub fn slot_name(position: usize) -> Option<String> {
    if !(1..=layout::BANK_CAPACITY).contains(&position) {
        return None;
    }
    let slot = position - 1;
    let bank = if slot < 64 { 'A' } else { 'B' };
    let within = slot % 64;
    Some(format!("{bank}{}{}", within / 8 + 1, within % 8 + 1))
}
