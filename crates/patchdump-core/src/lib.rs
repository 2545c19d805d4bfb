//! Patchdump core library for MIDI System Exclusive patch codecs.
//!
//! This crate implements the transcoding pipeline used by the CLI: raw
//! SysEx bytes pass through the framer (envelope and checksum), the 7-bit
//! transcoder, the bulk reassembler, and finally the schema mapper, which
//! produces a named, typed field tree. Encoding runs the same pipeline in
//! reverse, bit-exactly. All decoding is byte-oriented and side-effect
//! free; file access lives in the CLI.
//!
//! Invariants:
//! - `decode(encode(patch)) == patch`, including undeclared byte regions.
//! - Schemas are validated once at construction and never mutated.
//! - Encode fails on any out-of-range value instead of wrapping.
//!
//! # Examples
//! ```no_run
//! use std::fs;
//!
//! use patchdump_core::devices::ms2000;
//!
//! let bytes = fs::read("FactoryBanks.syx")?;
//! let bank = ms2000::decode_sysex(&bytes)?;
//! println!("{} patches", bank.patches.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod bulk;
mod framing;
mod params;
mod schema;
mod transcode;

pub mod devices;

pub use bulk::{ReassemblyError, TransferProfile, reassemble, split_record};
pub use framing::{
    ChecksumError, FramingError, MessageHeader, RawMessage, build_korg, build_roland,
    decode_address, encode_address, parse_korg, parse_roland, roland_checksum, split_messages,
};
pub use params::{
    RangeError, decode_be16, decode_offset64, decode_unsigned, encode_be16, encode_offset64,
    encode_unsigned, read_bits, write_bits,
};
pub use schema::{Encoding, ParameterSpec, PatchSchema, SchemaError, ValidationError};
pub use transcode::{BitOrder, pack_7bit, unpack_7bit};

/// Top-level error for full decode/encode pipelines.
///
/// Each stage keeps its own error type; this enum only aggregates them for
/// callers that drive the whole pipeline. Nothing in the core retries.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Reassembly(#[from] ReassemblyError),
}

/// One decoded parameter value.
///
/// Serialized untagged, so JSON stays plain: `true`, `64`, `"Init Patch"`.
///
/// # Examples
/// ```
/// use patchdump_core::FieldValue;
///
/// let json = serde_json::to_string(&FieldValue::Int(-12)).unwrap();
/// assert_eq!(json, "-12");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// A named field inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

/// A named group of fields (oscillator, filter, envelope, ...).
///
/// Section and field order follows the device schema, so serialized output
/// is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub fields: Vec<Field>,
}

/// A fully decoded patch: the named field tree plus the bytes the schema
/// leaves undeclared.
///
/// The opaque blob holds every record byte no parameter claims (motion
/// sequencer and vendor-reserved regions), in ascending offset order. It is
/// round-tripped verbatim on re-encode.
///
/// # Examples
/// ```
/// use patchdump_core::{DecodedPatch, Field, FieldValue, Section};
///
/// let patch = DecodedPatch {
///     sections: vec![Section {
///         name: "filter".to_string(),
///         fields: vec![Field {
///             name: "cutoff".to_string(),
///             value: FieldValue::Int(64),
///         }],
///     }],
///     opaque: vec![],
/// };
/// assert_eq!(patch.get("filter", "cutoff"), Some(&FieldValue::Int(64)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPatch {
    pub sections: Vec<Section>,
    /// Undeclared record bytes, ascending offset order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opaque: Vec<u8>,
}

impl DecodedPatch {
    /// Look up a field by section and name.
    pub fn get(&self, section: &str, field: &str) -> Option<&FieldValue> {
        self.sections
            .iter()
            .find(|s| s.name == section)?
            .fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| &f.value)
    }

    /// Replace the value of an existing field. Returns `false` when the
    /// field does not exist; new fields are never created, so the tree
    /// always matches its schema.
    pub fn set(&mut self, section: &str, field: &str, value: FieldValue) -> bool {
        let Some(section) = self.sections.iter_mut().find(|s| s.name == section) else {
            return false;
        };
        let Some(slot) = section.fields.iter_mut().find(|f| f.name == field) else {
            return false;
        };
        slot.value = value;
        true
    }

    /// The patch name from the identity section, when present.
    pub fn name(&self) -> Option<&str> {
        match self.get("identity", "name")? {
            FieldValue::Text(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Total number of fields across all sections.
    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }
}

/// An ordered set of decoded patches from one device.
///
/// Positions are meaningful: slot 1 of an MS2000 bank is `A01`, slot 1 of a
/// JP-8080 bank is `A11`. See `devices::*::slot_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    /// Device identifier (e.g., "ms2000", "jp8080").
    pub device: String,
    pub patches: Vec<DecodedPatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_patch() -> DecodedPatch {
        DecodedPatch {
            sections: vec![
                Section {
                    name: "identity".to_string(),
                    fields: vec![Field {
                        name: "name".to_string(),
                        value: FieldValue::Text("Test Lead".to_string()),
                    }],
                },
                Section {
                    name: "filter".to_string(),
                    fields: vec![
                        Field {
                            name: "cutoff".to_string(),
                            value: FieldValue::Int(90),
                        },
                        Field {
                            name: "distortion".to_string(),
                            value: FieldValue::Bool(false),
                        },
                    ],
                },
            ],
            opaque: vec![0x00, 0x7F],
        }
    }

    #[test]
    fn get_and_set_existing_field() {
        let mut patch = sample_patch();
        assert_eq!(patch.get("filter", "cutoff"), Some(&FieldValue::Int(90)));
        assert!(patch.set("filter", "cutoff", FieldValue::Int(12)));
        assert_eq!(patch.get("filter", "cutoff"), Some(&FieldValue::Int(12)));
    }

    #[test]
    fn set_never_creates_fields() {
        let mut patch = sample_patch();
        assert!(!patch.set("filter", "slope", FieldValue::Int(1)));
        assert!(!patch.set("lfo3", "rate", FieldValue::Int(1)));
        assert_eq!(patch.field_count(), 3);
    }

    #[test]
    fn name_reads_identity_section() {
        assert_eq!(sample_patch().name(), Some("Test Lead"));
    }

    #[test]
    fn field_values_serialize_untagged() {
        let patch = sample_patch();
        let value = serde_json::to_value(&patch).expect("patch json");
        assert_eq!(value["sections"][1]["fields"][0]["value"], 90);
        assert_eq!(value["sections"][1]["fields"][1]["value"], false);
        assert_eq!(value["sections"][0]["fields"][0]["value"], "Test Lead");

        let back: DecodedPatch = serde_json::from_value(value).expect("patch roundtrip");
        assert_eq!(back, patch);
    }
}
