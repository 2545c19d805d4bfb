//! Declarative patch schemas and the record mapper.
//!
//! A [`PatchSchema`] is an ordered table of [`ParameterSpec`]s plus the
//! fixed decoded-record length for one device. The table is the single
//! source of truth for byte positions: construction validates bounds and
//! bit overlap once, after which the schema is immutable and shared by
//! reference. The mapper walks the table to decode a record into a named
//! field tree and to encode the tree back into a record of exactly the
//! declared length.
//!
//! Record bytes no spec claims are collected into the patch's opaque blob
//! on decode and written back verbatim on encode, so undocumented regions
//! survive a round trip untouched.

use thiserror::Error;

use crate::params::{
    self, RangeError, decode_be16, decode_offset64, decode_unsigned, encode_be16, encode_offset64,
    encode_unsigned,
};
use crate::{DecodedPatch, Field, FieldValue, Section};

/// How one field's raw bytes map to a value.
///
/// `Bits` covers the spec'd nibble-low, nibble-high and bit-field kinds:
/// the stored group is `(byte >> shift) & mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Whole byte, value `0..=max`.
    Unsigned { max: u8 },
    /// Center-biased signed byte: raw = value + 64.
    Offset64 { min: i64, max: i64 },
    /// Sub-byte group at `shift` with post-shift `mask`.
    Bits { shift: u8, mask: u8 },
    /// Single boolean bit.
    Flag { bit: u8 },
    /// Two-byte big-endian value, `0..=max`.
    Be16 { max: u16 },
    /// Fixed-width ASCII text, space-padded.
    Ascii { len: usize },
}

impl Encoding {
    fn byte_len(self) -> usize {
        match self {
            Encoding::Be16 { .. } => 2,
            Encoding::Ascii { len } => len,
            _ => 1,
        }
    }
}

/// One named field: where it lives and how it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub section: String,
    pub name: String,
    pub offset: usize,
    pub encoding: Encoding,
}

impl ParameterSpec {
    pub fn new(section: &str, name: &str, offset: usize, encoding: Encoding) -> Self {
        Self {
            section: section.to_string(),
            name: name.to_string(),
            offset,
            encoding,
        }
    }

    fn path(&self) -> String {
        format!("{}.{}", self.section, self.name)
    }

    /// Byte offsets and bit masks this field occupies.
    fn coverage(&self) -> Vec<(usize, u8)> {
        match self.encoding {
            Encoding::Unsigned { .. } => vec![(self.offset, 0xFF)],
            Encoding::Offset64 { .. } => vec![(self.offset, 0x7F)],
            Encoding::Bits { shift, mask } => vec![(self.offset, mask << shift)],
            Encoding::Flag { bit } => vec![(self.offset, 1 << bit)],
            Encoding::Be16 { .. } => vec![(self.offset, 0xFF), (self.offset + 1, 0xFF)],
            Encoding::Ascii { len } => (0..len).map(|i| (self.offset + i, 0xFF)).collect(),
        }
    }
}

/// Errors in a schema table itself or a record that does not fit it.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field {field} extends to byte {end}, past the {record_len}-byte record")]
    OutOfBounds {
        field: String,
        end: usize,
        record_len: usize,
    },
    #[error("fields {first} and {second} overlap at byte {offset}")]
    Overlap {
        offset: usize,
        first: String,
        second: String,
    },
    #[error("field {field} declared twice")]
    DuplicatePath { field: String },
    #[error("record length mismatch for {device}: expected {expected} bytes, got {actual}")]
    RecordLength {
        device: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Encode-side validation failures. Every variant names the offending
/// field so it can be correlated with the device documentation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{section}.{field}: {source}")]
    OutOfRange {
        section: String,
        field: String,
        source: RangeError,
    },
    #[error("missing field {section}.{field}")]
    MissingField { section: String, field: String },
    #[error("unknown field {section}.{field} not accepted by the {device} schema")]
    UnknownField {
        device: &'static str,
        section: String,
        field: String,
    },
    #[error("duplicate field {section}.{field}")]
    DuplicateField { section: String, field: String },
    #[error("{section}.{field}: expected a {expected} value")]
    WrongType {
        section: String,
        field: String,
        expected: &'static str,
    },
    #[error("{section}.{field}: text longer than {max} bytes")]
    TextTooLong {
        section: String,
        field: String,
        max: usize,
    },
    #[error("{section}.{field}: text is not ASCII")]
    NotAscii { section: String, field: String },
    #[error("opaque blob length mismatch: schema leaves {expected} bytes undeclared, got {actual}")]
    OpaqueLength { expected: usize, actual: usize },
    #[error("bank holds {actual} patches, device capacity is {capacity}")]
    BankCapacity { capacity: usize, actual: usize },
}

/// An immutable, validated field table for one device's record format.
#[derive(Debug)]
pub struct PatchSchema {
    device: &'static str,
    record_len: usize,
    specs: Vec<ParameterSpec>,
    opaque_offsets: Vec<usize>,
}

impl PatchSchema {
    /// Validate and freeze a schema table.
    ///
    /// Rejects fields that fall outside the record, bit overlap between
    /// two fields (co-location is expressed with `Bits`/`Flag` masks, not
    /// overlapping declarations), and duplicate section/name paths.
    pub fn new(
        device: &'static str,
        record_len: usize,
        specs: Vec<ParameterSpec>,
    ) -> Result<Self, SchemaError> {
        let mut owner: Vec<Option<usize>> = vec![None; record_len * 8];
        for (index, spec) in specs.iter().enumerate() {
            let end = spec.offset + spec.encoding.byte_len();
            if end > record_len {
                return Err(SchemaError::OutOfBounds {
                    field: spec.path(),
                    end,
                    record_len,
                });
            }
            if specs[..index]
                .iter()
                .any(|other| other.section == spec.section && other.name == spec.name)
            {
                return Err(SchemaError::DuplicatePath { field: spec.path() });
            }
            for (offset, mask) in spec.coverage() {
                for bit in 0..8 {
                    if mask & (1 << bit) == 0 {
                        continue;
                    }
                    let slot = &mut owner[offset * 8 + bit];
                    if let Some(first) = *slot {
                        return Err(SchemaError::Overlap {
                            offset,
                            first: specs[first].path(),
                            second: spec.path(),
                        });
                    }
                    *slot = Some(index);
                }
            }
        }

        let opaque_offsets = (0..record_len)
            .filter(|offset| owner[offset * 8..offset * 8 + 8].iter().all(Option::is_none))
            .collect();

        Ok(Self {
            device,
            record_len,
            specs,
            opaque_offsets,
        })
    }

    pub fn device(&self) -> &'static str {
        self.device
    }

    pub fn record_len(&self) -> usize {
        self.record_len
    }

    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    /// Byte offsets no field declares, in ascending order.
    pub fn opaque_offsets(&self) -> &[usize] {
        &self.opaque_offsets
    }

    pub fn contains(&self, section: &str, field: &str) -> bool {
        self.specs
            .iter()
            .any(|spec| spec.section == section && spec.name == field)
    }

    /// Decode a fixed-size record into a named field tree.
    ///
    /// Total over the documented schema: every spec produces a field, and
    /// every undeclared byte lands in the opaque blob.
    pub fn decode(&self, record: &[u8]) -> Result<DecodedPatch, SchemaError> {
        if record.len() != self.record_len {
            return Err(SchemaError::RecordLength {
                device: self.device,
                expected: self.record_len,
                actual: record.len(),
            });
        }

        let mut sections: Vec<Section> = Vec::new();
        for spec in &self.specs {
            let value = self.read_field(spec, record);
            let index = match sections.iter().position(|s| s.name == spec.section) {
                Some(index) => index,
                None => {
                    sections.push(Section {
                        name: spec.section.clone(),
                        fields: Vec::new(),
                    });
                    sections.len() - 1
                }
            };
            sections[index].fields.push(Field {
                name: spec.name.clone(),
                value,
            });
        }

        let opaque = self
            .opaque_offsets
            .iter()
            .map(|&offset| record[offset])
            .collect();

        Ok(DecodedPatch { sections, opaque })
    }

    /// Encode a field tree into a record of exactly the schema length.
    ///
    /// The buffer is zero-initialized first so reserved bit positions are
    /// deterministic. Every field in the tree must be consumed: unknown or
    /// duplicate fields are errors, not silently dropped.
    pub fn encode(&self, patch: &DecodedPatch) -> Result<Vec<u8>, ValidationError> {
        if patch.opaque.len() != self.opaque_offsets.len() {
            return Err(ValidationError::OpaqueLength {
                expected: self.opaque_offsets.len(),
                actual: patch.opaque.len(),
            });
        }

        let mut seen: Vec<(&str, &str)> = Vec::with_capacity(patch.field_count());
        for section in &patch.sections {
            for field in &section.fields {
                let key = (section.name.as_str(), field.name.as_str());
                if seen.contains(&key) {
                    return Err(ValidationError::DuplicateField {
                        section: section.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if !self.contains(key.0, key.1) {
                    return Err(ValidationError::UnknownField {
                        device: self.device,
                        section: section.name.clone(),
                        field: field.name.clone(),
                    });
                }
                seen.push(key);
            }
        }

        let mut record = vec![0u8; self.record_len];
        for (&offset, &byte) in self.opaque_offsets.iter().zip(&patch.opaque) {
            record[offset] = byte;
        }
        for spec in &self.specs {
            let value =
                patch
                    .get(&spec.section, &spec.name)
                    .ok_or_else(|| ValidationError::MissingField {
                        section: spec.section.clone(),
                        field: spec.name.clone(),
                    })?;
            self.write_field(spec, value, &mut record)?;
        }
        Ok(record)
    }

    fn read_field(&self, spec: &ParameterSpec, record: &[u8]) -> FieldValue {
        match spec.encoding {
            Encoding::Unsigned { .. } => FieldValue::Int(decode_unsigned(record[spec.offset])),
            Encoding::Offset64 { .. } => FieldValue::Int(decode_offset64(record[spec.offset])),
            Encoding::Bits { shift, mask } => {
                FieldValue::Int(i64::from(params::read_bits(record[spec.offset], shift, mask)))
            }
            Encoding::Flag { bit } => {
                FieldValue::Bool(params::read_bits(record[spec.offset], bit, 0x01) == 1)
            }
            Encoding::Be16 { .. } => {
                FieldValue::Int(decode_be16(record[spec.offset], record[spec.offset + 1]))
            }
            Encoding::Ascii { len } => {
                let raw = String::from_utf8_lossy(&record[spec.offset..spec.offset + len]);
                FieldValue::Text(raw.trim_end_matches([' ', '\0']).to_string())
            }
        }
    }

    fn write_field(
        &self,
        spec: &ParameterSpec,
        value: &FieldValue,
        record: &mut [u8],
    ) -> Result<(), ValidationError> {
        let out_of_range = |source: RangeError| ValidationError::OutOfRange {
            section: spec.section.clone(),
            field: spec.name.clone(),
            source,
        };
        match spec.encoding {
            Encoding::Unsigned { max } => {
                let value = expect_int(spec, value)?;
                record[spec.offset] = encode_unsigned(value, max).map_err(out_of_range)?;
            }
            Encoding::Offset64 { min, max } => {
                let value = expect_int(spec, value)?;
                let raw = encode_offset64(value, min, max).map_err(out_of_range)?;
                params::write_bits(&mut record[spec.offset], 0, 0x7F, raw);
            }
            Encoding::Bits { shift, mask } => {
                let value = expect_int(spec, value)?;
                if value < 0 || value > i64::from(mask) {
                    return Err(out_of_range(RangeError {
                        value,
                        min: 0,
                        max: i64::from(mask),
                    }));
                }
                params::write_bits(&mut record[spec.offset], shift, mask, value as u8);
            }
            Encoding::Flag { bit } => {
                let FieldValue::Bool(value) = value else {
                    return Err(ValidationError::WrongType {
                        section: spec.section.clone(),
                        field: spec.name.clone(),
                        expected: "boolean",
                    });
                };
                params::write_bits(&mut record[spec.offset], bit, 0x01, u8::from(*value));
            }
            Encoding::Be16 { max } => {
                let value = expect_int(spec, value)?;
                let bytes = encode_be16(value, max).map_err(out_of_range)?;
                record[spec.offset..spec.offset + 2].copy_from_slice(&bytes);
            }
            Encoding::Ascii { len } => {
                let FieldValue::Text(text) = value else {
                    return Err(ValidationError::WrongType {
                        section: spec.section.clone(),
                        field: spec.name.clone(),
                        expected: "text",
                    });
                };
                if !text.is_ascii() {
                    return Err(ValidationError::NotAscii {
                        section: spec.section.clone(),
                        field: spec.name.clone(),
                    });
                }
                if text.len() > len {
                    return Err(ValidationError::TextTooLong {
                        section: spec.section.clone(),
                        field: spec.name.clone(),
                        max: len,
                    });
                }
                let target = &mut record[spec.offset..spec.offset + len];
                target.fill(b' ');
                target[..text.len()].copy_from_slice(text.as_bytes());
            }
        }
        Ok(())
    }
}

fn expect_int(spec: &ParameterSpec, value: &FieldValue) -> Result<i64, ValidationError> {
    match value {
        FieldValue::Int(value) => Ok(*value),
        _ => Err(ValidationError::WrongType {
            section: spec.section.clone(),
            field: spec.name.clone(),
            expected: "integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_schema() -> PatchSchema {
        PatchSchema::new(
            "toy",
            8,
            vec![
                ParameterSpec::new("identity", "name", 0, Encoding::Ascii { len: 4 }),
                ParameterSpec::new("mix", "level", 4, Encoding::Unsigned { max: 127 }),
                ParameterSpec::new("mix", "pan", 5, Encoding::Offset64 { min: -64, max: 63 }),
                ParameterSpec::new("fx", "on", 6, Encoding::Flag { bit: 7 }),
                ParameterSpec::new("fx", "kind", 6, Encoding::Bits { shift: 4, mask: 0x07 }),
                ParameterSpec::new("fx", "depth", 6, Encoding::Bits { shift: 0, mask: 0x0F }),
            ],
        )
        .expect("toy schema")
    }

    #[test]
    fn opaque_offsets_are_the_undeclared_bytes() {
        let schema = toy_schema();
        assert_eq!(schema.opaque_offsets(), &[7]);
        assert_eq!(schema.record_len(), 8);
    }

    #[test]
    fn construction_rejects_bit_overlap() {
        let err = PatchSchema::new(
            "toy",
            2,
            vec![
                ParameterSpec::new("a", "nibble", 0, Encoding::Bits { shift: 0, mask: 0x0F }),
                ParameterSpec::new("a", "flag", 0, Encoding::Flag { bit: 3 }),
            ],
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("a.nibble"), "{msg}");
        assert!(msg.contains("a.flag"), "{msg}");
    }

    #[test]
    fn construction_rejects_out_of_bounds() {
        let err = PatchSchema::new(
            "toy",
            2,
            vec![ParameterSpec::new("a", "wide", 1, Encoding::Be16 { max: 300 })],
        )
        .unwrap_err();
        assert!(err.to_string().contains("past the 2-byte record"));
    }

    #[test]
    fn construction_rejects_duplicate_paths() {
        let err = PatchSchema::new(
            "toy",
            2,
            vec![
                ParameterSpec::new("a", "x", 0, Encoding::Unsigned { max: 127 }),
                ParameterSpec::new("a", "x", 1, Encoding::Unsigned { max: 127 }),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn decode_builds_sections_in_schema_order() {
        let schema = toy_schema();
        let record = [b'L', b'e', b'a', b'd', 90, 64 + 10, 0b1011_0101, 0x5A];
        let patch = schema.decode(&record).expect("decode");

        let names: Vec<&str> = patch.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["identity", "mix", "fx"]);
        assert_eq!(patch.get("identity", "name"), Some(&FieldValue::Text("Lead".into())));
        assert_eq!(patch.get("mix", "level"), Some(&FieldValue::Int(90)));
        assert_eq!(patch.get("mix", "pan"), Some(&FieldValue::Int(10)));
        assert_eq!(patch.get("fx", "on"), Some(&FieldValue::Bool(true)));
        assert_eq!(patch.get("fx", "kind"), Some(&FieldValue::Int(0x03)));
        assert_eq!(patch.get("fx", "depth"), Some(&FieldValue::Int(0x05)));
        assert_eq!(patch.opaque, vec![0x5A]);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let err = toy_schema().decode(&[0u8; 7]).unwrap_err();
        assert!(err.to_string().contains("expected 8 bytes, got 7"));
    }

    #[test]
    fn encode_decode_roundtrip_preserves_record() {
        let schema = toy_schema();
        let record = [b'P', b'a', b'd', b' ', 127, 0x00, 0b0111_1111, 0xFF];
        let patch = schema.decode(&record).expect("decode");
        let rebuilt = schema.encode(&patch).expect("encode");
        assert_eq!(rebuilt, record);
    }

    #[test]
    fn colocated_write_preserves_neighbours() {
        let schema = toy_schema();
        let record = [0u8, 0, 0, 0, 0, 64, 0b1011_0101, 0];
        let mut patch = schema.decode(&record).expect("decode");
        assert!(patch.set("fx", "depth", FieldValue::Int(0x0A)));
        let rebuilt = schema.encode(&patch).expect("encode");
        assert_eq!(rebuilt[6], 0b1011_1010);
        assert_eq!(rebuilt[6] & 0xF0, record[6] & 0xF0);
    }

    #[test]
    fn encode_names_out_of_range_field() {
        let schema = toy_schema();
        let mut patch = schema.decode(&[0u8; 8]).expect("decode");
        assert!(patch.set("mix", "pan", FieldValue::Int(64)));
        let err = schema.encode(&patch).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("mix.pan"), "{msg}");
        assert!(msg.contains("-64..=63"), "{msg}");
    }

    #[test]
    fn encode_rejects_unknown_field() {
        let schema = toy_schema();
        let mut patch = schema.decode(&[0u8; 8]).expect("decode");
        patch.sections[1].fields.push(Field {
            name: "width".to_string(),
            value: FieldValue::Int(1),
        });
        let err = schema.encode(&patch).unwrap_err();
        assert!(err.to_string().contains("unknown field mix.width"));
    }

    #[test]
    fn encode_rejects_missing_field() {
        let schema = toy_schema();
        let mut patch = schema.decode(&[0u8; 8]).expect("decode");
        patch.sections[1].fields.remove(0);
        let err = schema.encode(&patch).unwrap_err();
        assert!(err.to_string().contains("missing field mix.level"));
    }

    #[test]
    fn encode_rejects_wrong_opaque_length() {
        let schema = toy_schema();
        let mut patch = schema.decode(&[0u8; 8]).expect("decode");
        patch.opaque.push(0);
        let err = schema.encode(&patch).unwrap_err();
        assert!(err.to_string().contains("opaque blob length mismatch"));
    }

    #[test]
    fn encode_rejects_non_ascii_name() {
        let schema = toy_schema();
        let mut patch = schema.decode(&[0u8; 8]).expect("decode");
        assert!(patch.set("identity", "name", FieldValue::Text("Bjørk".into())));
        let err = schema.encode(&patch).unwrap_err();
        assert!(err.to_string().contains("not ASCII"));
    }
}
